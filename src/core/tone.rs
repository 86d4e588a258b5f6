/// Tone pass — swaps emotion-laden words for words of another emotion.

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, RegexBuilder};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::lexicon::Lexicon;
use crate::core::morality::MoralWeights;
use crate::core::text::{capitalize_first, tokenize};

/// Rewrites a story into a different emotional tone.
///
/// Only words carrying a moral weight are candidates. Each one is looked
/// up in the lexicon's reverse index; if its category has a bucket for the
/// target tone, every occurrence in the sentence is replaced by one word
/// drawn from that bucket. Sentences are split on literal periods and
/// rejoined with `". "`.
pub struct TonePass;

impl TonePass {
    pub fn apply<R: Rng + ?Sized>(
        story: &str,
        new_tone: &str,
        lexicon: &Lexicon,
        weights: &MoralWeights,
        rng: &mut R,
    ) -> String {
        let tone = new_tone.trim().to_lowercase();
        let sentences: Vec<String> = story
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::rewrite_sentence(s, &tone, lexicon, weights, rng))
            .collect();

        if sentences.is_empty() {
            return String::new();
        }
        format!("{}.", sentences.join(". "))
    }

    fn rewrite_sentence<R: Rng + ?Sized>(
        sentence: &str,
        tone: &str,
        lexicon: &Lexicon,
        weights: &MoralWeights,
        rng: &mut R,
    ) -> String {
        let mut replacements: FxHashMap<String, String> = FxHashMap::default();
        let mut order: Vec<String> = Vec::new();

        for token in tokenize(sentence) {
            if replacements.contains_key(&token) || !weights.contains(&token) {
                continue;
            }
            let Some((pos, _)) = lexicon.locate(&token) else {
                continue;
            };
            let Some(word) = lexicon
                .words(pos, tone)
                .and_then(|words| words.choose(rng))
            else {
                continue;
            };
            replacements.insert(token.clone(), word.clone());
            order.push(token);
        }

        if order.is_empty() {
            return sentence.to_string();
        }

        let alternation = order
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"\b(?:{})\b", alternation);
        let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                warn!(error = %e, "could not build tone pattern, leaving sentence as-is");
                return sentence.to_string();
            }
        };

        debug!(tone, swaps = order.len(), "rewriting sentence tone");
        re.replace_all(sentence, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let replacement = replacements
                .get(&matched.to_lowercase())
                .map(String::as_str)
                .unwrap_or(matched);
            if matched.chars().next().is_some_and(char::is_uppercase) {
                capitalize_first(replacement)
            } else {
                replacement.to_string()
            }
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixtures() -> (Lexicon, MoralWeights) {
        let lexicon = Lexicon::parse_ron(
            r#"{
                "noun": { "happy": ["smile"], "sad": ["tear"] },
                "adjective": { "happy": ["bright"], "sad": ["gloomy"] },
                "verb": { "happy": ["laughed"] },
            }"#,
        )
        .unwrap();
        let weights = MoralWeights::parse_ron(
            r#"{ "smile": 0.8, "tear": -0.6, "bright": 0.5, "gloomy": -0.5, "laughed": 0.6 }"#,
        )
        .unwrap();
        (lexicon, weights)
    }

    #[test]
    fn swaps_weighted_words_into_target_tone() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("The bright smile stayed.", "sad", &lex, &w, &mut rng);
        assert_eq!(out, "The gloomy tear stayed.");
    }

    #[test]
    fn keeps_capitalization_of_first_word() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("Bright smile. Smile again.", "sad", &lex, &w, &mut rng);
        assert_eq!(out, "Gloomy tear. Tear again.");
    }

    #[test]
    fn missing_target_bucket_leaves_word() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        // No sad verbs in the lexicon, so "laughed" stays.
        let out = TonePass::apply("The smile laughed.", "sad", &lex, &w, &mut rng);
        assert_eq!(out, "The tear laughed.");
    }

    #[test]
    fn unweighted_words_untouched() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("Mira walked home.", "sad", &lex, &w, &mut rng);
        assert_eq!(out, "Mira walked home.");
    }

    #[test]
    fn whole_words_only() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("Smiles and a smile.", "sad", &lex, &w, &mut rng);
        assert_eq!(out, "Smiles and a tear.");
    }

    #[test]
    fn unknown_tone_leaves_story_intact() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("A bright smile.", "Jubilant", &lex, &w, &mut rng);
        assert_eq!(out, "A bright smile.");
    }

    #[test]
    fn tone_label_is_case_insensitive() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("a smile", "SAD", &lex, &w, &mut rng);
        assert_eq!(out, "a tear.");
    }

    #[test]
    fn empty_story_gives_empty_output() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(TonePass::apply("", "sad", &lex, &w, &mut rng), "");
        assert_eq!(TonePass::apply(" . . ", "sad", &lex, &w, &mut rng), "");
    }

    #[test]
    fn sentence_structure_is_rejoined() {
        let (lex, w) = fixtures();
        let mut rng = StdRng::seed_from_u64(1);
        let out = TonePass::apply("One.  Two three.", "happy", &lex, &w, &mut rng);
        assert_eq!(out, "One. Two three.");
    }
}
