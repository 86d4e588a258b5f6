/// Context-free grammar runtime — types, parsing, loading, validation and expansion.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::lexicon::Lexicon;
use crate::schema::entity::EntityMemory;
use crate::schema::part_of_speech::PartOfSpeech;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("rule '{0}' has no alternatives")]
    EmptyRule(String),
    #[error("rule '{0}' can never finish expanding")]
    NonTerminating(String),
    #[error("expansion exceeded depth {0} (cyclic grammar?)")]
    RecursionLimit(usize),
    #[error("lexicon has no words for category '{}'", .0.name())]
    EmptyCategory(PartOfSpeech),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A single token of a production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal word, emitted as-is.
    Literal(String),
    /// Reference to another grammar rule: an ALL-CAPS token such as `NP`.
    RuleRef(String),
    /// Word drawn from the lexicon: `{noun}`, `{verb}`, `{adjective}`, `{adverb}`.
    Category(PartOfSpeech),
    /// Entity interpolation by role: `{protagonist}`, `{setting}`, `{companion}`.
    EntityRef(String),
}

/// One alternative of a rule: a whitespace-separated token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse an alternative string into segments.
    ///
    /// Syntax, per whitespace-separated token:
    /// - `{noun}` / `{verb}` / `{adjective}` / `{adverb}` → `Category`
    /// - `{name}` → `EntityRef`
    /// - `NAME` (upper-case letters, digits, `_`) → `RuleRef`
    /// - anything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let segments = input
            .split_whitespace()
            .map(Self::parse_segment)
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            return Err(GrammarError::TemplateParse(
                "empty alternative".to_string(),
            ));
        }
        Ok(Template { segments })
    }

    fn parse_segment(token: &str) -> Result<TemplateSegment, GrammarError> {
        if let Some(inner) = token.strip_prefix('{') {
            let name = inner.strip_suffix('}').ok_or_else(|| {
                GrammarError::TemplateParse(format!("unclosed brace in '{}'", token))
            })?;
            if name.is_empty() {
                return Err(GrammarError::TemplateParse("empty braces".to_string()));
            }
            if name.contains(['{', '}']) {
                return Err(GrammarError::TemplateParse(format!(
                    "nested braces are not allowed: '{}'",
                    token
                )));
            }
            return Ok(match PartOfSpeech::from_name(name) {
                Some(pos) => TemplateSegment::Category(pos),
                None => TemplateSegment::EntityRef(name.to_string()),
            });
        }

        if token.contains(['{', '}']) {
            return Err(GrammarError::TemplateParse(format!(
                "braces must wrap a whole token: '{}'",
                token
            )));
        }

        if is_symbol_name(token) {
            Ok(TemplateSegment::RuleRef(token.to_string()))
        } else {
            Ok(TemplateSegment::Literal(token.to_string()))
        }
    }

    fn rule_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::RuleRef(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Rule names are upper-case ASCII with optional digits and underscores.
fn is_symbol_name(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_uppercase())
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// A named grammar rule with its alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub name: String,
    pub alternatives: Vec<Template>,
}

/// A set of named grammar rules.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrammarSet {
    pub rules: HashMap<String, GrammarRule>,
}

/// Everything an expansion reads or mutates besides the grammar itself.
pub struct ExpansionContext<'a> {
    pub lexicon: &'a Lexicon,
    pub emotion: &'a str,
    pub memory: &'a mut EntityMemory,
    pub max_depth: usize,
}

impl GrammarSet {
    /// Load a grammar set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GrammarSet, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a grammar set from a RON map of rule name → alternative strings.
    pub fn parse_ron(input: &str) -> Result<GrammarSet, GrammarError> {
        let raw: HashMap<String, Vec<String>> = ron::from_str(input)?;
        let mut rules = HashMap::new();

        for (name, texts) in raw {
            let alternatives = texts
                .iter()
                .map(|text| Template::parse(text))
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(name.clone(), GrammarRule { name, alternatives });
        }

        Ok(GrammarSet { rules })
    }

    /// Merge another grammar set into this one. Rules from `other`
    /// override rules in `self` with the same name.
    pub fn merge(&mut self, other: GrammarSet) {
        for (name, rule) in other.rules {
            self.rules.insert(name, rule);
        }
    }

    /// Names of all rules reachable from `start`, including `start`.
    pub fn reachable(&self, start: &str) -> Result<FxHashSet<String>, GrammarError> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![start.to_string()];
        while let Some(name) = stack.pop() {
            if seen.contains(&name) {
                continue;
            }
            let rule = self
                .rules
                .get(&name)
                .ok_or_else(|| GrammarError::RuleNotFound(name.clone()))?;
            for alt in &rule.alternatives {
                stack.extend(alt.rule_refs().map(str::to_string));
            }
            seen.insert(name);
        }
        Ok(seen)
    }

    /// Check the rules reachable from `start`: every reference resolves,
    /// every rule has alternatives, and every rule has some way to finish.
    pub fn validate(&self, start: &str) -> Result<(), GrammarError> {
        let reachable = self.reachable(start)?;

        for name in &reachable {
            if self.rules[name].alternatives.is_empty() {
                return Err(GrammarError::EmptyRule(name.clone()));
            }
        }

        // Least fixpoint: a rule terminates once one alternative only
        // references rules already known to terminate.
        let mut terminating: FxHashSet<&str> = FxHashSet::default();
        loop {
            let before = terminating.len();
            for name in &reachable {
                if terminating.contains(name.as_str()) {
                    continue;
                }
                let finishes = self.rules[name]
                    .alternatives
                    .iter()
                    .any(|alt| alt.rule_refs().all(|r| terminating.contains(r)));
                if finishes {
                    terminating.insert(name.as_str());
                }
            }
            if terminating.len() == before {
                break;
            }
        }

        let mut stuck: Vec<&String> = reachable
            .iter()
            .filter(|name| !terminating.contains(name.as_str()))
            .collect();
        stuck.sort();
        match stuck.first() {
            Some(name) => Err(GrammarError::NonTerminating((*name).clone())),
            None => Ok(()),
        }
    }

    /// Expand `symbol` into text.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        ctx: &mut ExpansionContext<'_>,
        rng: &mut R,
    ) -> Result<String, GrammarError> {
        self.expand_rule(symbol, ctx, rng, 0)
    }

    fn expand_rule<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        ctx: &mut ExpansionContext<'_>,
        rng: &mut R,
        depth: usize,
    ) -> Result<String, GrammarError> {
        if depth >= ctx.max_depth {
            return Err(GrammarError::RecursionLimit(ctx.max_depth));
        }
        let rule = self
            .rules
            .get(symbol)
            .ok_or_else(|| GrammarError::RuleNotFound(symbol.to_string()))?;
        let template = rule
            .alternatives
            .choose(rng)
            .ok_or_else(|| GrammarError::EmptyRule(symbol.to_string()))?;

        let mut parts = Vec::with_capacity(template.segments.len());
        for segment in &template.segments {
            parts.push(self.expand_segment(segment, ctx, rng, depth)?);
        }
        Ok(parts.join(" "))
    }

    fn expand_segment<R: Rng + ?Sized>(
        &self,
        segment: &TemplateSegment,
        ctx: &mut ExpansionContext<'_>,
        rng: &mut R,
        depth: usize,
    ) -> Result<String, GrammarError> {
        match segment {
            TemplateSegment::Literal(text) => Ok(text.clone()),
            TemplateSegment::RuleRef(name) => self.expand_rule(name, ctx, rng, depth + 1),
            TemplateSegment::Category(pos) => {
                let word = ctx
                    .lexicon
                    .choose_word(*pos, ctx.emotion, rng)
                    .ok_or(GrammarError::EmptyCategory(*pos))?
                    .to_string();
                if *pos == PartOfSpeech::Noun {
                    ctx.memory.record_noun(&word);
                }
                Ok(word)
            }
            TemplateSegment::EntityRef(role) => {
                Ok(ctx.memory.get(role).unwrap_or_default().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEST_GRAMMAR: &str = r#"{
        "SENTENCE": ["NP VP", "{protagonist} VP"],
        "NP": ["NOUN", "DET ADJ NOUN"],
        "VP": ["VERB", "VERB ADV"],
        "DET": ["the"],
        "NOUN": ["{noun}"],
        "VERB": ["{verb}"],
        "ADJ": ["{adjective}"],
        "ADV": ["{adverb}"],
    }"#;

    const TEST_LEXICON: &str = r#"{
        "noun": { "happy": ["smile"] },
        "verb": { "happy": ["laughed"] },
        "adjective": { "happy": ["bright"] },
        "adverb": { "happy": ["cheerfully"] },
    }"#;

    fn fixtures() -> (GrammarSet, Lexicon) {
        (
            GrammarSet::parse_ron(TEST_GRAMMAR).unwrap(),
            Lexicon::parse_ron(TEST_LEXICON).unwrap(),
        )
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("the end").unwrap();
        assert_eq!(
            t.segments,
            vec![
                TemplateSegment::Literal("the".to_string()),
                TemplateSegment::Literal("end".to_string()),
            ]
        );
    }

    #[test]
    fn parse_rule_refs_and_categories() {
        let t = Template::parse("DET ADJ_2 {noun}").unwrap();
        assert_eq!(t.segments[0], TemplateSegment::RuleRef("DET".to_string()));
        assert_eq!(t.segments[1], TemplateSegment::RuleRef("ADJ_2".to_string()));
        assert_eq!(t.segments[2], TemplateSegment::Category(PartOfSpeech::Noun));
    }

    #[test]
    fn parse_entity_ref() {
        let t = Template::parse("{protagonist} waited in {setting}").unwrap();
        assert_eq!(
            t.segments[0],
            TemplateSegment::EntityRef("protagonist".to_string())
        );
        assert_eq!(
            t.segments[3],
            TemplateSegment::EntityRef("setting".to_string())
        );
    }

    #[test]
    fn mixed_case_is_literal() {
        let t = Template::parse("Beyond a").unwrap();
        assert!(matches!(&t.segments[0], TemplateSegment::Literal(s) if s == "Beyond"));
        assert!(matches!(&t.segments[1], TemplateSegment::Literal(s) if s == "a"));
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("").is_err());
        assert!(Template::parse("bad {} here").is_err());
        assert!(Template::parse("bad {unclosed here").is_err());
        assert!(Template::parse("bad {out{in}} here").is_err());
        assert!(Template::parse("half}brace").is_err());
    }

    #[test]
    fn parse_ron_rules() {
        let (gs, _) = fixtures();
        assert_eq!(gs.rules.len(), 8);
        assert_eq!(gs.rules["SENTENCE"].alternatives.len(), 2);
        assert_eq!(gs.rules["DET"].name, "DET");
    }

    #[test]
    fn expand_produces_lexicon_words() {
        let (gs, lex) = fixtures();
        let mut memory = EntityMemory::new("Mira", "a quiet village");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut ctx = ExpansionContext {
                lexicon: &lex,
                emotion: "happy",
                memory: &mut memory,
                max_depth: 16,
            };
            let text = gs.expand("SENTENCE", &mut ctx, &mut rng).unwrap();
            for word in text.split(' ') {
                assert!(
                    ["Mira", "the", "smile", "laughed", "bright", "cheerfully"].contains(&word),
                    "unexpected word '{}' in '{}'",
                    word,
                    text
                );
            }
        }
    }

    #[test]
    fn expand_records_nouns() {
        let (gs, lex) = fixtures();
        let mut memory = EntityMemory::new("Mira", "a quiet village");
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = ExpansionContext {
            lexicon: &lex,
            emotion: "happy",
            memory: &mut memory,
            max_depth: 16,
        };
        gs.expand("NP", &mut ctx, &mut rng).unwrap();
        gs.expand("NP", &mut ctx, &mut rng).unwrap();
        assert_eq!(memory.used_nouns(), &["smile".to_string(), "smile".to_string()]);
    }

    #[test]
    fn expand_deterministic_same_seed() {
        let (gs, lex) = fixtures();
        let run = |seed| {
            let mut memory = EntityMemory::new("Mira", "here");
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = ExpansionContext {
                lexicon: &lex,
                emotion: "happy",
                memory: &mut memory,
                max_depth: 16,
            };
            (0..5)
                .map(|_| gs.expand("SENTENCE", &mut ctx, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn unset_entity_expands_to_empty() {
        let gs = GrammarSet::parse_ron(r#"{ "S": ["{villain}"] }"#).unwrap();
        let lex = Lexicon::default();
        let mut memory = EntityMemory::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = ExpansionContext {
            lexicon: &lex,
            emotion: "happy",
            memory: &mut memory,
            max_depth: 4,
        };
        assert_eq!(gs.expand("S", &mut ctx, &mut rng).unwrap(), "");
    }

    #[test]
    fn missing_rule_is_an_error() {
        let (gs, lex) = fixtures();
        let mut memory = EntityMemory::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = ExpansionContext {
            lexicon: &lex,
            emotion: "happy",
            memory: &mut memory,
            max_depth: 16,
        };
        let err = gs.expand("STORY", &mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, GrammarError::RuleNotFound(name) if name == "STORY"));
    }

    #[test]
    fn empty_category_is_an_error() {
        let gs = GrammarSet::parse_ron(r#"{ "S": ["{adverb}"] }"#).unwrap();
        let lex = Lexicon::parse_ron(r#"{ "noun": { "happy": ["smile"] } }"#).unwrap();
        let mut memory = EntityMemory::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = ExpansionContext {
            lexicon: &lex,
            emotion: "happy",
            memory: &mut memory,
            max_depth: 4,
        };
        let err = gs.expand("S", &mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, GrammarError::EmptyCategory(PartOfSpeech::Adverb)));
    }

    #[test]
    fn cyclic_grammar_hits_depth_limit() {
        let gs = GrammarSet::parse_ron(r#"{ "LOOP": ["again LOOP"] }"#).unwrap();
        let lex = Lexicon::default();
        let mut memory = EntityMemory::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = ExpansionContext {
            lexicon: &lex,
            emotion: "happy",
            memory: &mut memory,
            max_depth: 8,
        };
        let err = gs.expand("LOOP", &mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, GrammarError::RecursionLimit(8)));
    }

    #[test]
    fn validate_accepts_well_formed_grammar() {
        let (gs, _) = fixtures();
        gs.validate("SENTENCE").unwrap();
    }

    #[test]
    fn validate_reports_broken_reference() {
        let gs = GrammarSet::parse_ron(r#"{ "S": ["NP VP"], "NP": ["{noun}"] }"#).unwrap();
        let err = gs.validate("S").unwrap_err();
        assert!(matches!(err, GrammarError::RuleNotFound(name) if name == "VP"));
    }

    #[test]
    fn validate_reports_non_terminating_cycle() {
        let gs = GrammarSet::parse_ron(
            r#"{ "S": ["A"], "A": ["x B"], "B": ["y A"] }"#,
        )
        .unwrap();
        let err = gs.validate("S").unwrap_err();
        assert!(matches!(err, GrammarError::NonTerminating(name) if name == "A"));
    }

    #[test]
    fn validate_allows_recursion_with_exit() {
        let gs = GrammarSet::parse_ron(
            r#"{ "S": ["NP"], "NP": ["{noun}", "NP and NP"] }"#,
        )
        .unwrap();
        gs.validate("S").unwrap();
    }

    #[test]
    fn validate_reports_empty_rule() {
        let gs = GrammarSet::parse_ron(r#"{ "S": ["A"], "A": [] }"#).unwrap();
        assert!(matches!(gs.validate("S"), Err(GrammarError::EmptyRule(name)) if name == "A"));
    }

    #[test]
    fn unreachable_rules_are_ignored_by_validate() {
        let gs = GrammarSet::parse_ron(
            r#"{ "S": ["{noun}"], "ORPHAN": ["MISSING"] }"#,
        )
        .unwrap();
        gs.validate("S").unwrap();
        let reachable = gs.reachable("S").unwrap();
        assert_eq!(reachable.len(), 1);
    }

    #[test]
    fn merge_precedence() {
        let mut base = GrammarSet::parse_ron(
            r#"{ "SHARED": ["base version"], "BASE_ONLY": ["only in base"] }"#,
        )
        .unwrap();
        let override_set =
            GrammarSet::parse_ron(r#"{ "SHARED": ["override version", "second"] }"#).unwrap();

        base.merge(override_set);

        assert_eq!(base.rules["SHARED"].alternatives.len(), 2);
        assert!(base.rules.contains_key("BASE_ONLY"));
    }

    #[test]
    fn grammar_set_default() {
        let gs = GrammarSet::default();
        assert!(gs.rules.is_empty());
    }
}
