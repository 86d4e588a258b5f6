/// Emotion-bucketed word lists and the reverse word index.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::schema::part_of_speech::PartOfSpeech;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("unknown part of speech '{0}'")]
    UnknownPartOfSpeech(String),
    #[error("empty word list for {pos}/{emotion}")]
    EmptyBucket { pos: &'static str, emotion: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Emotion label → candidate words. Sorted so the fallback bucket picked
/// for a given seed never depends on hash order.
pub type EmotionBuckets = BTreeMap<String, Vec<String>>;

/// Words by part of speech and emotion.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<PartOfSpeech, EmotionBuckets>,
    /// word → (category, emotion) of its first occurrence.
    index: FxHashMap<String, (PartOfSpeech, String)>,
}

impl Lexicon {
    /// Build a lexicon, lower-casing emotion labels and rejecting empty buckets.
    pub fn new(entries: HashMap<PartOfSpeech, EmotionBuckets>) -> Result<Self, LexiconError> {
        let mut normalized: HashMap<PartOfSpeech, EmotionBuckets> = HashMap::new();
        for (pos, buckets) in entries {
            let target = normalized.entry(pos).or_default();
            for (emotion, words) in buckets {
                let words: Vec<String> = words
                    .into_iter()
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect();
                if words.is_empty() {
                    return Err(LexiconError::EmptyBucket {
                        pos: pos.name(),
                        emotion,
                    });
                }
                target
                    .entry(emotion.trim().to_lowercase())
                    .or_default()
                    .extend(words);
            }
        }

        let mut index = FxHashMap::default();
        for pos in PartOfSpeech::ALL {
            if let Some(buckets) = normalized.get(&pos) {
                for (emotion, words) in buckets {
                    for word in words {
                        index
                            .entry(word.to_lowercase())
                            .or_insert_with(|| (pos, emotion.clone()));
                    }
                }
            }
        }

        Ok(Self {
            entries: normalized,
            index,
        })
    }

    /// Load a lexicon from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a lexicon from RON of the shape
    /// `{ "noun": { "happy": ["smile", ...], ... }, ... }`.
    pub fn parse_ron(input: &str) -> Result<Self, LexiconError> {
        let raw: HashMap<String, EmotionBuckets> = ron::from_str(input)?;
        let mut entries = HashMap::new();
        for (name, buckets) in raw {
            let pos = PartOfSpeech::from_name(&name.to_lowercase())
                .ok_or_else(|| LexiconError::UnknownPartOfSpeech(name.clone()))?;
            entries.insert(pos, buckets);
        }
        Self::new(entries)
    }

    /// The word list for a category and emotion, if the bucket exists.
    pub fn words(&self, pos: PartOfSpeech, emotion: &str) -> Option<&[String]> {
        self.entries
            .get(&pos)
            .and_then(|buckets| buckets.get(emotion))
            .map(Vec::as_slice)
    }

    pub fn has_bucket(&self, pos: PartOfSpeech, emotion: &str) -> bool {
        self.words(pos, emotion).is_some()
    }

    /// Emotion labels present under a category, in sorted order.
    pub fn emotions(&self, pos: PartOfSpeech) -> impl Iterator<Item = &str> {
        self.entries
            .get(&pos)
            .into_iter()
            .flat_map(|buckets| buckets.keys().map(String::as_str))
    }

    /// Every emotion label that appears under any category.
    pub fn all_emotions(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = PartOfSpeech::ALL
            .iter()
            .flat_map(|pos| self.emotions(*pos))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Pick a word for `pos` in the given emotion.
    ///
    /// When the emotion has no bucket under `pos`, a random bucket of that
    /// category is used instead. Returns `None` only if the category has
    /// no buckets at all.
    pub fn choose_word<R: Rng + ?Sized>(
        &self,
        pos: PartOfSpeech,
        emotion: &str,
        rng: &mut R,
    ) -> Option<&str> {
        if let Some(word) = self.words(pos, emotion).and_then(|words| words.choose(rng)) {
            return Some(word.as_str());
        }

        let buckets = self.entries.get(&pos)?;
        if buckets.is_empty() {
            return None;
        }
        let (fallback, words) = buckets.iter().nth(rng.gen_range(0..buckets.len()))?;
        debug!(
            pos = pos.name(),
            emotion,
            fallback = fallback.as_str(),
            "no lexicon bucket for emotion, using fallback"
        );
        words.choose(rng).map(String::as_str)
    }

    /// Find which category and emotion bucket a word first appears in.
    pub fn locate(&self, word: &str) -> Option<(PartOfSpeech, &str)> {
        self.index
            .get(&word.to_lowercase())
            .map(|(pos, emotion)| (*pos, emotion.as_str()))
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_key(&word.to_lowercase())
    }

    /// Number of distinct words across all buckets.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
