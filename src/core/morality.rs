/// Moral weights and sentiment scoring of finished text.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::text::{round2, tokenize};

/// Signed per-word weights, roughly in [-1, 1]. Keys are lower-cased.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoralWeights {
    weights: FxHashMap<String, f64>,
}

impl MoralWeights {
    pub fn new(weights: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            weights: weights
                .into_iter()
                .map(|(word, weight)| (word.to_lowercase(), weight))
                .collect(),
        }
    }

    /// Parse a RON map of word → weight.
    pub fn parse_ron(input: &str) -> Result<Self, ron::error::SpannedError> {
        let raw: HashMap<String, f64> = ron::from_str(input)?;
        Ok(Self::new(raw))
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, crate::core::story_data::DataError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse_ron(&contents)?)
    }

    /// Weight of a word, 0.0 when it is not in the table.
    pub fn weight(&self, word: &str) -> f64 {
        self.weights
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.weights.contains_key(&word.to_lowercase())
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Mean weight over every token of `text`, rounded to two decimals.
    /// Text with no tokens scores 0.0.
    pub fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let total: f64 = tokens.iter().map(|t| self.weight(t)).sum();
        round2(total / tokens.len().max(1) as f64)
    }
}
