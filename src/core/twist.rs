/// Canned plot-twist sentences keyed by emotion.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::story_data::DataError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotTwists {
    /// Used for any emotion without its own line.
    pub fallback: String,
    #[serde(default)]
    pub twists: FxHashMap<String, String>,
}

impl PlotTwists {
    pub fn parse_ron(input: &str) -> Result<Self, ron::error::SpannedError> {
        let mut twists: PlotTwists = ron::from_str(input)?;
        twists.twists = twists
            .twists
            .into_iter()
            .map(|(emotion, line)| (emotion.to_lowercase(), line))
            .collect();
        Ok(twists)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse_ron(&contents)?)
    }

    /// The twist sentence for an emotion label.
    pub fn for_emotion(&self, emotion: &str) -> &str {
        self.twists
            .get(emotion)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

impl Default for PlotTwists {
    fn default() -> Self {
        Self {
            fallback: "Then, everything changed in an instant.".to_string(),
            twists: FxHashMap::default(),
        }
    }
}
