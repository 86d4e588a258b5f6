/// The read-only tables an engine generates from.

use std::path::Path;
use thiserror::Error;

use crate::core::grammar::{GrammarError, GrammarSet};
use crate::core::lexicon::{Lexicon, LexiconError};
use crate::core::morality::MoralWeights;
use crate::core::twist::PlotTwists;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// File names expected inside a data directory.
pub const LEXICON_FILE: &str = "lexicon.ron";
pub const GRAMMAR_FILE: &str = "grammar.ron";
pub const MORAL_WEIGHTS_FILE: &str = "moral_weights.ron";
pub const PLOT_TWISTS_FILE: &str = "plot_twists.ron";

/// Lexicon, grammar, moral weights and plot twists, shared read-only by
/// every engine built from them.
#[derive(Debug, Clone, Default)]
pub struct StoryData {
    pub lexicon: Lexicon,
    pub grammar: GrammarSet,
    pub moral_weights: MoralWeights,
    pub plot_twists: PlotTwists,
}

impl StoryData {
    /// Parse all four tables from RON sources.
    pub fn parse_ron(
        lexicon: &str,
        grammar: &str,
        moral_weights: &str,
        plot_twists: &str,
    ) -> Result<Self, DataError> {
        Ok(Self {
            lexicon: Lexicon::parse_ron(lexicon)?,
            grammar: GrammarSet::parse_ron(grammar)?,
            moral_weights: MoralWeights::parse_ron(moral_weights)?,
            plot_twists: PlotTwists::parse_ron(plot_twists)?,
        })
    }

    /// Load the tables from a directory. Missing weight or twist files
    /// leave those tables empty; lexicon and grammar are required.
    pub fn load_from_dir(dir: &Path) -> Result<Self, DataError> {
        let lexicon = Lexicon::load_from_ron(&dir.join(LEXICON_FILE))?;
        let grammar = GrammarSet::load_from_ron(&dir.join(GRAMMAR_FILE))?;

        let weights_path = dir.join(MORAL_WEIGHTS_FILE);
        let moral_weights = if weights_path.exists() {
            MoralWeights::load_from_ron(&weights_path)?
        } else {
            MoralWeights::default()
        };

        let twists_path = dir.join(PLOT_TWISTS_FILE);
        let plot_twists = if twists_path.exists() {
            PlotTwists::load_from_ron(&twists_path)?
        } else {
            PlotTwists::default()
        };

        Ok(Self {
            lexicon,
            grammar,
            moral_weights,
            plot_twists,
        })
    }

    /// The tables compiled into the library.
    pub fn builtin() -> Result<Self, DataError> {
        crate::genre_templates::wordweaver()
    }
}
