//! Built-in story data, compiled into the library from `genre_data/`.

use crate::core::story_data::{DataError, StoryData};

pub const WORDWEAVER_LEXICON: &str = include_str!("../genre_data/wordweaver/lexicon.ron");
pub const WORDWEAVER_GRAMMAR: &str = include_str!("../genre_data/wordweaver/grammar.ron");
pub const WORDWEAVER_MORAL_WEIGHTS: &str =
    include_str!("../genre_data/wordweaver/moral_weights.ron");
pub const WORDWEAVER_PLOT_TWISTS: &str = include_str!("../genre_data/wordweaver/plot_twists.ron");

/// The default lexicon, grammar, weights and twists.
pub fn wordweaver() -> Result<StoryData, DataError> {
    StoryData::parse_ron(
        WORDWEAVER_LEXICON,
        WORDWEAVER_GRAMMAR,
        WORDWEAVER_MORAL_WEIGHTS,
        WORDWEAVER_PLOT_TWISTS,
    )
}
