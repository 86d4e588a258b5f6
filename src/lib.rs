//! WordWeaver — emotion-conditioned story generation.
//!
//! Builds short stories from an emotion, a protagonist and a setting by
//! expanding a context-free grammar over an emotion-bucketed lexicon,
//! keeps consecutive sentences on topic with an incremental TF-IDF
//! similarity check, and scores or retones finished text.

pub mod core;
pub mod genre_templates;
pub mod schema;

pub use crate::core::config::EngineConfig;
pub use crate::core::pipeline::{NarrativeEngine, NarrativeEngineBuilder, PipelineError};
pub use crate::core::story_data::StoryData;
pub use crate::schema::emotion::Emotion;
