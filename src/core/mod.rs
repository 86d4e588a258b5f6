pub mod config;
pub mod context;
pub mod grammar;
pub mod lexicon;
pub mod morality;
pub mod pipeline;
pub mod semantic;
pub mod story_data;
pub mod text;
pub mod tone;
pub mod twist;
