/// The main narrative pipeline: emotion + entities → story text.
///
/// Wires together grammar expansion, the similarity gate, moral scoring,
/// the tone pass and plot twists.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::core::config::{ConfigError, EngineConfig};
use crate::core::context::{Continuity, NarrativeContext};
use crate::core::grammar::{ExpansionContext, GrammarError};
use crate::core::story_data::{DataError, StoryData};
use crate::core::text::capitalize_first;
use crate::core::tone::TonePass;
use crate::schema::emotion::Emotion;
use crate::schema::entity::EntityMemory;
use crate::schema::part_of_speech::PartOfSpeech;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single narrative session: one emotion, one cast, one history.
pub struct NarrativeEngine {
    data: StoryData,
    config: EngineConfig,
    emotion: Emotion,
    memory: EntityMemory,
    context: NarrativeContext,
    rng: StdRng,
    seed: Option<u64>,
}

/// Builder for constructing a `NarrativeEngine`.
pub struct NarrativeEngineBuilder {
    emotion: String,
    protagonist: String,
    setting: String,
    seed: Option<u64>,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    /// Directly provided tables (for testing without files).
    data: Option<StoryData>,
    /// Directly provided config (for testing without files).
    config: Option<EngineConfig>,
}

impl NarrativeEngine {
    pub fn builder() -> NarrativeEngineBuilder {
        NarrativeEngineBuilder {
            emotion: String::new(),
            protagonist: String::new(),
            setting: String::new(),
            seed: None,
            data_dir: None,
            config_path: None,
            data: None,
            config: None,
        }
    }

    /// Engine over the built-in tables, seeded from OS entropy.
    pub fn new(emotion: &str, protagonist: &str, setting: &str) -> Result<Self, PipelineError> {
        Self::builder()
            .emotion(emotion)
            .protagonist(protagonist)
            .setting(setting)
            .build()
    }

    pub fn emotion(&self) -> &Emotion {
        &self.emotion
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn data(&self) -> &StoryData {
        &self.data
    }

    pub fn memory(&self) -> &EntityMemory {
        &self.memory
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sentences tracked for continuity, oldest first. The opening
    /// "journey began" line of each story is not among them.
    pub fn story_sentences(&self) -> &[String] {
        self.context.sentences()
    }

    pub fn entity(&self, role: &str) -> Option<&str> {
        self.memory.get(role)
    }

    /// Bind a role so grammars can reference it as `{role}`.
    pub fn add_entity(&mut self, role: &str, value: &str) {
        self.memory.set(role, value);
    }

    pub fn used_nouns(&self) -> &[String] {
        self.memory.used_nouns()
    }

    /// Pick a word for `pos` in the engine's emotion, falling back to a
    /// random bucket of the category for unknown emotions.
    pub fn choose_word(&mut self, pos: PartOfSpeech) -> Result<String, PipelineError> {
        let word = self
            .data
            .lexicon
            .choose_word(pos, self.emotion.label(), &mut self.rng)
            .ok_or(GrammarError::EmptyCategory(pos))?
            .to_string();
        if pos == PartOfSpeech::Noun {
            self.memory.record_noun(&word);
        }
        Ok(word)
    }

    /// Expand the start symbol into one finished sentence.
    pub fn generate_sentence(&mut self) -> Result<String, PipelineError> {
        let mut ctx = ExpansionContext {
            lexicon: &self.data.lexicon,
            emotion: self.emotion.label(),
            memory: &mut self.memory,
            max_depth: self.config.max_expansion_depth,
        };
        let expanded = self
            .data
            .grammar
            .expand(&self.config.start_symbol, &mut ctx, &mut self.rng)?;
        let expanded = self.memory.substitute(&expanded);
        Ok(format!("{}.", capitalize_first(expanded.trim())))
    }

    /// Generate a story of `length` sentences.
    ///
    /// The first sentence is always "<protagonist>'s journey began in
    /// <setting>." and is not tracked for continuity. Each following
    /// sentence is compared with the previous tracked sentence and redrawn
    /// once if it drifts below the similarity threshold.
    pub fn generate_story(&mut self, length: usize) -> Result<String, PipelineError> {
        let mut story = Vec::with_capacity(length.max(1));
        story.push(format!(
            "{}'s journey began in {}.",
            self.memory.protagonist(),
            self.memory.setting()
        ));

        for _ in 1..length {
            let mut sentence = self.generate_sentence()?;
            if let Continuity::Drifting(score) = self.context.check_continuity(&sentence) {
                debug!(
                    score,
                    threshold = self.context.threshold(),
                    rejected = sentence.as_str(),
                    "sentence drifted, drawing once more"
                );
                sentence = self.generate_sentence()?;
            }
            trace!(sentence = sentence.as_str(), "accepted sentence");
            self.context.record(&sentence);
            story.push(sentence);
        }

        Ok(story.join(" "))
    }

    /// Story of the configured default length.
    pub fn generate_default_story(&mut self) -> Result<String, PipelineError> {
        self.generate_story(self.config.story_length)
    }

    /// Mean moral weight of the story's words, rounded to two decimals.
    pub fn calculate_moral_score(&self, story: &str) -> f64 {
        self.data.moral_weights.score(story)
    }

    /// Rewrite the story's weighted words into `new_tone`.
    pub fn rewrite_tone(&mut self, story: &str, new_tone: &str) -> String {
        TonePass::apply(
            story,
            new_tone,
            &self.data.lexicon,
            &self.data.moral_weights,
            &mut self.rng,
        )
    }

    /// The canned twist for this emotion, also appended to the history.
    pub fn generate_plot_twist(&mut self) -> String {
        let twist = self
            .data
            .plot_twists
            .for_emotion(self.emotion.label())
            .to_string();
        self.context.record(&twist);
        twist
    }

    /// Load a previously shown story into the history so continuity checks
    /// and twists pick up where it left off. Splits on `". "` and skips
    /// empty pieces.
    pub fn resume_story(&mut self, story: &str) {
        for sentence in story.split(". ").filter(|s| !s.trim().is_empty()) {
            self.context.record(sentence);
        }
    }
}

impl NarrativeEngineBuilder {
    pub fn emotion(mut self, emotion: &str) -> Self {
        self.emotion = emotion.to_string();
        self
    }

    pub fn protagonist(mut self, name: &str) -> Self {
        self.protagonist = name.to_string();
        self
    }

    pub fn setting(mut self, setting: &str) -> Self {
        self.setting = setting.to_string();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read lexicon, grammar, weights and twists from a directory instead
    /// of the built-in tables.
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide tables directly (for testing without files).
    pub fn with_data(mut self, data: StoryData) -> Self {
        self.data = Some(data);
        self
    }

    /// Provide config directly (for testing without files).
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<NarrativeEngine, PipelineError> {
        let data = match (self.data, self.data_dir) {
            (Some(data), _) => data,
            (None, Some(dir)) => StoryData::load_from_dir(&dir)?,
            (None, None) => StoryData::builtin()?,
        };

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(&path)?,
            (None, None) => EngineConfig::default(),
        };
        config.validate()?;
        data.grammar.validate(&config.start_symbol)?;

        let emotion = Emotion::parse(&self.emotion);
        if data.lexicon.all_emotions().iter().all(|e| *e != emotion.label()) {
            warn!(
                emotion = emotion.label(),
                "emotion has no lexicon buckets, words will come from random buckets"
            );
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            emotion = emotion.label(),
            seed = ?self.seed,
            rules = data.grammar.rules.len(),
            words = data.lexicon.len(),
            "narrative engine ready"
        );

        Ok(NarrativeEngine {
            memory: EntityMemory::new(&self.protagonist, &self.setting),
            context: NarrativeContext::new(config.similarity_threshold),
            data,
            config,
            emotion,
            rng,
            seed: self.seed,
        })
    }
}
