//! WASM bindings for wordweaver — powers the browser story demo.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use wordweaver::schema::emotion::Emotion;
use wordweaver::NarrativeEngine;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct SessionInfo {
    emotion: String,
    protagonist: String,
    setting: String,
    entities: BTreeMap<String, String>,
    seed: Option<u64>,
    sentences: Vec<String>,
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// WordWeaver — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct WordWeaver {
    engine: NarrativeEngine,
}

#[wasm_bindgen]
impl WordWeaver {
    /// Create a story session. Without a seed the engine draws from the
    /// browser's crypto RNG.
    #[wasm_bindgen(constructor)]
    pub fn new(
        emotion: &str,
        protagonist: &str,
        setting: &str,
        seed: Option<u64>,
    ) -> Result<WordWeaver, JsError> {
        let mut builder = NarrativeEngine::builder()
            .emotion(emotion)
            .protagonist(protagonist)
            .setting(setting);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        let engine = builder
            .build()
            .map_err(|e| js_err("Engine build error", e))?;

        Ok(WordWeaver { engine })
    }

    /// Generate a story. Uses the configured default length when `length`
    /// is omitted.
    pub fn generate_story(&mut self, length: Option<usize>) -> Result<String, JsError> {
        let story = match length {
            Some(length) => self.engine.generate_story(length),
            None => self.engine.generate_default_story(),
        };
        story.map_err(|e| js_err("Generation error", e))
    }

    pub fn calculate_moral_score(&self, story: &str) -> f64 {
        self.engine.calculate_moral_score(story)
    }

    pub fn rewrite_tone(&mut self, story: &str, new_tone: &str) -> String {
        self.engine.rewrite_tone(story, new_tone)
    }

    pub fn generate_plot_twist(&mut self) -> String {
        self.engine.generate_plot_twist()
    }

    /// Feed back a story shown earlier, e.g. after a page reload.
    pub fn resume_story(&mut self, story: &str) {
        self.engine.resume_story(story);
    }

    /// Bind an extra role usable as `{role}` in the grammar.
    pub fn add_entity(&mut self, role: &str, value: &str) {
        self.engine.add_entity(role, value);
    }

    /// Return a JSON description of the current session.
    pub fn get_session(&self) -> Result<String, JsError> {
        let memory = self.engine.memory();
        let info = SessionInfo {
            emotion: self.engine.emotion().label().to_string(),
            protagonist: memory.protagonist().to_string(),
            setting: memory.setting().to_string(),
            entities: memory
                .roles()
                .map(|(role, value)| (role.to_string(), value.to_string()))
                .collect(),
            seed: self.engine.seed(),
            sentences: self.engine.story_sentences().to_vec(),
        };
        serde_json::to_string(&info).map_err(|e| js_err("Serialization error", e))
    }

    /// Return JSON array of the built-in emotion labels.
    pub fn emotions() -> String {
        let labels: Vec<String> = Emotion::ALL
            .iter()
            .map(|e| e.label().to_string())
            .collect();
        serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start over with a new seed, keeping emotion and every bound role.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let emotion = self.engine.emotion().label().to_string();
        let memory = self.engine.memory();
        let mut fresh =
            WordWeaver::new(&emotion, memory.protagonist(), memory.setting(), Some(seed))?;
        for (role, value) in memory.roles() {
            fresh.engine.add_entity(role, value);
        }
        self.engine = fresh.engine;
        Ok(())
    }
}
