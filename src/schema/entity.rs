use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Role name of the story's main character.
pub const PROTAGONIST: &str = "protagonist";
/// Role name of the place the story opens in.
pub const SETTING: &str = "setting";

/// Named story entities plus the log of nouns the grammar has emitted.
///
/// Grammars reference entities by role with `{role}` placeholders. The
/// memory starts with `protagonist` and `setting` and can be extended
/// with any further role during a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMemory {
    entities: FxHashMap<String, String>,
    used_nouns: Vec<String>,
}

impl EntityMemory {
    pub fn new(protagonist: &str, setting: &str) -> Self {
        let mut entities = FxHashMap::default();
        entities.insert(PROTAGONIST.to_string(), protagonist.to_string());
        entities.insert(SETTING.to_string(), setting.to_string());
        Self {
            entities,
            used_nouns: Vec::new(),
        }
    }

    pub fn protagonist(&self) -> &str {
        self.get(PROTAGONIST).unwrap_or_default()
    }

    pub fn setting(&self) -> &str {
        self.get(SETTING).unwrap_or_default()
    }

    /// Returns the current value bound to `role`, if any.
    pub fn get(&self, role: &str) -> Option<&str> {
        self.entities.get(role).map(String::as_str)
    }

    /// Bind `role` to `value`, replacing any previous binding.
    pub fn set(&mut self, role: &str, value: &str) {
        self.entities.insert(role.to_string(), value.to_string());
    }

    pub fn roles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entities
            .iter()
            .map(|(role, value)| (role.as_str(), value.as_str()))
    }

    /// Append a noun to the usage log. Repeats are kept.
    pub fn record_noun(&mut self, noun: &str) {
        self.used_nouns.push(noun.to_string());
    }

    pub fn used_nouns(&self) -> &[String] {
        &self.used_nouns
    }

    pub fn has_used_noun(&self, noun: &str) -> bool {
        self.used_nouns.iter().any(|n| n == noun)
    }

    /// Replace every literal `{role}` in `text` with its bound value.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (role, value) in &self.entities {
            let placeholder = format!("{{{}}}", role);
            if out.contains(&placeholder) {
                out = out.replace(&placeholder, value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_protagonist_and_setting() {
        let memory = EntityMemory::new("Mira", "a quiet village");
        assert_eq!(memory.protagonist(), "Mira");
        assert_eq!(memory.setting(), "a quiet village");
        assert_eq!(memory.roles().count(), 2);
        assert!(memory.used_nouns().is_empty());
    }

    #[test]
    fn extra_roles_can_be_added_and_replaced() {
        let mut memory = EntityMemory::new("Mira", "a quiet village");
        memory.set("companion", "Oren");
        assert_eq!(memory.get("companion"), Some("Oren"));

        memory.set(PROTAGONIST, "Talia");
        assert_eq!(memory.protagonist(), "Talia");
        assert_eq!(memory.get("missing"), None);
    }

    #[test]
    fn noun_log_keeps_duplicates() {
        let mut memory = EntityMemory::default();
        memory.record_noun("smile");
        memory.record_noun("smile");
        memory.record_noun("friend");
        assert_eq!(memory.used_nouns().len(), 3);
        assert!(memory.has_used_noun("smile"));
        assert!(!memory.has_used_noun("tear"));
    }

    #[test]
    fn substitute_replaces_known_roles_only() {
        let memory = EntityMemory::new("Mira", "the harbor");
        let out = memory.substitute("{protagonist} waited in {setting} for {stranger}");
        assert_eq!(out, "Mira waited in the harbor for {stranger}");
    }

    #[test]
    fn default_memory_has_empty_names() {
        let memory = EntityMemory::default();
        assert_eq!(memory.protagonist(), "");
        assert_eq!(memory.setting(), "");
    }
}
