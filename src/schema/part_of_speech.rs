use serde::{Deserialize, Serialize};

/// Word categories the lexicon is organised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// Lookup order for the reverse index: the first category holding a
    /// word wins.
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// Returns the placeholder name used in grammars (e.g., "noun" for `{noun}`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "noun" => Some(Self::Noun),
            "verb" => Some(Self::Verb),
            "adjective" => Some(Self::Adjective),
            "adverb" => Some(Self::Adverb),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for pos in PartOfSpeech::ALL {
            assert_eq!(PartOfSpeech::from_name(pos.name()), Some(pos));
        }
    }

    #[test]
    fn unknown_name() {
        assert_eq!(PartOfSpeech::from_name("pronoun"), None);
        assert_eq!(PartOfSpeech::from_name("Noun"), None);
    }
}
