use serde::{Deserialize, Serialize};

/// The mood a story is told in. Selects lexicon buckets and the canned
/// plot twist.
///
/// Labels outside the built-in set are kept as `Custom` rather than
/// rejected; word choice for them goes through the random-bucket fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Sad,
    Fearful,
    Suspense,
    Comedy,
    Custom(String),
}

impl Emotion {
    /// The built-in emotions, in display order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Fearful,
        Emotion::Suspense,
        Emotion::Comedy,
    ];

    /// Parse a label, lower-casing it first. Never fails.
    pub fn parse(label: &str) -> Self {
        let lowered = label.trim().to_lowercase();
        match lowered.as_str() {
            "happy" => Self::Happy,
            "sad" => Self::Sad,
            "fearful" => Self::Fearful,
            "suspense" => Self::Suspense,
            "comedy" => Self::Comedy,
            _ => Self::Custom(lowered),
        }
    }

    /// The lexicon key for this emotion (e.g., "happy").
    pub fn label(&self) -> &str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Fearful => "fearful",
            Self::Suspense => "suspense",
            Self::Comedy => "comedy",
            Self::Custom(label) => label,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<&str> for Emotion {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Emotion::parse("HAPPY"), Emotion::Happy);
        assert_eq!(Emotion::parse(" Comedy "), Emotion::Comedy);
        assert_eq!(Emotion::parse("suspense"), Emotion::Suspense);
    }

    #[test]
    fn unknown_label_is_kept_lowercased() {
        let e = Emotion::parse("Melancholic");
        assert_eq!(e, Emotion::Custom("melancholic".to_string()));
        assert_eq!(e.label(), "melancholic");
        assert!(e.is_custom());
    }

    #[test]
    fn labels_round_trip() {
        for emotion in Emotion::ALL.iter() {
            assert_eq!(&Emotion::parse(emotion.label()), emotion);
            assert!(!emotion.is_custom());
        }
    }
}
