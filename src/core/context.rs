/// Narrative context — the similarity-tracked sentence history.

use crate::core::semantic::SemanticChecker;

/// Outcome of comparing a candidate sentence with the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuity {
    /// Nothing to compare against yet.
    Opening,
    /// Similar enough to the previous sentence.
    Continuous(f64),
    /// Below the threshold; the caller should draw once more.
    Drifting(f64),
}

impl Continuity {
    pub fn is_drifting(&self) -> bool {
        matches!(self, Self::Drifting(_))
    }
}

/// Append-only history of generated sentences, plus the checker that
/// scores each new candidate against the last accepted one.
#[derive(Debug)]
pub struct NarrativeContext {
    sentences: Vec<String>,
    checker: SemanticChecker,
    threshold: f64,
}

impl NarrativeContext {
    pub fn new(threshold: f64) -> Self {
        Self {
            sentences: Vec::new(),
            checker: SemanticChecker::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare `candidate` against the most recent sentence.
    pub fn check_continuity(&mut self, candidate: &str) -> Continuity {
        let Some(previous) = self.sentences.last() else {
            return Continuity::Opening;
        };
        let score = self.checker.similarity(previous, candidate);
        if score < self.threshold {
            Continuity::Drifting(score)
        } else {
            Continuity::Continuous(score)
        }
    }

    pub fn record(&mut self, sentence: &str) {
        self.sentences.push(sentence.to_string());
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn last(&self) -> Option<&str> {
        self.sentences.last().map(String::as_str)
    }

    pub fn checker(&self) -> &SemanticChecker {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut SemanticChecker {
        &mut self.checker
    }
}
