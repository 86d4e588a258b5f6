/// Incremental TF-IDF vectors and cosine similarity between sentences.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::text::tokenize;

/// Added to the cosine denominator so zero vectors score 0 instead of NaN.
const NORM_EPSILON: f64 = 1e-10;

/// Word → TF-IDF weight for one sentence. Ordered so dot products sum in
/// the same order regardless of argument order.
pub type TermVector = BTreeMap<String, f64>;

/// Builds a TF-IDF vector per sentence against a corpus made of every
/// sentence it has seen so far.
///
/// Each distinct sentence text is one document. A vector is computed once,
/// with the corpus counts current at that moment, and then cached for the
/// lifetime of the checker; later sentences never change earlier vectors.
#[derive(Debug, Default)]
pub struct SemanticChecker {
    vectors: FxHashMap<String, Arc<TermVector>>,
    /// word → document index → occurrences.
    term_counts: FxHashMap<String, FxHashMap<usize, u32>>,
    documents: usize,
}

impl SemanticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct sentences vectorized so far.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn is_cached(&self, sentence: &str) -> bool {
        self.vectors.contains_key(sentence)
    }

    /// Return the vector for `sentence`, computing and caching it on first sight.
    pub fn vectorize(&mut self, sentence: &str) -> Arc<TermVector> {
        if let Some(vector) = self.vectors.get(sentence) {
            return Arc::clone(vector);
        }

        let tokens = tokenize(sentence);
        let doc = self.documents;
        for token in &tokens {
            *self
                .term_counts
                .entry(token.clone())
                .or_default()
                .entry(doc)
                .or_default() += 1;
        }
        self.documents += 1;

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_default() += 1;
        }

        let total_tokens = tokens.len().max(1) as f64;
        let total_docs = self.documents as f64;
        let vector: TermVector = counts
            .into_iter()
            .map(|(word, count)| {
                let doc_freq = self.term_counts.get(word).map_or(0, |docs| docs.len()) as f64;
                let tf = count as f64 / total_tokens;
                let idf = (total_docs / (1.0 + doc_freq)).ln();
                (word.to_string(), tf * idf)
            })
            .collect();

        let vector = Arc::new(vector);
        self.vectors
            .insert(sentence.to_string(), Arc::clone(&vector));
        vector
    }

    /// Cosine similarity between two sentences, restricted to shared words
    /// in the numerator. Exactly 0.0 when they share no tokens.
    pub fn similarity(&mut self, a: &str, b: &str) -> f64 {
        let va = self.vectorize(a);
        let vb = self.vectorize(b);
        cosine(&va, &vb)
    }
}

/// Dot product over shared words divided by the product of the full norms.
pub fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(word, wa)| b.get(word).map(|wb| wa * wb))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    dot / (norm(a) * norm(b) + NORM_EPSILON)
}

fn norm(v: &TermVector) -> f64 {
    v.values().map(|w| w * w).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vector_uses_single_document_idf() {
        let mut checker = SemanticChecker::new();
        let v = checker.vectorize("smile smile friend");
        // N = 1, df = 1 for both words → idf = ln(1/2)
        let idf = (0.5f64).ln();
        assert!((v["smile"] - (2.0 / 3.0) * idf).abs() < 1e-12);
        assert!((v["friend"] - (1.0 / 3.0) * idf).abs() < 1e-12);
        assert_eq!(checker.document_count(), 1);
    }

    #[test]
    fn later_documents_see_updated_counts() {
        let mut checker = SemanticChecker::new();
        checker.vectorize("the smile");
        let v = checker.vectorize("the tear");
        // "the" appears in 2 of 2 docs, "tear" in 1 of 2.
        assert!((v["the"] - 0.5 * (2.0f64 / 3.0).ln()).abs() < 1e-12);
        assert!((v["tear"] - 0.5 * (2.0f64 / 2.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn cached_vectors_are_not_recomputed() {
        let mut checker = SemanticChecker::new();
        let first = checker.vectorize("A bright smile danced.");
        checker.vectorize("A gloomy tear fell.");
        checker.vectorize("Another bright morning.");
        let second = checker.vectorize("A bright smile danced.");
        assert_eq!(*first, *second);
        for (word, weight) in first.iter() {
            assert_eq!(weight.to_bits(), second[word].to_bits());
        }
        assert_eq!(checker.document_count(), 3);
    }

    #[test]
    fn identical_text_counts_as_one_document() {
        let mut checker = SemanticChecker::new();
        checker.vectorize("same words");
        checker.vectorize("same words");
        assert_eq!(checker.document_count(), 1);
        assert!(checker.is_cached("same words"));
        assert!(!checker.is_cached("Same words"));
    }

    #[test]
    fn self_similarity_is_one() {
        let mut checker = SemanticChecker::new();
        let s = "The bright smile laughed cheerfully.";
        let sim = checker.similarity(s, s);
        assert!((sim - 1.0).abs() < 1e-6, "got {}", sim);
    }

    #[test]
    fn similarity_is_symmetric() {
        let mut checker = SemanticChecker::new();
        let a = "The bright smile danced in the rain.";
        let b = "A gloomy tear fell in the rain.";
        let ab = checker.similarity(a, b);
        let ba = checker.similarity(b, a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn disjoint_sentences_score_zero() {
        let mut checker = SemanticChecker::new();
        assert_eq!(checker.similarity("bright smile", "gloomy tear"), 0.0);
    }

    #[test]
    fn empty_sentence_scores_zero() {
        let mut checker = SemanticChecker::new();
        assert_eq!(checker.similarity("", "bright smile"), 0.0);
        assert_eq!(checker.similarity("...", "..."), 0.0);
    }

    #[test]
    fn shared_words_give_nonzero_similarity() {
        let mut checker = SemanticChecker::new();
        let sim = checker.similarity("the bright smile", "the bright tear");
        assert!(sim != 0.0);
        assert!(sim.abs() <= 1.0 + 1e-9);
    }

    #[test]
    fn similarity_is_case_insensitive() {
        let mut checker = SemanticChecker::new();
        let sim = checker.similarity("Bright SMILE", "bright smile");
        assert!(sim > 0.0);
    }
}
