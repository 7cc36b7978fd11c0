use rapidfuzz::fuzz;

use crate::matching::domain::phonetic_encoder::PhoneticEncoder;
use crate::matching::domain::similarity_scorer::{ScoringError, SimilarityScorer};
use crate::matching::infrastructure::memo_cache::MemoCache;
use crate::shared::constants::PHONETIC_CACHE_CAPACITY;

/// Scores how alike a query and each candidate sound.
///
/// Both sides are reduced to pronunciation keys, then compared with the
/// Indel ratio `2 * LCS / (len_a + len_b)`, which tolerates the small
/// spelling slips a recognizer makes on homophones.
pub struct PhoneticScorer<E: PhoneticEncoder> {
    encoder: E,
    codes: MemoCache<String>,
}

impl<E: PhoneticEncoder> PhoneticScorer<E> {
    pub fn new(encoder: E) -> Self {
        Self::with_capacity(encoder, PHONETIC_CACHE_CAPACITY)
    }

    pub fn with_capacity(encoder: E, capacity: usize) -> Self {
        Self {
            encoder,
            codes: MemoCache::new(capacity),
        }
    }

    fn code(&self, text: &str) -> String {
        self.codes
            .get_or_insert_with(text, || self.encoder.encode(text))
    }
}

impl<E: PhoneticEncoder> SimilarityScorer for PhoneticScorer<E> {
    fn name(&self) -> &'static str {
        "phonetic"
    }

    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f64>, ScoringError> {
        let query_code = self.code(query);
        Ok(candidates
            .iter()
            .map(|candidate| {
                let code = self.code(candidate);
                fuzz::ratio(query_code.chars(), code.chars())
            })
            .collect())
    }
}
