use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::candidate_set::CandidateSet;
use super::similarity_scorer::SimilarityScorer;
use crate::shared::constants::{
    DEFAULT_PHONETIC_WEIGHT, DEFAULT_SCORE_THRESHOLD, DEFAULT_SEMANTIC_WEIGHT,
};

/// Weights and validity threshold for the hybrid score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerWeights {
    pub phonetic_weight: f64,
    pub semantic_weight: f64,
    /// Raw scores below this are treated as no evidence.
    pub threshold: f64,
}

impl Default for CombinerWeights {
    fn default() -> Self {
        Self {
            phonetic_weight: DEFAULT_PHONETIC_WEIGHT,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub segment_id: String,
    pub score: f64,
}

/// Merges phonetic and semantic evidence into one ranking.
///
/// Each score column is min-max normalized over the current batch only, so
/// scores from different calls are not comparable.
pub struct ScoreCombiner {
    phonetic: Arc<dyn SimilarityScorer>,
    semantic: Arc<dyn SimilarityScorer>,
    weights: CombinerWeights,
}

impl ScoreCombiner {
    pub fn new(
        phonetic: Arc<dyn SimilarityScorer>,
        semantic: Arc<dyn SimilarityScorer>,
        weights: CombinerWeights,
    ) -> Self {
        Self {
            phonetic,
            semantic,
            weights,
        }
    }

    pub fn weights(&self) -> CombinerWeights {
        self.weights
    }

    /// Ranks `candidates` against `query`, best first.
    ///
    /// Ties keep candidate order. Never fails: a scorer error leaves its
    /// column without evidence.
    pub fn combine(&self, query: &str, candidates: &CandidateSet) -> Vec<RankedCandidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let texts = candidates.texts();
        let raw_p = raw_scores(&*self.phonetic, query, &texts);
        let raw_s = raw_scores(&*self.semantic, query, &texts);
        let norm_p = normalize_column(&raw_p, self.weights.threshold);
        let norm_s = normalize_column(&raw_s, self.weights.threshold);

        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .enumerate()
            .map(|(i, candidate)| RankedCandidate {
                segment_id: candidate.segment_id.clone(),
                score: self.weights.phonetic_weight * norm_p[i]
                    + self.weights.semantic_weight * norm_s[i],
            })
            .collect();

        // `sort_by` is stable, so equal scores keep candidate order.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// One raw score per text; absent, failed, or non-finite scores become 0.0.
fn raw_scores(scorer: &dyn SimilarityScorer, query: &str, texts: &[&str]) -> Vec<f64> {
    let scores = match scorer.score(query, texts) {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("{} scorer failed, ignoring its scores: {e}", scorer.name());
            Vec::new()
        }
    };
    (0..texts.len())
        .map(|i| {
            scores
                .get(i)
                .copied()
                .filter(|s| s.is_finite())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Min-max normalizes the valid entries of one column.
///
/// Entries below `threshold` become 0.0. Min and max are taken over the
/// whole column; a zero range saturates valid entries to 1.0.
fn normalize_column(raw: &[f64], threshold: f64) -> Vec<f64> {
    let (min, max) = raw
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0));
    let range = max - min;

    raw.iter()
        .map(|&v| {
            if v < threshold {
                0.0
            } else if range > 0.0 {
                (v - min) / range
            } else {
                1.0
            }
        })
        .collect()
}
