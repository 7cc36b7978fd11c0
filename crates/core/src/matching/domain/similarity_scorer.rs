use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("{scorer} backend failed: {message}")]
    Backend { scorer: &'static str, message: String },
}

/// Domain interface for one similarity signal between a query and candidates.
///
/// Returns one score in `[0, 1]` per candidate, in candidate order. A
/// shorter result leaves the trailing candidates without a score.
pub trait SimilarityScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f64>, ScoringError>;
}
