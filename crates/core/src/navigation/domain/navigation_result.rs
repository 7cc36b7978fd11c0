use std::time::Instant;

use serde::Serialize;

use super::decision_engine::Decision;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub score: f64,
    pub segment_id: String,
}

/// Everything one `navigate` call produced, for logging and display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavigationResult {
    pub decision: Decision,
    /// Normalized query, trimmed to the query window.
    pub query: String,
    pub candidate_ids: Vec<String>,
    /// Top-ranked candidates, best first.
    pub suggestions: Vec<Suggestion>,
    pub matched_segment_id: Option<String>,
    pub target_transcript_id: Option<String>,
    pub elapsed_ms: f64,
}

impl NavigationResult {
    pub fn stay(query: String, started: Instant) -> Self {
        Self {
            decision: Decision::Stay,
            query,
            candidate_ids: Vec::new(),
            suggestions: Vec::new(),
            matched_segment_id: None,
            target_transcript_id: None,
            elapsed_ms: elapsed_ms(started),
        }
    }

    pub fn is_forward(&self) -> bool {
        self.decision == Decision::Forward
    }

    pub fn best_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }
}

pub fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
