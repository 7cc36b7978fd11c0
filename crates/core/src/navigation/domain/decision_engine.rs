use serde::{Deserialize, Serialize};

use crate::corpus::domain::corpus::Corpus;
use crate::corpus::domain::segment::Segment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Forward,
    Stay,
}

/// Outcome of matching: where the display should be.
///
/// `target_transcript_id` is the current transcript on stay and `None`
/// only when the current index does not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationDecision {
    pub decision: Decision,
    pub target_transcript_id: Option<String>,
}

/// How a matched segment relates to the current transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchCase {
    /// Match sits on the last segment of an early-forward transcript.
    EarlyForwardBoundary,
    /// Match belongs to the current transcript.
    WithinCurrent,
    /// Match belongs to another transcript, or to an unknown one.
    OtherTranscript { owner_index: Option<usize> },
}

fn classify(
    is_current_source: bool,
    early_forward: bool,
    is_next_source_different: bool,
    owner_index: Option<usize>,
) -> MatchCase {
    match (is_current_source, early_forward, is_next_source_different) {
        (true, true, true) => MatchCase::EarlyForwardBoundary,
        (true, true, false) | (true, false, true) | (true, false, false) => {
            MatchCase::WithinCurrent
        }
        (false, true, true)
        | (false, true, false)
        | (false, false, true)
        | (false, false, false) => MatchCase::OtherTranscript { owner_index },
    }
}

/// Resolves a case to a decision and the target transcript index.
fn resolve(case: MatchCase, current_index: usize, transcript_count: usize) -> (Decision, usize) {
    match case {
        MatchCase::EarlyForwardBoundary if current_index + 1 < transcript_count => {
            (Decision::Forward, current_index + 1)
        }
        MatchCase::EarlyForwardBoundary | MatchCase::WithinCurrent => {
            (Decision::Stay, current_index)
        }
        MatchCase::OtherTranscript {
            owner_index: Some(owner),
        } if owner > current_index => (Decision::Forward, owner),
        MatchCase::OtherTranscript { .. } => (Decision::Stay, current_index),
    }
}

/// Decides whether a match moves the display forward.
///
/// Pure and total: every combination of inputs yields a decision, and
/// forward always targets an index above `current_index`.
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn decide(corpus: &Corpus, current_index: usize, matched: &Segment) -> NavigationDecision {
        let Some(current) = corpus.transcript_at(current_index) else {
            return NavigationDecision {
                decision: Decision::Stay,
                target_transcript_id: None,
            };
        };

        let owner = matched.owner();
        let is_current_source = owner == Some(current.id.as_str());
        let is_next_source_different = corpus
            .segment_at(matched.sequence_index + 1)
            .is_some_and(|next| next.owner() != owner);
        let owner_index = owner.and_then(|id| corpus.transcript_index_of(id));

        let case = classify(
            is_current_source,
            current.early_forward,
            is_next_source_different,
            owner_index,
        );
        let (decision, target) = resolve(case, current_index, corpus.transcript_count());
        log::debug!(
            "Segment {} at transcript {}: {case:?} -> {decision:?} {target}",
            matched.id,
            current.id
        );

        NavigationDecision {
            decision,
            target_transcript_id: corpus.transcript_at(target).map(|t| t.id.clone()),
        }
    }
}
