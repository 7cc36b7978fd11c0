use std::sync::Arc;
use std::time::Instant;

use crate::corpus::domain::corpus::Corpus;
use crate::matching::domain::score_combiner::ScoreCombiner;
use crate::navigation::domain::candidate_windower::CandidateWindower;
use crate::navigation::domain::decision_engine::DecisionEngine;
use crate::navigation::domain::navigation_result::{elapsed_ms, NavigationResult, Suggestion};
use crate::shared::constants::{QUERY_WINDOW_TOKENS, SUGGESTION_COUNT};
use crate::shared::text_normalizer::{last_tokens, normalize};

/// Matches an utterance against the transcripts around a position.
///
/// Side-effect free; one navigator can serve several threads over a
/// shared corpus.
pub struct Navigator {
    corpus: Arc<Corpus>,
    combiner: ScoreCombiner,
    query_window: usize,
}

impl Navigator {
    pub fn new(corpus: Arc<Corpus>, combiner: ScoreCombiner) -> Self {
        Self {
            corpus,
            combiner,
            query_window: QUERY_WINDOW_TOKENS,
        }
    }

    pub fn with_query_window(mut self, tokens: usize) -> Self {
        self.query_window = tokens.max(1);
        self
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn navigate(&self, current_index: usize, raw_text: &str) -> NavigationResult {
        let started = Instant::now();
        let query = last_tokens(&normalize(raw_text), self.query_window);
        if query.is_empty() || current_index >= self.corpus.transcript_count() {
            return NavigationResult::stay(query, started);
        }

        let candidates = CandidateWindower::window(&self.corpus, current_index);
        let mut result = NavigationResult::stay(query, started);
        result.candidate_ids = candidates.ids();
        if candidates.is_empty() {
            result.elapsed_ms = elapsed_ms(started);
            return result;
        }

        let ranked = self.combiner.combine(&result.query, &candidates);
        result.suggestions = ranked
            .iter()
            .take(SUGGESTION_COUNT)
            .map(|r| Suggestion {
                score: r.score,
                segment_id: r.segment_id.clone(),
            })
            .collect();

        let best = ranked
            .first()
            .and_then(|r| self.corpus.segment_by_id(&r.segment_id));
        if let Some(segment) = best {
            let decision = DecisionEngine::decide(&self.corpus, current_index, segment);
            result.decision = decision.decision;
            result.matched_segment_id = Some(segment.id.clone());
            result.target_transcript_id = decision.target_transcript_id;
        }

        result.elapsed_ms = elapsed_ms(started);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::domain::corpus::test_support::{segment, transcript};
    use crate::matching::domain::score_combiner::test_support::{FailingScorer, OverlapScorer};
    use crate::matching::domain::score_combiner::CombinerWeights;
    use crate::navigation::domain::decision_engine::Decision;

    fn corpus(t0_early_forward: bool) -> Arc<Corpus> {
        Arc::new(
            Corpus::new(
                vec![
                    segment("s0", 0, "Good morning, and welcome to our session today.", &["t0"]),
                    segment("s1", 1, "We will cover three topics in detail.", &["t0"]),
                    segment("s2", 2, "First, let us review last quarter results.", &["t0"]),
                    segment("s3", 3, "Revenue went up in every single region.", &["t1"]),
                    segment("s4", 4, "Customers loved the new mobile app release.", &["t2"]),
                ],
                vec![
                    transcript("t0", 0, t0_early_forward),
                    transcript("t1", 1, false),
                    transcript("t2", 2, false),
                ],
            )
            .unwrap(),
        )
    }

    fn navigator(corpus: Arc<Corpus>) -> Navigator {
        let combiner = ScoreCombiner::new(
            Arc::new(OverlapScorer),
            Arc::new(OverlapScorer),
            CombinerWeights::default(),
        );
        Navigator::new(corpus, combiner)
    }

    #[test]
    fn test_match_in_next_transcript_moves_forward() {
        let result = navigator(corpus(false)).navigate(0, "Revenue went up in every single region!");
        assert_eq!(result.decision, Decision::Forward);
        assert_eq!(result.matched_segment_id.as_deref(), Some("s3"));
        assert_eq!(result.target_transcript_id.as_deref(), Some("t1"));
        assert_eq!(result.candidate_ids, vec!["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn test_match_in_previous_transcript_stays() {
        let result =
            navigator(corpus(false)).navigate(1, "first let us review last quarter results");
        assert_eq!(result.decision, Decision::Stay);
        assert_eq!(result.matched_segment_id.as_deref(), Some("s2"));
        assert_eq!(result.target_transcript_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_early_forward_on_closing_segment() {
        let result =
            navigator(corpus(true)).navigate(0, "first let us review last quarter results");
        assert_eq!(result.decision, Decision::Forward);
        assert_eq!(result.matched_segment_id.as_deref(), Some("s2"));
        assert_eq!(result.target_transcript_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_query_keeps_last_seven_tokens() {
        let result = navigator(corpus(false))
            .navigate(0, "so as I said revenue went up in every single region");
        assert_eq!(result.query, "revenue went up in every single region");
        assert_eq!(result.matched_segment_id.as_deref(), Some("s3"));
    }

    #[test]
    fn test_suggestions_are_top_three_best_first() {
        let result = navigator(corpus(false)).navigate(0, "revenue went up in every single region");
        assert_eq!(result.suggestions.len(), 3);
        assert_eq!(result.suggestions[0].segment_id, "s3");
        assert!(result
            .suggestions
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_query_stays_without_candidates() {
        let result = navigator(corpus(false)).navigate(0, "?! ...");
        assert_eq!(result.decision, Decision::Stay);
        assert!(result.query.is_empty());
        assert!(result.candidate_ids.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_out_of_range_index_stays() {
        let result = navigator(corpus(false)).navigate(3, "revenue went up");
        assert_eq!(result.decision, Decision::Stay);
        assert!(result.candidate_ids.is_empty());
        assert!(result.target_transcript_id.is_none());
    }

    #[test]
    fn test_last_transcript_without_neighbours() {
        let corpus = Arc::new(
            Corpus::new(
                vec![
                    segment("s0", 0, "shared opening line", &["t0", "t1"]),
                    segment("s1", 1, "closing words", &["t1"]),
                ],
                vec![transcript("t0", 0, false), transcript("t1", 1, false)],
            )
            .unwrap(),
        );
        let result = navigator(corpus).navigate(1, "closing words");
        assert_eq!(result.decision, Decision::Stay);
        assert_eq!(result.candidate_ids, vec!["s0", "s1"]);
        assert_eq!(result.matched_segment_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_failing_scorers_still_produce_a_result() {
        let combiner = ScoreCombiner::new(
            Arc::new(FailingScorer),
            Arc::new(FailingScorer),
            CombinerWeights::default(),
        );
        let result = Navigator::new(corpus(false), combiner).navigate(1, "anything at all");
        assert_eq!(result.decision, Decision::Stay);
        assert!(result.suggestions.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let nav = navigator(corpus(false));
        let a = nav.navigate(0, "we will cover the results in detail");
        let b = nav.navigate(0, "we will cover the results in detail");
        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.decision, b.decision);
    }
}
