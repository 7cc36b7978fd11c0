use std::time::Instant;

use crate::navigation::domain::navigation_result::NavigationResult;
use crate::pipeline::advance_signal::AdvanceSignal;
use crate::pipeline::navigation_logger::NavigationLogger;
use crate::pipeline::navigator::Navigator;
use crate::shared::constants::MIN_UTTERANCE_TOKENS;
use crate::shared::text_normalizer::{normalize, token_count};
use crate::shared::transcript_cursor::TranscriptCursor;

/// The navigate stage: one recognized utterance in, maybe one advance out.
///
/// Shared by the live pipeline and by offline replay.
pub struct NavigateUnit {
    navigator: Navigator,
    cursor: TranscriptCursor,
    signal: Box<dyn AdvanceSignal>,
    logger: Box<dyn NavigationLogger>,
    min_utterance_tokens: usize,
}

impl NavigateUnit {
    pub fn new(
        navigator: Navigator,
        cursor: TranscriptCursor,
        signal: Box<dyn AdvanceSignal>,
        logger: Box<dyn NavigationLogger>,
    ) -> Self {
        Self {
            navigator,
            cursor,
            signal,
            logger,
            min_utterance_tokens: MIN_UTTERANCE_TOKENS,
        }
    }

    pub fn with_min_utterance_tokens(mut self, tokens: usize) -> Self {
        self.min_utterance_tokens = tokens;
        self
    }

    pub fn cursor(&self) -> &TranscriptCursor {
        &self.cursor
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Processes one utterance; `None` when it was too short to try.
    pub fn handle(&mut self, text: &str) -> Option<NavigationResult> {
        let tokens = token_count(&normalize(text));
        if tokens < self.min_utterance_tokens {
            log::debug!(
                "Skipping utterance with {tokens} tokens (< {}): \"{text}\"",
                self.min_utterance_tokens
            );
            return None;
        }

        let started = Instant::now();
        let current = self.cursor.get();
        let result = self.navigator.navigate(current, text);
        let corpus = self.navigator.corpus();
        let matched_text = result
            .matched_segment_id
            .as_deref()
            .and_then(|id| corpus.segment_by_id(id))
            .map(|s| s.text.as_str());
        self.logger.navigation(current, &result, matched_text);

        if result.is_forward() {
            let target = result
                .target_transcript_id
                .as_deref()
                .and_then(|id| corpus.transcript_index_of(id));
            match target.map(|t| (t, self.cursor.advance_to(t))) {
                Some((to, Some(from))) => {
                    self.logger.advance(from, to);
                    if let Err(e) = self.signal.advance(from, to) {
                        log::warn!("Advance signal failed: {e}");
                    }
                }
                Some((to, None)) => {
                    log::debug!("Cursor already at or past {to}, not advancing");
                }
                None => log::warn!("Forward decision without a known target transcript"),
            }
        }

        self.logger
            .timing("navigate", started.elapsed().as_secs_f64() * 1000.0);
        Some(result)
    }

    pub fn info(&mut self, message: &str) {
        self.logger.info(message);
    }

    pub fn summary(&self) {
        self.logger.summary();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::corpus::domain::corpus::test_support::three_transcript_corpus;
    use crate::matching::domain::score_combiner::test_support::OverlapScorer;
    use crate::matching::domain::score_combiner::{CombinerWeights, ScoreCombiner};
    use crate::matching::domain::similarity_scorer::{ScoringError, SimilarityScorer};
    use crate::navigation::domain::decision_engine::Decision;
    use crate::pipeline::advance_signal::test_support::RecordingSignal;
    use crate::pipeline::navigation_logger::NullNavigationLogger;

    /// Moves the shared cursor while scoring, as a manual seek racing the
    /// navigate stage would, then scores like `OverlapScorer`.
    struct SeekDuringScoring {
        cursor: TranscriptCursor,
        seek_to: usize,
    }

    impl SimilarityScorer for SeekDuringScoring {
        fn name(&self) -> &'static str {
            "seek-during-scoring"
        }

        fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f64>, ScoringError> {
            self.cursor.set(self.seek_to);
            OverlapScorer.score(query, candidates)
        }
    }

    fn unit_with(
        cursor: TranscriptCursor,
        phonetic: Arc<dyn SimilarityScorer>,
    ) -> (NavigateUnit, RecordingSignal) {
        let combiner =
            ScoreCombiner::new(phonetic, Arc::new(OverlapScorer), CombinerWeights::default());
        let navigator = Navigator::new(Arc::new(three_transcript_corpus(false)), combiner);
        let signal = RecordingSignal::default();
        let unit = NavigateUnit::new(
            navigator,
            cursor,
            Box::new(signal.clone()),
            Box::new(NullNavigationLogger),
        );
        (unit, signal)
    }

    fn unit(start: usize) -> (NavigateUnit, RecordingSignal) {
        unit_with(TranscriptCursor::new(start), Arc::new(OverlapScorer))
    }

    #[test]
    fn test_short_utterance_is_discarded_before_navigation() {
        let (mut unit, signal) = unit(0);
        // five tokens that would otherwise match s4 in t1
        assert!(unit.handle("revenue grew by twenty percent").is_none());
        assert_eq!(unit.cursor().get(), 0);
        assert!(signal.recorded().is_empty());
    }

    #[test]
    fn test_forward_match_advances_cursor_and_signals() {
        let (mut unit, signal) = unit(0);
        let result = unit
            .handle("so yes revenue grew by twenty percent overall")
            .unwrap();
        assert_eq!(result.decision, Decision::Forward);
        assert_eq!(result.matched_segment_id.as_deref(), Some("s4"));
        assert_eq!(result.target_transcript_id.as_deref(), Some("t1"));
        assert_eq!(unit.cursor().get(), 1);
        assert_eq!(signal.recorded(), vec![(0, 1)]);
    }

    #[test]
    fn test_forward_to_target_already_passed_neither_moves_nor_signals() {
        let cursor = TranscriptCursor::new(0);
        let scorer = SeekDuringScoring {
            cursor: cursor.clone(),
            seek_to: 2,
        };
        let (mut unit, signal) = unit_with(cursor, Arc::new(scorer));

        let result = unit
            .handle("so yes revenue grew by twenty percent overall")
            .unwrap();
        // Decided against the cursor read before scoring.
        assert_eq!(result.decision, Decision::Forward);
        assert_eq!(result.target_transcript_id.as_deref(), Some("t1"));
        assert_eq!(unit.cursor().get(), 2);
        assert!(signal.recorded().is_empty());
    }

    #[test]
    fn test_match_behind_cursor_stays() {
        let (mut unit, signal) = unit(0);
        unit.cursor().set(2);
        let result = unit
            .handle("welcome everyone to the annual review today")
            .unwrap();
        assert_eq!(result.decision, Decision::Stay);
        assert_eq!(unit.cursor().get(), 2);
        assert!(signal.recorded().is_empty());
    }

    #[test]
    fn test_match_within_current_leaves_cursor() {
        let (mut unit, signal) = unit(1);
        let result = unit
            .handle("so mostly thanks to the new product line")
            .unwrap();
        assert_eq!(result.matched_segment_id.as_deref(), Some("s5"));
        assert_eq!(result.decision, Decision::Stay);
        assert_eq!(unit.cursor().get(), 1);
        assert!(signal.recorded().is_empty());
    }
}
