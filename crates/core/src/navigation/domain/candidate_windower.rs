use crate::corpus::domain::corpus::Corpus;
use crate::matching::domain::candidate_set::CandidateSet;

/// Bounds the search space to the transcripts around the cursor.
///
/// - previous transcript: its closing segment only (highest index whose
///   current owner is the previous transcript)
/// - current transcript: every segment listing it, in corpus order
/// - next transcript: segments owned by it alone
///
/// Candidate text is the segment's normalized text.
pub struct CandidateWindower;

impl CandidateWindower {
    pub fn window(corpus: &Corpus, current_index: usize) -> CandidateSet {
        let mut candidates = CandidateSet::new();
        let Some(current) = corpus.transcript_at(current_index) else {
            return candidates;
        };

        let previous = current_index
            .checked_sub(1)
            .and_then(|i| corpus.transcript_at(i));
        if let Some(previous) = previous {
            let closing = corpus
                .segments_owned_by(&previous.id)
                .filter(|s| s.owner() == Some(previous.id.as_str()))
                .max_by_key(|s| s.sequence_index);
            if let Some(segment) = closing {
                candidates.insert(segment.id.as_str(), segment.normalized_text());
            }
        }

        for segment in corpus.segments_owned_by(&current.id) {
            candidates.insert(segment.id.as_str(), segment.normalized_text());
        }

        if let Some(next) = corpus.transcript_at(current_index + 1) {
            for segment in corpus
                .segments_owned_by(&next.id)
                .filter(|s| s.is_exclusive_to(&next.id))
            {
                candidates.insert(segment.id.as_str(), segment.normalized_text());
            }
        }

        candidates
    }
}
