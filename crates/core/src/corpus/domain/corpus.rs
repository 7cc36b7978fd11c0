use std::collections::HashMap;

use super::corpus_error::CorpusError;
use super::segment::Segment;
use super::transcript::Transcript;

/// Read-only lookup structure over segments and transcripts.
///
/// Built once and validated on construction; afterwards it is shared
/// between threads without locking.
#[derive(Debug)]
pub struct Corpus {
    /// Position in the vector equals `sequence_index`.
    segments: Vec<Segment>,
    /// Position in the vector equals `sequence_index`.
    transcripts: Vec<Transcript>,
    segment_index_by_id: HashMap<String, usize>,
    transcript_index_by_id: HashMap<String, usize>,
    /// Segment indices per transcript, for every transcript a segment lists.
    segments_by_transcript: HashMap<String, Vec<usize>>,
}

impl Corpus {
    pub fn new(
        mut segments: Vec<Segment>,
        mut transcripts: Vec<Transcript>,
    ) -> Result<Self, CorpusError> {
        if transcripts.is_empty() {
            return Err(CorpusError::NoTranscripts);
        }

        transcripts.sort_by_key(|t| t.sequence_index);
        let mut transcript_index_by_id = HashMap::with_capacity(transcripts.len());
        for (expected, t) in transcripts.iter().enumerate() {
            if t.sequence_index != expected {
                return Err(CorpusError::TranscriptIndexGap {
                    expected,
                    found: t.sequence_index,
                });
            }
            if transcript_index_by_id.insert(t.id.clone(), expected).is_some() {
                return Err(CorpusError::DuplicateTranscriptId(t.id.clone()));
            }
        }

        segments.sort_by_key(|s| s.sequence_index);
        let mut segment_index_by_id = HashMap::with_capacity(segments.len());
        let mut segments_by_transcript: HashMap<String, Vec<usize>> = HashMap::new();
        let mut last_owner_index = 0;
        for (expected, segment) in segments.iter_mut().enumerate() {
            if segment.sequence_index != expected {
                return Err(CorpusError::SegmentIndexGap {
                    expected,
                    found: segment.sequence_index,
                });
            }
            if segment_index_by_id
                .insert(segment.id.clone(), expected)
                .is_some()
            {
                return Err(CorpusError::DuplicateSegmentId(segment.id.clone()));
            }

            let owner = segment
                .owner()
                .ok_or_else(|| CorpusError::Ownerless(segment.id.clone()))?;
            let owner_index = *transcript_index_by_id.get(owner).ok_or_else(|| {
                CorpusError::UnknownOwner {
                    segment: segment.id.clone(),
                    transcript: owner.to_string(),
                }
            })?;
            if owner_index < last_owner_index {
                return Err(CorpusError::NonMonotonic {
                    segment: segment.id.clone(),
                });
            }
            last_owner_index = owner_index;

            for source in &segment.owning_transcripts {
                if !transcript_index_by_id.contains_key(source) {
                    return Err(CorpusError::UnknownOwner {
                        segment: segment.id.clone(),
                        transcript: source.clone(),
                    });
                }
                segments_by_transcript
                    .entry(source.clone())
                    .or_default()
                    .push(expected);
            }

            segment.refresh_normalized_text();
        }

        log::debug!(
            "Corpus built: {} transcripts, {} segments",
            transcripts.len(),
            segments.len()
        );

        Ok(Self {
            segments,
            transcripts,
            segment_index_by_id,
            transcript_index_by_id,
            segments_by_transcript,
        })
    }

    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn transcript_at(&self, index: usize) -> Option<&Transcript> {
        self.transcripts.get(index)
    }

    pub fn transcript_by_id(&self, id: &str) -> Option<&Transcript> {
        self.transcript_index_of(id)
            .and_then(|i| self.transcripts.get(i))
    }

    pub fn transcript_index_of(&self, id: &str) -> Option<usize> {
        self.transcript_index_by_id.get(id).copied()
    }

    pub fn segment_by_id(&self, id: &str) -> Option<&Segment> {
        self.segment_index_by_id
            .get(id)
            .and_then(|&i| self.segments.get(i))
    }

    pub fn segment_at(&self, sequence_index: usize) -> Option<&Segment> {
        self.segments.get(sequence_index)
    }

    /// Segments listing `transcript_id` anywhere in their owners, in corpus order.
    pub fn segments_owned_by<'a>(
        &'a self,
        transcript_id: &str,
    ) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments_by_transcript
            .get(transcript_id)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.segments[i])
    }
}
