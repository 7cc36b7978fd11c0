use serde::{Deserialize, Serialize};

use crate::shared::text_normalizer::normalize;

/// A fixed span of transcript text with a corpus-wide position.
///
/// A segment may straddle a transcript boundary, in which case it lists
/// every transcript it derives from. The last entry is its current owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub sequence_index: usize,
    pub text: String,
    pub owning_transcripts: Vec<String>,
    #[serde(skip)]
    normalized_text: String,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        sequence_index: usize,
        text: impl Into<String>,
        owning_transcripts: Vec<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            sequence_index,
            normalized_text: normalize(&text),
            text,
            owning_transcripts,
        }
    }

    /// The transcript this segment currently belongs to.
    pub fn owner(&self) -> Option<&str> {
        self.owning_transcripts.last().map(String::as_str)
    }

    /// True when the segment derives from `transcript_id` and nothing else.
    pub fn is_exclusive_to(&self, transcript_id: &str) -> bool {
        matches!(self.owning_transcripts.as_slice(), [only] if only == transcript_id)
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    /// Recomputes the normalized text, e.g. after deserialization.
    pub(crate) fn refresh_normalized_text(&mut self) {
        self.normalized_text = normalize(&self.text);
    }
}
