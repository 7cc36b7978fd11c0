use std::path::PathBuf;

use thiserror::Error;

/// Reasons a corpus is refused at load time. All of them are fatal.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid corpus JSON in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("corpus has no transcripts")]
    NoTranscripts,
    #[error("duplicate transcript id '{0}'")]
    DuplicateTranscriptId(String),
    #[error("duplicate segment id '{0}'")]
    DuplicateSegmentId(String),
    #[error("transcript sequence indices must be dense from 0: expected {expected}, found {found}")]
    TranscriptIndexGap { expected: usize, found: usize },
    #[error("segment sequence indices must be dense from 0: expected {expected}, found {found}")]
    SegmentIndexGap { expected: usize, found: usize },
    #[error("segment '{0}' has no owning transcript")]
    Ownerless(String),
    #[error("segment '{segment}' references unknown transcript '{transcript}'")]
    UnknownOwner { segment: String, transcript: String },
    #[error("segment '{segment}' is owned by an earlier transcript than the segment before it")]
    NonMonotonic { segment: String },
}
