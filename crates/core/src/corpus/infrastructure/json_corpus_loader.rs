use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::corpus::domain::corpus::Corpus;
use crate::corpus::domain::corpus_error::CorpusError;
use crate::corpus::domain::segment::Segment;
use crate::corpus::domain::transcript::Transcript;

#[derive(Deserialize)]
struct CorpusFile {
    segments: Vec<Segment>,
    transcripts: Vec<Transcript>,
}

/// Loads a corpus from JSON.
///
/// Two layouts are accepted: one document holding both `segments` and
/// `transcripts` arrays, or two documents each holding a bare array.
pub struct JsonCorpusLoader;

impl JsonCorpusLoader {
    pub fn load_from_file(path: &Path) -> Result<Corpus, CorpusError> {
        let json = read(path)?;
        Self::parse(&json, &path.display().to_string())
    }

    pub fn load_from_parts(
        segments_path: &Path,
        transcripts_path: &Path,
    ) -> Result<Corpus, CorpusError> {
        let segments: Vec<Segment> =
            parse_json(&read(segments_path)?, &segments_path.display().to_string())?;
        let transcripts: Vec<Transcript> = parse_json(
            &read(transcripts_path)?,
            &transcripts_path.display().to_string(),
        )?;
        let corpus = Corpus::new(segments, transcripts)?;
        log_loaded(&corpus);
        Ok(corpus)
    }

    pub fn from_json_str(json: &str) -> Result<Corpus, CorpusError> {
        Self::parse(json, "<inline>")
    }

    fn parse(json: &str, origin: &str) -> Result<Corpus, CorpusError> {
        let file: CorpusFile = parse_json(json, origin)?;
        let corpus = Corpus::new(file.segments, file.transcripts)?;
        log_loaded(&corpus);
        Ok(corpus)
    }
}

fn read(path: &Path) -> Result<String, CorpusError> {
    fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: for<'de> Deserialize<'de>>(json: &str, origin: &str) -> Result<T, CorpusError> {
    serde_json::from_str(json).map_err(|source| CorpusError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn log_loaded(corpus: &Corpus) {
    log::info!(
        "Loaded corpus: {} transcripts, {} segments",
        corpus.transcript_count(),
        corpus.segment_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CORPUS_JSON: &str = r#"{
        "segments": [
            {"id": "s0", "sequence_index": 0, "text": "Good morning, everyone.", "owning_transcripts": ["t0"]},
            {"id": "s1", "sequence_index": 1, "text": "Let's begin.", "owning_transcripts": ["t0", "t1"]}
        ],
        "transcripts": [
            {"id": "t0", "sequence_index": 0, "text": "Good morning", "early_forward": true},
            {"id": "t1", "sequence_index": 1, "text": "Let's begin"}
        ]
    }"#;

    #[test]
    fn test_from_json_str() {
        let corpus = JsonCorpusLoader::from_json_str(CORPUS_JSON).unwrap();
        assert_eq!(corpus.transcript_count(), 2);
        assert_eq!(corpus.segment_count(), 2);
        assert!(corpus.transcript_at(0).unwrap().early_forward);
        assert!(!corpus.transcript_at(1).unwrap().early_forward);
        assert_eq!(corpus.segment_at(1).unwrap().normalized_text(), "lets begin");
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("corpus.json");
        fs::write(&path, CORPUS_JSON).unwrap();

        let corpus = JsonCorpusLoader::load_from_file(&path).unwrap();
        assert_eq!(corpus.segment_by_id("s1").unwrap().owner(), Some("t1"));
    }

    #[test]
    fn test_load_from_parts() {
        let tmp = TempDir::new().unwrap();
        let segments = tmp.path().join("segments.json");
        let transcripts = tmp.path().join("transcripts.json");
        fs::write(
            &segments,
            r#"[{"id": "s0", "sequence_index": 0, "text": "hi", "owning_transcripts": ["t0"]}]"#,
        )
        .unwrap();
        fs::write(
            &transcripts,
            r#"[{"id": "t0", "sequence_index": 0, "text": "hi", "early_forward": false}]"#,
        )
        .unwrap();

        let corpus = JsonCorpusLoader::load_from_parts(&segments, &transcripts).unwrap();
        assert_eq!(corpus.segment_count(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonCorpusLoader::load_from_file(Path::new("/nonexistent/corpus.json"))
            .unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = JsonCorpusLoader::from_json_str("{\"segments\": [").unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = JsonCorpusLoader::from_json_str(r#"{"segments": []}"#).unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
    }

    #[test]
    fn test_invalid_structure_is_rejected() {
        let json = r#"{
            "segments": [{"id": "s0", "sequence_index": 0, "text": "x", "owning_transcripts": ["t9"]}],
            "transcripts": [{"id": "t0", "sequence_index": 0, "text": "x"}]
        }"#;
        let err = JsonCorpusLoader::from_json_str(json).unwrap_err();
        assert!(matches!(err, CorpusError::UnknownOwner { .. }));
    }
}
