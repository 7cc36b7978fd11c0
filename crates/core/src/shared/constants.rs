use super::model_resolver::ModelFile;

pub const SAMPLE_RATE: u32 = 16000;
/// Capture frame length handed to the VAD gate and the recognizer.
pub const FRAME_DURATION_MS: u32 = 200;
/// VAD classification window inside a frame.
pub const SUBFRAME_DURATION_MS: u32 = 20;
/// WebRTC VAD aggressiveness, 0 (permissive) to 3 (strict).
pub const DEFAULT_VAD_MODE: u8 = 2;

/// Trailing tokens of an utterance used as the match query.
pub const QUERY_WINDOW_TOKENS: usize = 7;
/// Utterances shorter than this are not worth navigating on.
pub const MIN_UTTERANCE_TOKENS: usize = 7;
pub const SUGGESTION_COUNT: usize = 3;

pub const DEFAULT_PHONETIC_WEIGHT: f64 = 0.6;
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.4;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

pub const DEQUEUE_TIMEOUT_MS: u64 = 1000;
pub const AUDIO_QUEUE_CAPACITY: usize = 64;
pub const TEXT_QUEUE_CAPACITY: usize = 32;

/// Cursor position when a session starts.
pub const DEFAULT_START_INDEX: usize = 1;

/// Phonetic codes kept in memory per scorer.
pub const PHONETIC_CACHE_CAPACITY: usize = 350;

pub const WHISPER_MODEL: ModelFile = ModelFile {
    file_name: "ggml-base.en.bin",
    url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin",
};
/// Seconds of recent audio re-decoded for each partial hypothesis.
pub const WHISPER_WINDOW_SECS: f64 = 6.0;

pub const SENTENCE_MODEL: ModelFile = ModelFile {
    file_name: "paraphrase-MiniLM-L6-v2.onnx",
    url: "https://huggingface.co/sentence-transformers/paraphrase-MiniLM-L6-v2/resolve/main/onnx/model.onnx",
};
pub const SENTENCE_TOKENIZER: ModelFile = ModelFile {
    file_name: "paraphrase-MiniLM-L6-v2.tokenizer.json",
    url: "https://huggingface.co/sentence-transformers/paraphrase-MiniLM-L6-v2/resolve/main/tokenizer.json",
};
