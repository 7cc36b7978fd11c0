use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use autoso_core::audio::domain::audio_frame::samples_for;
use autoso_core::audio::domain::voice_activity_detector::VoiceActivityDetector;
use autoso_core::audio::infrastructure::rms_voice_detector::{
    RmsVoiceDetector, DEFAULT_THRESHOLD_DB,
};
use autoso_core::audio::infrastructure::webrtc_voice_detector::WebRtcVoiceDetector;
use autoso_core::matching::domain::score_combiner::CombinerWeights;
use autoso_core::pipeline::streaming_config::StreamingConfig;
use autoso_core::shared::constants::{
    AUDIO_QUEUE_CAPACITY, DEFAULT_START_INDEX, DEFAULT_VAD_MODE, DEQUEUE_TIMEOUT_MS, FRAME_DURATION_MS,
    MIN_UTTERANCE_TOKENS, QUERY_WINDOW_TOKENS, SAMPLE_RATE, SUBFRAME_DURATION_MS,
    TEXT_QUEUE_CAPACITY, WHISPER_WINDOW_SECS,
};

/// Which speech detector gates captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VadKind {
    WebRtc,
    Rms,
}

/// Runtime tuning, loaded from `--config` JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_rate: u32,
    pub frame_duration_ms: u32,
    pub subframe_duration_ms: u32,
    pub vad: VadKind,
    /// WebRTC aggressiveness, 0 to 3.
    pub vad_mode: u8,
    /// Energy threshold used by the RMS detector.
    pub vad_threshold_db: f32,
    pub query_window_tokens: usize,
    pub min_utterance_tokens: usize,
    pub weights: CombinerWeights,
    pub dequeue_timeout_ms: u64,
    pub audio_queue_capacity: usize,
    pub text_queue_capacity: usize,
    pub start_index: usize,
    pub whisper_window_secs: f64,
    /// Directory searched for model files before the user cache.
    pub model_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            frame_duration_ms: FRAME_DURATION_MS,
            subframe_duration_ms: SUBFRAME_DURATION_MS,
            vad: VadKind::WebRtc,
            vad_mode: DEFAULT_VAD_MODE,
            vad_threshold_db: DEFAULT_THRESHOLD_DB,
            query_window_tokens: QUERY_WINDOW_TOKENS,
            min_utterance_tokens: MIN_UTTERANCE_TOKENS,
            weights: CombinerWeights::default(),
            dequeue_timeout_ms: DEQUEUE_TIMEOUT_MS,
            audio_queue_capacity: AUDIO_QUEUE_CAPACITY,
            text_queue_capacity: TEXT_QUEUE_CAPACITY,
            start_index: DEFAULT_START_INDEX,
            whisper_window_secs: WHISPER_WINDOW_SECS,
            model_dir: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config {}: {e}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
        Ok(settings)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.sample_rate != SAMPLE_RATE {
            return Err(format!(
                "Sample rate must be {SAMPLE_RATE} Hz for the recognizer, got {}",
                self.sample_rate
            )
            .into());
        }
        if self.frame_duration_ms == 0 || self.subframe_duration_ms == 0 {
            return Err("Frame and sub-frame durations must be positive".into());
        }
        if self.subframe_duration_ms > self.frame_duration_ms {
            return Err(format!(
                "Sub-frame duration ({}ms) must not exceed frame duration ({}ms)",
                self.subframe_duration_ms, self.frame_duration_ms
            )
            .into());
        }
        if self.frame_len() == 0 || self.sub_frame_len() == 0 {
            return Err("Frame durations are too short for the sample rate".into());
        }
        if self.vad == VadKind::WebRtc {
            WebRtcVoiceDetector::validate(
                self.sample_rate,
                self.vad_mode,
                self.subframe_duration_ms,
            )?;
        }
        if self.query_window_tokens == 0 {
            return Err("Query window must be at least one token".into());
        }
        let w = &self.weights;
        if w.phonetic_weight < 0.0 || w.semantic_weight < 0.0 {
            return Err(format!(
                "Weights must be non-negative, got {} and {}",
                w.phonetic_weight, w.semantic_weight
            )
            .into());
        }
        if !(0.0..=1.0).contains(&w.threshold) {
            return Err(format!("Threshold must be between 0.0 and 1.0, got {}", w.threshold).into());
        }
        if self.dequeue_timeout_ms == 0 {
            return Err("Dequeue timeout must be positive".into());
        }
        if self.audio_queue_capacity == 0 || self.text_queue_capacity == 0 {
            return Err("Queue capacities must be positive".into());
        }
        if self.whisper_window_secs < 1.0 {
            return Err(format!(
                "Whisper window must be at least 1 second, got {}",
                self.whisper_window_secs
            )
            .into());
        }
        Ok(())
    }

    pub fn voice_detector(
        &self,
    ) -> Result<Box<dyn VoiceActivityDetector>, Box<dyn std::error::Error>> {
        let detector: Box<dyn VoiceActivityDetector> = match self.vad {
            VadKind::WebRtc => {
                Box::new(WebRtcVoiceDetector::new(self.sample_rate, self.vad_mode)?)
            }
            VadKind::Rms => Box::new(RmsVoiceDetector::new(self.vad_threshold_db)),
        };
        Ok(detector)
    }

    /// The configured start index, pulled back onto the last transcript
    /// for corpora shorter than it.
    pub fn start_index_for(&self, transcript_count: usize) -> usize {
        let last = transcript_count.saturating_sub(1);
        if self.start_index > last {
            log::warn!(
                "Start index {} is past the last transcript, starting at {last}",
                self.start_index
            );
        }
        self.start_index.min(last)
    }

    pub fn frame_len(&self) -> usize {
        samples_for(self.frame_duration_ms, self.sample_rate)
    }

    pub fn sub_frame_len(&self) -> usize {
        samples_for(self.subframe_duration_ms, self.sample_rate)
    }

    pub fn streaming_config(&self) -> StreamingConfig {
        StreamingConfig {
            audio_queue_capacity: self.audio_queue_capacity,
            text_queue_capacity: self.text_queue_capacity,
            dequeue_timeout: Duration::from_millis(self.dequeue_timeout_ms),
        }
    }
}
