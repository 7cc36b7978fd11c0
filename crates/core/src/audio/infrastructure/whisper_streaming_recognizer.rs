use std::collections::VecDeque;
use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::streaming_recognizer::StreamingRecognizer;

/// Whisper rejects inputs shorter than this.
const MIN_DECODE_SECS: f64 = 1.0;

/// Streaming recognizer over whisper.cpp via whisper-rs.
///
/// Whisper has no native partial results, so the last `window_secs` of
/// audio are re-decoded whenever new audio has arrived. The hypothesis
/// therefore always covers the most recent speech.
pub struct WhisperStreamingRecognizer {
    ctx: WhisperContext,
    sample_rate: u32,
    window: VecDeque<f32>,
    window_len: usize,
    dirty: bool,
    partial: String,
}

impl WhisperStreamingRecognizer {
    pub fn new(
        model_path: &Path,
        sample_rate: u32,
        window_secs: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;
        log::info!("Loaded Whisper model {}", model_path.display());

        let window_len = (window_secs.max(MIN_DECODE_SECS) * sample_rate as f64) as usize;
        Ok(Self {
            ctx,
            sample_rate,
            window: VecDeque::with_capacity(window_len),
            window_len,
            dirty: false,
            partial: String::new(),
        })
    }

    fn decode(&self, samples: &[f32]) -> Result<String, Box<dyn std::error::Error>> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some("en"));
        params.set_translate(false);
        params.set_no_context(true);
        params.set_single_segment(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, samples)
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut words = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            for tok_idx in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(tok_idx) else {
                    continue;
                };
                let Ok(text) = token.to_str() else {
                    continue;
                };
                // Special tokens look like [_BEG_] or <|endoftext|>
                let trimmed = text.trim();
                if trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }
                words.push(text.to_string());
            }
        }

        Ok(join_tokens(&words))
    }
}

impl StreamingRecognizer for WhisperStreamingRecognizer {
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), Box<dyn std::error::Error>> {
        push_window(&mut self.window, self.window_len, samples);
        self.dirty = true;
        Ok(())
    }

    fn partial_result(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        let min_len = (MIN_DECODE_SECS * self.sample_rate as f64) as usize;
        if self.dirty && self.window.len() >= min_len {
            let samples: Vec<f32> = self.window.iter().copied().collect();
            self.partial = self.decode(&samples)?;
            self.dirty = false;
        }
        Ok(self.partial.clone())
    }

    fn reset(&mut self) {
        self.window.clear();
        self.partial.clear();
        self.dirty = false;
    }
}

/// Appends PCM to the rolling window, evicting the oldest samples.
fn push_window(window: &mut VecDeque<f32>, capacity: usize, samples: &[i16]) {
    window.extend(samples.iter().map(|&s| s as f32 / 32768.0));
    let excess = window.len().saturating_sub(capacity);
    window.drain(..excess);
}

/// Whisper tokens carry their own leading spaces.
fn join_tokens(tokens: &[String]) -> String {
    tokens.concat().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
