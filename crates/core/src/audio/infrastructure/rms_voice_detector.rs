use crate::audio::domain::voice_activity_detector::VoiceActivityDetector;

pub const DEFAULT_THRESHOLD_DB: f32 = -42.0;

/// Energy-based speech detector.
///
/// A sub-frame is speech when its RMS level, in dB relative to full scale,
/// reaches the threshold.
#[derive(Clone, Debug)]
pub struct RmsVoiceDetector {
    threshold_db: f32,
}

impl RmsVoiceDetector {
    pub fn new(threshold_db: f32) -> Self {
        Self { threshold_db }
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }
}

impl Default for RmsVoiceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_DB)
    }
}

impl VoiceActivityDetector for RmsVoiceDetector {
    fn is_speech(&mut self, sub_frame: &[i16], _sample_rate: u32) -> bool {
        rms_db(sub_frame) >= self.threshold_db
    }
}

/// RMS level in dBFS; silence and empty input give negative infinity.
pub fn rms_db(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let x = s as f64 / i16::MAX as f64;
            x * x
        })
        .sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms <= 0.0 {
        f32::NEG_INFINITY
    } else {
        (20.0 * rms.log10()) as f32
    }
}
