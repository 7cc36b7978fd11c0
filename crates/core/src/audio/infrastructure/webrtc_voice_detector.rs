use thiserror::Error;
use webrtc_vad::{SampleRate, Vad, VadMode};

use crate::audio::domain::voice_activity_detector::VoiceActivityDetector;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VadConfigError {
    #[error("WebRTC VAD supports 8000, 16000, 32000 or 48000 Hz, got {0}")]
    UnsupportedRate(u32),
    #[error("WebRTC VAD mode must be 0-3, got {0}")]
    InvalidMode(u8),
    #[error("WebRTC VAD needs 10, 20 or 30 ms sub-frames, got {0} ms")]
    UnsupportedFrameDuration(u32),
}

/// GMM-based speech detector from WebRTC.
///
/// Mode 0 is the most permissive, 3 the most aggressive at rejecting
/// non-speech. Sub-frames must be 10, 20 or 30 ms long.
pub struct WebRtcVoiceDetector {
    vad: SendVad,
    sample_rate: u32,
}

// SAFETY: the fvad handle has no thread affinity; it is only ever used from one
// thread at a time through `&mut self`.
struct SendVad(Vad);
unsafe impl Send for SendVad {}

impl WebRtcVoiceDetector {
    pub fn new(sample_rate: u32, mode: u8) -> Result<Self, VadConfigError> {
        let rate = to_sample_rate(sample_rate)?;
        let mode = to_mode(mode)?;
        let mut vad = Vad::new();
        vad.set_sample_rate(rate);
        vad.set_mode(mode);
        Ok(Self {
            vad: SendVad(vad),
            sample_rate,
        })
    }

    /// Checks a configuration without building a detector.
    pub fn validate(
        sample_rate: u32,
        mode: u8,
        sub_frame_ms: u32,
    ) -> Result<(), VadConfigError> {
        to_sample_rate(sample_rate)?;
        to_mode(mode)?;
        if !matches!(sub_frame_ms, 10 | 20 | 30) {
            return Err(VadConfigError::UnsupportedFrameDuration(sub_frame_ms));
        }
        Ok(())
    }
}

impl VoiceActivityDetector for WebRtcVoiceDetector {
    fn is_speech(&mut self, sub_frame: &[i16], sample_rate: u32) -> bool {
        if sample_rate != self.sample_rate {
            match to_sample_rate(sample_rate) {
                Ok(rate) => {
                    self.vad.0.set_sample_rate(rate);
                    self.sample_rate = sample_rate;
                }
                Err(e) => {
                    log::debug!("{e}");
                    return false;
                }
            }
        }
        match self.vad.0.is_voice_segment(sub_frame) {
            Ok(speech) => speech,
            Err(_) => {
                log::debug!(
                    "VAD rejected a {}-sample sub-frame at {sample_rate} Hz",
                    sub_frame.len()
                );
                false
            }
        }
    }
}

fn to_sample_rate(rate: u32) -> Result<SampleRate, VadConfigError> {
    match rate {
        8000 => Ok(SampleRate::Rate8kHz),
        16000 => Ok(SampleRate::Rate16kHz),
        32000 => Ok(SampleRate::Rate32kHz),
        48000 => Ok(SampleRate::Rate48kHz),
        other => Err(VadConfigError::UnsupportedRate(other)),
    }
}

fn to_mode(mode: u8) -> Result<VadMode, VadConfigError> {
    match mode {
        0 => Ok(VadMode::Quality),
        1 => Ok(VadMode::LowBitrate),
        2 => Ok(VadMode::Aggressive),
        3 => Ok(VadMode::VeryAggressive),
        other => Err(VadConfigError::InvalidMode(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silence_is_not_speech() {
        let mut vad = WebRtcVoiceDetector::new(16_000, 2).unwrap();
        assert!(!vad.is_speech(&[0; 320], 16_000));
    }

    #[test]
    fn test_wrong_sub_frame_length_is_not_speech() {
        let mut vad = WebRtcVoiceDetector::new(16_000, 2).unwrap();
        assert!(!vad.is_speech(&[1000; 100], 16_000));
    }

    #[test]
    fn test_unsupported_call_rate_is_not_speech() {
        let mut vad = WebRtcVoiceDetector::new(16_000, 2).unwrap();
        assert!(!vad.is_speech(&[0; 441], 44_100));
    }

    #[rstest]
    #[case::rate(44_100, 2, 20, VadConfigError::UnsupportedRate(44_100))]
    #[case::mode(16_000, 4, 20, VadConfigError::InvalidMode(4))]
    #[case::frame(16_000, 2, 25, VadConfigError::UnsupportedFrameDuration(25))]
    fn test_invalid_configuration(
        #[case] rate: u32,
        #[case] mode: u8,
        #[case] sub_frame_ms: u32,
        #[case] expected: VadConfigError,
    ) {
        assert_eq!(
            WebRtcVoiceDetector::validate(rate, mode, sub_frame_ms),
            Err(expected)
        );
    }

    #[test]
    fn test_default_configuration_is_valid() {
        assert_eq!(WebRtcVoiceDetector::validate(16_000, 2, 20), Ok(()));
        assert!(WebRtcVoiceDetector::new(44_100, 2).is_err());
    }
}
