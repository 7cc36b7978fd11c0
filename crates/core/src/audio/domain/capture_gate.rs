use crossbeam_channel::{Sender, TrySendError};

use super::audio_frame::AudioFrame;
use super::voice_activity_detector::VoiceActivityDetector;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    Queued,
    Silent,
    /// Speech, but the audio queue was full.
    Dropped,
    /// The receiving side has shut down.
    Closed,
}

/// Coarse speech gate in front of the audio queue.
///
/// A frame is queued whole when any of its sub-frames is speech. Runs in
/// the audio callback, so it never blocks: a full queue drops the frame.
pub struct CaptureGate {
    vad: Box<dyn VoiceActivityDetector>,
    sub_frame_len: usize,
    tx: Sender<AudioFrame>,
}

impl CaptureGate {
    pub fn new(
        vad: Box<dyn VoiceActivityDetector>,
        sub_frame_len: usize,
        tx: Sender<AudioFrame>,
    ) -> Self {
        Self {
            vad,
            sub_frame_len: sub_frame_len.max(1),
            tx,
        }
    }

    pub fn offer(&mut self, frame: AudioFrame) -> GateOutcome {
        let rate = frame.sample_rate;
        let vad = &mut self.vad;
        let speech = frame
            .sub_frames(self.sub_frame_len)
            .any(|sub| vad.is_speech(sub, rate));
        if !speech {
            return GateOutcome::Silent;
        }

        match self.tx.try_send(frame) {
            Ok(()) => GateOutcome::Queued,
            Err(TrySendError::Full(_)) => {
                log::debug!("Audio queue full, dropping frame");
                GateOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => GateOutcome::Closed,
        }
    }
}
