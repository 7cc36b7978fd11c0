/// Classifies short PCM slices as speech or silence.
pub trait VoiceActivityDetector: Send {
    fn is_speech(&mut self, sub_frame: &[i16], sample_rate: u32) -> bool;
}
