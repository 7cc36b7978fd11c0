/// Stateful speech-to-text engine fed incrementally.
///
/// One instance per pipeline. `partial_result` is the current best guess
/// for the ongoing utterance and may be revised by later audio.
pub trait StreamingRecognizer: Send {
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), Box<dyn std::error::Error>>;

    fn partial_result(&mut self) -> Result<String, Box<dyn std::error::Error>>;

    /// Drops buffered audio and the current hypothesis.
    fn reset(&mut self);
}
