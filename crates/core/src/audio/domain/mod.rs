pub mod audio_frame;
pub mod capture_gate;
pub mod streaming_recognizer;
pub mod voice_activity_detector;
