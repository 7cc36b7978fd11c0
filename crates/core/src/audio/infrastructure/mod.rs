pub mod cpal_audio_source;
pub mod frame_assembler;
pub mod rms_voice_detector;
pub mod webrtc_voice_detector;
pub mod whisper_streaming_recognizer;
