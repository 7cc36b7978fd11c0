use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::audio::domain::audio_frame::AudioFrame;
use crate::audio::domain::streaming_recognizer::StreamingRecognizer;
use crate::pipeline::navigate_unit::NavigateUnit;
use crate::pipeline::partial_debouncer::PartialDebouncer;
use crate::pipeline::streaming_config::StreamingConfig;
use crate::shared::cancellation::CancellationToken;
use crate::shared::transcript_cursor::TranscriptCursor;

/// Runs recognize and navigate on dedicated threads.
///
/// Layout: `capture gate → audio queue → recognize → text queue → navigate`
///
/// The capture side is whoever holds `audio_sender()`; it must only
/// `try_send`. Both threads poll the cancellation token between dequeues.
pub struct ThreadedStreamingPipeline {
    audio_tx: Sender<AudioFrame>,
    cursor: TranscriptCursor,
    cancel: CancellationToken,
    recognize_handle: Option<JoinHandle<Box<dyn StreamingRecognizer>>>,
    navigate_handle: Option<JoinHandle<NavigateUnit>>,
}

impl ThreadedStreamingPipeline {
    pub fn start(
        config: &StreamingConfig,
        recognizer: Box<dyn StreamingRecognizer>,
        unit: NavigateUnit,
    ) -> Self {
        let (audio_tx, audio_rx) = crossbeam_channel::bounded(config.audio_queue_capacity);
        let (text_tx, text_rx) = crossbeam_channel::bounded(config.text_queue_capacity);
        let cancel = CancellationToken::new();
        let cursor = unit.cursor().clone();

        let recognize_handle = spawn_recognizer(
            recognizer,
            audio_rx,
            text_tx,
            cancel.clone(),
            config.dequeue_timeout,
        );
        let navigate_handle =
            spawn_navigator(unit, text_rx, cancel.clone(), config.dequeue_timeout);
        log::info!("Streaming pipeline started at transcript {}", cursor.get());

        Self {
            audio_tx,
            cursor,
            cancel,
            recognize_handle: Some(recognize_handle),
            navigate_handle: Some(navigate_handle),
        }
    }

    pub fn audio_sender(&self) -> Sender<AudioFrame> {
        self.audio_tx.clone()
    }

    pub fn cursor(&self) -> &TranscriptCursor {
        &self.cursor
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels both units, waits for them, and emits the navigation summary.
    pub fn stop(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.cancel.cancel();
        self.join_threads()
    }

    fn join_threads(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let recognize = self.recognize_handle.take().map(JoinHandle::join);
        let navigate = self.navigate_handle.take().map(JoinHandle::join);

        if let Some(Err(_)) = recognize {
            return Err("Recognize thread panicked".into());
        }
        match navigate {
            Some(Ok(unit)) => {
                unit.summary();
                Ok(())
            }
            Some(Err(_)) => Err("Navigate thread panicked".into()),
            None => Ok(()),
        }
    }
}

impl Drop for ThreadedStreamingPipeline {
    fn drop(&mut self) {
        self.cancel.cancel();
        let _ = self.join_threads();
    }
}

fn spawn_recognizer(
    mut recognizer: Box<dyn StreamingRecognizer>,
    audio_rx: Receiver<AudioFrame>,
    text_tx: Sender<String>,
    cancel: CancellationToken,
    timeout: Duration,
) -> JoinHandle<Box<dyn StreamingRecognizer>> {
    std::thread::spawn(move || {
        let mut debouncer = PartialDebouncer::new();
        while !cancel.is_cancelled() {
            let frame = match audio_rx.recv_timeout(timeout) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if let Err(e) = recognizer.accept_waveform(&frame.samples) {
                log::warn!("Recognizer rejected audio: {e}");
                continue;
            }
            let partial = match recognizer.partial_result() {
                Ok(partial) => partial,
                Err(e) => {
                    log::warn!("Recognition failed: {e}");
                    continue;
                }
            };
            if let Some(text) = debouncer.accept(&partial) {
                log::debug!("Partial: \"{text}\"");
                if text_tx.send(text).is_err() {
                    break;
                }
            }
        }
        recognizer
    })
}

fn spawn_navigator(
    mut unit: NavigateUnit,
    text_rx: Receiver<String>,
    cancel: CancellationToken,
    timeout: Duration,
) -> JoinHandle<NavigateUnit> {
    std::thread::spawn(move || {
        while !cancel.is_cancelled() {
            match text_rx.recv_timeout(timeout) {
                Ok(text) => {
                    unit.handle(&text);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        unit
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::corpus::domain::corpus::test_support::three_transcript_corpus;
    use crate::matching::domain::score_combiner::test_support::OverlapScorer;
    use crate::matching::domain::score_combiner::{CombinerWeights, ScoreCombiner};
    use crate::pipeline::advance_signal::test_support::RecordingSignal;
    use crate::pipeline::navigation_logger::NullNavigationLogger;
    use crate::pipeline::navigator::Navigator;

    /// Returns the next scripted partial after each accepted frame.
    struct ScriptedRecognizer {
        script: VecDeque<Result<String, String>>,
        partial: String,
    }

    impl ScriptedRecognizer {
        fn new(script: &[Result<&str, &str>]) -> Self {
            Self {
                script: script
                    .iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
                partial: String::new(),
            }
        }
    }

    impl StreamingRecognizer for ScriptedRecognizer {
        fn accept_waveform(&mut self, _samples: &[i16]) -> Result<(), Box<dyn std::error::Error>> {
            match self.script.pop_front() {
                Some(Ok(text)) => {
                    self.partial = text;
                    Ok(())
                }
                Some(Err(e)) => Err(e.into()),
                None => Ok(()),
            }
        }

        fn partial_result(&mut self) -> Result<String, Box<dyn std::error::Error>> {
            Ok(self.partial.clone())
        }

        fn reset(&mut self) {
            self.partial.clear();
        }
    }

    fn config() -> StreamingConfig {
        StreamingConfig {
            dequeue_timeout: Duration::from_millis(10),
            ..StreamingConfig::default()
        }
    }

    fn unit(signal: &RecordingSignal) -> NavigateUnit {
        let combiner = ScoreCombiner::new(
            Arc::new(OverlapScorer),
            Arc::new(OverlapScorer),
            CombinerWeights::default(),
        );
        NavigateUnit::new(
            Navigator::new(Arc::new(three_transcript_corpus(false)), combiner),
            TranscriptCursor::new(0),
            Box::new(signal.clone()),
            Box::new(NullNavigationLogger),
        )
    }

    fn wait_for(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn frame() -> AudioFrame {
        AudioFrame::new(vec![0; 320], 16_000)
    }

    #[test]
    fn test_speech_advances_cursor_end_to_end() {
        let signal = RecordingSignal::default();
        let recognizer = ScriptedRecognizer::new(&[
            Ok(""),
            Ok("so yes revenue"),
            Ok("so yes revenue"),
            Ok("so yes revenue grew by twenty percent overall"),
        ]);
        let pipeline = ThreadedStreamingPipeline::start(&config(), Box::new(recognizer), unit(&signal));
        let tx = pipeline.audio_sender();
        for _ in 0..4 {
            tx.try_send(frame()).unwrap();
        }

        assert!(wait_for(Duration::from_secs(5), || pipeline.cursor().get() == 1));
        pipeline.stop().unwrap();
        assert_eq!(signal.recorded(), vec![(0, 1)]);
    }

    #[test]
    fn test_recognizer_errors_do_not_stop_the_pipeline() {
        let signal = RecordingSignal::default();
        let recognizer = ScriptedRecognizer::new(&[
            Err("decoder hiccup"),
            Ok("so yes revenue grew by twenty percent overall"),
        ]);
        let pipeline = ThreadedStreamingPipeline::start(&config(), Box::new(recognizer), unit(&signal));
        let tx = pipeline.audio_sender();
        tx.try_send(frame()).unwrap();
        tx.try_send(frame()).unwrap();

        assert!(wait_for(Duration::from_secs(5), || pipeline.cursor().get() == 1));
        pipeline.stop().unwrap();
    }

    #[test]
    fn test_manual_seek_is_visible_to_the_pipeline() {
        let signal = RecordingSignal::default();
        let pipeline = ThreadedStreamingPipeline::start(
            &config(),
            Box::new(ScriptedRecognizer::new(&[])),
            unit(&signal),
        );
        pipeline.cursor().seek_right();
        pipeline.cursor().seek_right();
        pipeline.cursor().seek_left();
        assert_eq!(pipeline.cursor().get(), 1);
        pipeline.stop().unwrap();
    }

    #[test]
    fn test_stop_returns_promptly_when_idle() {
        let signal = RecordingSignal::default();
        let pipeline = ThreadedStreamingPipeline::start(
            &config(),
            Box::new(ScriptedRecognizer::new(&[])),
            unit(&signal),
        );
        let started = Instant::now();
        pipeline.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(signal.recorded().is_empty());
    }
}
