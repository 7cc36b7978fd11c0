use std::time::Duration;

use crate::shared::constants::{AUDIO_QUEUE_CAPACITY, DEQUEUE_TIMEOUT_MS, TEXT_QUEUE_CAPACITY};

/// Queue sizing and polling for a streaming pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamingConfig {
    pub audio_queue_capacity: usize,
    pub text_queue_capacity: usize,
    /// How long a unit waits on its queue before checking for cancellation.
    pub dequeue_timeout: Duration,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            audio_queue_capacity: AUDIO_QUEUE_CAPACITY,
            text_queue_capacity: TEXT_QUEUE_CAPACITY,
            dequeue_timeout: Duration::from_millis(DEQUEUE_TIMEOUT_MS),
        }
    }
}
