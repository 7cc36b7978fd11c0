use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The index of the transcript currently on display.
///
/// Every writer (automatic advance, manual seek) goes through this type so
/// mutations are atomic. Reads may be stale relative to a concurrent write.
#[derive(Clone, Debug, Default)]
pub struct TranscriptCursor {
    index: Arc<AtomicUsize>,
}

impl TranscriptCursor {
    pub fn new(index: usize) -> Self {
        Self {
            index: Arc::new(AtomicUsize::new(index)),
        }
    }

    pub fn get(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    pub fn set(&self, index: usize) {
        self.index.store(index, Ordering::SeqCst);
    }

    /// Moves one transcript back, never below zero. Returns the new index.
    pub fn seek_left(&self) -> usize {
        let previous = self
            .index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| {
                Some(i.saturating_sub(1))
            })
            .unwrap_or_else(|i| i);
        previous.saturating_sub(1)
    }

    /// Moves one transcript forward. The upper bound is the caller's concern.
    pub fn seek_right(&self) -> usize {
        self.index.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Moves one transcript forward while staying below `limit`.
    ///
    /// The bound check and the increment are a single atomic step, so a
    /// concurrent advance cannot push the cursor past the last transcript.
    /// Returns the resulting index.
    pub fn seek_right_within(&self, limit: usize) -> usize {
        match self
            .index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| {
                (i + 1 < limit).then_some(i + 1)
            }) {
            Ok(previous) => previous + 1,
            Err(current) => current,
        }
    }

    /// Sets the cursor to `target` only if it lies strictly ahead.
    ///
    /// Returns the index that was replaced, or `None` if the cursor was
    /// already at or beyond `target`.
    pub fn advance_to(&self, target: usize) -> Option<usize> {
        self.index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (target > current).then_some(target)
            })
            .ok()
    }
}
