//! Per-frame callback sink.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counts rendered frames while the monitor is armed.
///
/// The host calls [`record_frame`](Self::record_frame) once per rendered
/// frame. Frames reported while the monitor is stopped are dropped, which
/// detaches the frame-callback chain without the host having to know.
#[derive(Debug, Default)]
pub struct FrameCounter {
    frames: AtomicU64,
    armed: AtomicBool,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rendered frame. Returns `false` if the monitor is stopped.
    #[inline]
    pub fn record_frame(&self) -> bool {
        if !self.armed.load(Ordering::Acquire) {
            return false;
        }
        self.frames.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Total frames counted since construction.
    pub fn total(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub(crate) fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub(crate) fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_dropped_until_armed() {
        let counter = FrameCounter::new();
        assert!(!counter.record_frame());
        assert_eq!(counter.total(), 0);

        counter.arm();
        assert!(counter.record_frame());
        assert!(counter.record_frame());
        assert_eq!(counter.total(), 2);

        counter.disarm();
        assert!(!counter.record_frame());
        assert_eq!(counter.total(), 2);
    }
}
