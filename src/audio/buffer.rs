//! Shared sample buffer between the playback sink and the output device
//!
//! The scheduler side writes decoded samples in scheduled order; the device
//! callback drains them. Cloning shares the underlying buffer, so one handle
//! can live in the session thread and one in the audio callback.

use parking_lot::Mutex;
use ringbuf::{traits::*, HeapRb};
use std::sync::Arc;

/// Thread-safe ring of mono f32 samples.
pub struct PlaybackBuffer {
    ring: Arc<Mutex<HeapRb<f32>>>,
}

impl PlaybackBuffer {
    /// Create a buffer holding up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(HeapRb::new(capacity))),
        }
    }

    /// Append samples; when full, the oldest samples are dropped to make
    /// room so playback skips rather than stalls.
    pub fn write(&self, samples: &[f32]) {
        let mut ring = self.ring.lock();
        for &sample in samples {
            if ring.try_push(sample).is_err() {
                let _ = ring.try_pop();
                let _ = ring.try_push(sample);
            }
        }
    }

    /// Fill `out` with available samples, zeroing any shortfall.
    /// Returns the number of real samples written.
    pub fn read_into(&self, out: &mut [f32]) -> usize {
        let mut ring = self.ring.lock();
        let mut filled = 0;
        for slot in out.iter_mut() {
            match ring.try_pop() {
                Some(sample) => {
                    *slot = sample;
                    filled += 1;
                }
                None => *slot = 0.0,
            }
        }
        filled
    }

    /// Drop everything queued for playback.
    pub fn clear(&self) {
        self.ring.lock().clear();
    }

    /// Samples currently queued.
    pub fn len(&self) -> usize {
        self.ring.lock().occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }
}

impl Clone for PlaybackBuffer {
    fn clone(&self) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
        }
    }
}
