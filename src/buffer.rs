//! Fixed-capacity streaming sample buffer
//!
//! [`SampleBuffer`] owns the authoritative in-memory series shown on
//! screen: a bounded double-ended queue of [`Sample`]s with strict FIFO
//! eviction. The acquisition loop appends; the renderer takes snapshots on
//! its own redraw cadence and never mutates the buffer.
//!
//! [`SharedSampleBuffer`] is the cross-thread handle: a clone-able
//! `Arc<Mutex<SampleBuffer>>`. With one producer (the acquisition loop)
//! and one consumer (the UI), lock-guarded mutation guarantees a snapshot
//! never observes a partially written sample or a length above capacity.

use crate::error::{Result, ScopeError};
use crate::types::Sample;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Fixed-capacity FIFO buffer of samples.
///
/// Capacity is fixed at construction. When an append would exceed it, the
/// single oldest sample is evicted first, so `len() <= capacity()` holds
/// after every operation, not just at rest.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a buffer holding at most `capacity` samples.
    ///
    /// Fails with [`ScopeError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ScopeError::InvalidCapacity(capacity));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Maximum number of samples this buffer retains
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append one sample, evicting the oldest entry if the buffer is full.
    ///
    /// Amortized O(1); never grows the buffer beyond its capacity and never
    /// copies the whole series.
    pub fn append(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Replace the entire contents with `series`.
    ///
    /// If `series` is longer than the capacity, only its most recent
    /// `capacity` entries are retained (tail-truncate), mirroring the
    /// eviction semantics of [`append`](Self::append). This is a full
    /// replace, not an append.
    pub fn reset(&mut self, series: impl IntoIterator<Item = Sample>) {
        self.samples.clear();
        for sample in series {
            self.append(sample);
        }
    }

    /// Remove all samples, keeping the capacity
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Current contents in insertion order (oldest to newest)
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Snapshot rendered as `[x, y]` pairs for egui_plot
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|s| s.as_plot_point()).collect()
    }
}

/// Clone-able cross-thread handle to a [`SampleBuffer`].
///
/// The producer side calls [`append`](Self::append); the consumer side
/// calls [`snapshot`](Self::snapshot) or [`plot_points`](Self::plot_points).
/// Neither blocks the other for longer than one O(1) buffer operation.
#[derive(Debug, Clone)]
pub struct SharedSampleBuffer {
    inner: Arc<Mutex<SampleBuffer>>,
}

impl SharedSampleBuffer {
    /// Create a shared buffer with the given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(SampleBuffer::new(capacity)?)),
        })
    }

    /// Append one sample (producer side)
    pub fn append(&self, sample: Sample) {
        self.lock().append(sample);
    }

    /// Replace the entire contents (tail-truncating to capacity)
    pub fn reset(&self, series: impl IntoIterator<Item = Sample>) {
        self.lock().reset(series);
    }

    /// Remove all samples
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Current contents in insertion order (consumer side)
    pub fn snapshot(&self) -> Vec<Sample> {
        self.lock().snapshot()
    }

    /// Snapshot rendered as `[x, y]` pairs for egui_plot
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.lock().plot_points()
    }

    /// Current number of samples
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of samples retained
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Rebuild the inner buffer at a new capacity, discarding all samples.
    ///
    /// Used when a chart's axis range changes: the buffer is cleared and
    /// recreated rather than resized in place, while clones of this handle
    /// (e.g. the acquisition loop's sink) stay valid.
    pub fn reconfigure(&self, capacity: usize) -> Result<()> {
        let mut guard = self.lock();
        *guard = SampleBuffer::new(capacity)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SampleBuffer> {
        // A poisoned lock means a panic mid-append; the buffer itself is
        // still structurally valid, so recover the guard.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
