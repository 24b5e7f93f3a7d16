//! Per-channel oscilloscope capture.

use alloc::vec::Vec;

use ringbuf::traits::{Consumer, Observer, RingBuffer};
use ringbuf::HeapRb;

/// Most recent output of every channel, one ring buffer each.
///
/// Buffers are allocated when capture is enabled; pushing overwrites the
/// oldest sample, so the render path never allocates.
pub struct Scope {
    buffers: Vec<HeapRb<f32>>,
    channels: usize,
    len: usize,
    enabled: bool,
}

impl Scope {
    pub fn new(channels: usize, len: usize) -> Self {
        Self {
            buffers: Vec::new(),
            channels,
            len,
            enabled: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && self.buffers.is_empty() && self.len > 0 {
            self.buffers = (0..self.channels).map(|_| HeapRb::new(self.len)).collect();
        }
        self.enabled = enabled && !self.buffers.is_empty();
    }

    /// Drop captured samples but keep the buffers.
    pub fn clear(&mut self) {
        for rb in &mut self.buffers {
            rb.clear();
        }
    }

    #[inline]
    pub fn push(&mut self, channel: usize, value: f32) {
        if !self.enabled {
            return;
        }
        if let Some(rb) = self.buffers.get_mut(channel) {
            rb.push_overwrite(value);
        }
    }

    /// Copy up to `out.len()` of the most recent samples, oldest first.
    pub fn read(&self, channel: usize, out: &mut [f32]) -> usize {
        let Some(rb) = self.buffers.get(channel) else {
            return 0;
        };
        let available = rb.occupied_len();
        let n = out.len().min(available);
        for (dst, &src) in out.iter_mut().zip(rb.iter().skip(available - n)) {
            *dst = src;
        }
        n
    }
}
