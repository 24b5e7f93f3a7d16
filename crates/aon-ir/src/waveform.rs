//! Raw waveform data.

use alloc::vec::Vec;

/// Signed 8-bit PCM referenced by instruments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Waveform {
    pub data: Vec<i8>,
}

impl Waveform {
    pub fn new(data: Vec<i8>) -> Self {
        Self { data }
    }

    /// Reinterpret raw bytes as signed samples.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.iter().map(|&b| b as i8).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at a byte offset, silence past the end.
    #[inline]
    pub fn get(&self, pos: usize) -> i8 {
        self.data.get(pos).copied().unwrap_or(0)
    }
}
