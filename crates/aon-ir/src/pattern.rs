//! Pattern and cell types.

use alloc::vec::Vec;

use crate::effects::Effect;

/// Every AON pattern has exactly this many rows.
pub const ROWS_PER_PATTERN: u8 = 64;

/// Highest playable note (5 octaves).
pub const MAX_NOTE: u8 = 60;

/// A single cell in a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackCell {
    /// Note (1-60, 0 = none)
    pub note: u8,
    /// Instrument number (0 = none, 1-63 = instrument index + 1)
    pub instrument: u8,
    /// Song arpeggio table index (0-15)
    pub arpeggio: u8,
    /// Raw effect command (0-63)
    pub effect: u8,
    /// Effect argument
    pub argument: u8,
}

impl TrackCell {
    /// Create an empty cell.
    pub const fn empty() -> Self {
        Self {
            note: 0,
            instrument: 0,
            arpeggio: 0,
            effect: 0,
            argument: 0,
        }
    }

    /// Decode a packed 4-byte pattern cell.
    ///
    /// The two spare high bits of bytes 1 and 2 carry the arpeggio table index.
    pub fn from_packed(bytes: [u8; 4]) -> Self {
        Self {
            note: bytes[0] & 0x3F,
            instrument: bytes[1] & 0x3F,
            arpeggio: ((bytes[2] & 0xC0) >> 4) | ((bytes[1] & 0xC0) >> 6),
            effect: bytes[2] & 0x3F,
            argument: bytes[3],
        }
    }

    /// Decoded effect, `None` for codes without a meaning.
    pub fn effect_code(&self) -> Option<Effect> {
        Effect::from_code(self.effect)
    }

    /// Returns true if the cell is completely empty.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// A 64-row grid of cells across all channels.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Number of channels (4 or 8)
    pub channels: u8,
    /// Pattern data, stored row-major: data[row * channels + channel]
    pub data: Vec<TrackCell>,
}

impl Pattern {
    /// Create a new pattern with empty cells.
    pub fn new(channels: u8) -> Self {
        Self {
            channels,
            data: alloc::vec![TrackCell::empty(); ROWS_PER_PATTERN as usize * channels as usize],
        }
    }

    /// Get a reference to a cell, `None` if out of range.
    pub fn cell(&self, row: u8, channel: u8) -> Option<&TrackCell> {
        if row >= ROWS_PER_PATTERN || channel >= self.channels {
            return None;
        }
        self.data.get(row as usize * self.channels as usize + channel as usize)
    }

    /// Get a mutable reference to a cell.
    pub fn cell_mut(&mut self, row: u8, channel: u8) -> &mut TrackCell {
        debug_assert!(row < ROWS_PER_PATTERN);
        debug_assert!(channel < self.channels);
        &mut self.data[row as usize * self.channels as usize + channel as usize]
    }

    /// All cells of one row.
    pub fn row(&self, row: u8) -> &[TrackCell] {
        let start = row as usize * self.channels as usize;
        &self.data[start..start + self.channels as usize]
    }
}
