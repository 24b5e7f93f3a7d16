//! Song arpeggio tables.

use heapless::Vec;

/// Number of arpeggio tables stored in a song.
pub const ARPEGGIO_TABLES: usize = 16;

/// Most note offsets one table can hold.
pub const MAX_ARPEGGIO_STEPS: usize = 7;

/// A raw 4-byte arpeggio table.
///
/// Nibble-coded: the high nibble of the first byte is the step count, the
/// following nibbles are the note offsets in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArpeggioTable(pub [u8; 4]);

impl ArpeggioTable {
    /// Number of steps the table declares (capped at 7).
    pub fn len(&self) -> usize {
        ((self.0[0] >> 4) as usize).min(MAX_ARPEGGIO_STEPS)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the note offsets.
    pub fn offsets(&self) -> Vec<u8, MAX_ARPEGGIO_STEPS> {
        let mut out = Vec::new();
        for i in 1..=self.len() {
            let byte = self.0[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            // len() <= capacity, push cannot fail
            let _ = out.push(nibble);
        }
        out
    }
}
