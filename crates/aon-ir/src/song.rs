//! Song structure.

use alloc::string::String;
use alloc::vec::Vec;

use crate::arpeggio::{ArpeggioTable, ARPEGGIO_TABLES};
use crate::instrument::Instrument;
use crate::pattern::{Pattern, TrackCell};
use crate::waveform::Waveform;

/// A complete, loaded module.
#[derive(Clone, Debug)]
pub struct Song {
    /// Number of channels (4 or 8)
    pub channels: u8,
    /// Pattern index for each song position
    pub positions: Vec<u8>,
    /// Position playback wraps to after the last one
    pub restart_position: u8,
    pub patterns: Vec<Pattern>,
    pub instruments: Vec<Instrument>,
    pub arpeggios: [ArpeggioTable; ARPEGGIO_TABLES],
    pub waveforms: Vec<Waveform>,
    pub metadata: SongMetadata,
}

/// Descriptive text carried by the module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongMetadata {
    pub name: String,
    pub author: String,
    pub remarks: String,
    /// Format version from the INFO chunk
    pub version: u8,
}

impl Song {
    /// Create an empty song with a single position playing pattern 0.
    pub fn with_channels(channels: u8) -> Self {
        Self {
            channels,
            positions: alloc::vec![0],
            restart_position: 0,
            patterns: Vec::new(),
            instruments: Vec::new(),
            arpeggios: [ArpeggioTable::default(); ARPEGGIO_TABLES],
            waveforms: Vec::new(),
            metadata: SongMetadata::default(),
        }
    }

    /// Append a pattern and return its index.
    pub fn add_pattern(&mut self, pattern: Pattern) -> u8 {
        let idx = self.patterns.len() as u8;
        self.patterns.push(pattern);
        idx
    }

    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Pattern played at a song position.
    pub fn pattern_at(&self, position: usize) -> Option<&Pattern> {
        let idx = *self.positions.get(position)?;
        self.patterns.get(idx as usize)
    }

    /// Look up a single cell.
    pub fn cell(&self, pattern: usize, row: u8, channel: u8) -> Option<&TrackCell> {
        self.patterns.get(pattern)?.cell(row, channel)
    }

    pub fn instrument(&self, index: usize) -> Option<&Instrument> {
        self.instruments.get(index)
    }

    pub fn waveform(&self, index: usize) -> Option<&Waveform> {
        self.waveforms.get(index)
    }
}
