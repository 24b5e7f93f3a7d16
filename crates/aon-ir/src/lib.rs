//! Song model for the Art of Noise replayer.
//!
//! The loader in `aon-formats` produces a [`Song`], and the playback engine
//! consumes it read-only. Nothing in here changes after a load.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod arpeggio;
mod effects;
mod instrument;
mod pattern;
pub mod song;
mod waveform;

pub use arpeggio::{ArpeggioTable, ARPEGGIO_TABLES, MAX_ARPEGGIO_STEPS};
pub use effects::{Effect, ExtraCommand};
pub use instrument::{
    Envelope, Instrument, InstrumentKind, SampleParams, SynthParams, VibratoWaveform, WaveLoopControl,
};
pub use pattern::{Pattern, TrackCell, MAX_NOTE, ROWS_PER_PATTERN};
pub use song::{Song, SongMetadata};
pub use waveform::Waveform;
