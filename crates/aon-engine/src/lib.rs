//! Playback engine for the Art of Noise replayer.
//!
//! Runs the tick-driven sequencer, effect and synth state machines over a
//! loaded [`aon_ir::Song`] and mixes the channels into stereo frames.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod effects;
mod frequency;
mod mixer;
mod player;
mod scope;
pub mod sequencer;
mod session;
mod synth;
mod voice;

#[cfg(test)]
mod test_song;

pub use frequency::{period_to_increment, PeriodTable, PAL_CLOCK, PERIOD_FLOOR};
pub use mixer::{pan_gains, MixerChannel};
pub use player::{ChannelSnapshot, PlaybackState, Player, PlayerConfig, SongInfo, MAX_CHANNELS};
pub use sequencer::GlobalState;
pub use session::{MixSettings, PlaybackSession};
pub use synth::{EnvelopePhase, InstrumentVibrato, WaveTable};
pub use voice::{Trigger, Voice};
