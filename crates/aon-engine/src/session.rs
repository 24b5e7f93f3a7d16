//! Playback session: all mutable state of one song being played.

use alloc::vec::Vec;

use aon_ir::Song;

use crate::effects::do_fx;
use crate::frequency::PeriodTable;
use crate::mixer::{mix_one_frame, setup_channel, MixerChannel};
use crate::scope::Scope;
use crate::sequencer::{play_new_step, GlobalState};
use crate::synth::do_synth;
use crate::voice::Voice;

/// Output-side settings read by the mixer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixSettings {
    pub stereo_mix: f32,
    pub solo_channel: Option<u8>,
}

/// Global state plus one voice and one mixer channel per song channel.
#[derive(Clone, Debug)]
pub struct PlaybackSession {
    pub global: GlobalState,
    pub voices: Vec<Voice>,
    pub mixers: Vec<MixerChannel>,
    periods: PeriodTable,
    /// Frames left until the next tick
    tick_acc: f64,
}

impl PlaybackSession {
    /// Fresh session positioned at the start of the song.
    pub fn new(song: &Song, sample_rate: u32) -> Self {
        let channels = song.channels as usize;
        Self {
            global: GlobalState::new(sample_rate),
            voices: (0..channels).map(|_| Voice::new()).collect(),
            mixers: (0..channels).map(|_| MixerChannel::default()).collect(),
            periods: PeriodTable::new(),
            tick_acc: 0.0,
        }
    }

    pub fn periods(&self) -> &PeriodTable {
        &self.periods
    }

    /// Advance playback by one tick.
    pub fn tick(&mut self, song: &Song, settings: &MixSettings) {
        let Self { global, voices, mixers, periods, .. } = self;

        if global.frame_cnt == 0 {
            play_new_step(global, voices, song, periods);
        }

        for voice in voices.iter_mut() {
            voice.begin_tick();
            voice.do_arpeggio();
            do_fx(global, voice, song, periods);
            do_synth(voice);
            voice.update_output_period(periods);
        }

        for (index, (mixer, voice)) in mixers.iter_mut().zip(voices.iter_mut()).enumerate() {
            setup_channel(mixer, voice, song, global, index, settings.stereo_mix);
        }

        global.frame_cnt += 1;
        if global.frame_cnt >= global.speed.max(1) {
            global.frame_cnt = 0;
        }
    }

    /// Fill interleaved stereo frames, running ticks as they fall due.
    ///
    /// Returns the number of frames written. The result does not depend on
    /// how a run of frames is split across calls.
    pub fn render(
        &mut self,
        song: &Song,
        settings: &MixSettings,
        scope: &mut Scope,
        out: &mut [f32],
    ) -> usize {
        let mut frames = 0;
        for frame in out.chunks_exact_mut(2) {
            if self.tick_acc <= 0.0 {
                self.tick(song, settings);
                self.tick_acc += self.global.samples_per_tick;
            }
            let (left, right) = mix_one_frame(&mut self.mixers, song, settings.solo_channel, scope);
            frame[0] = left;
            frame[1] = right;
            self.tick_acc -= 1.0;
            frames += 1;
        }
        frames
    }
}
