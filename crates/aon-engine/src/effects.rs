//! Per-tick effect processing.

use aon_ir::{Effect, ExtraCommand, Song, VibratoWaveform, WaveLoopControl};

use crate::frequency::{vibrato_offset, PeriodTable};
use crate::sequencer::GlobalState;
use crate::synth::{init_adsr, EnvelopePhase, InstrumentVibrato, ENVELOPE_MAX};
use crate::voice::{restart_instrument, trigger_cell, Trigger, Voice};

/// Run the voice's current effect for this tick.
///
/// Row effects fire on the first tick of a freshly fetched row; frame-gated
/// effects fire on every other tick. The Extra countdowns (retrigger, note
/// cut, note delay) also run on the later ticks.
pub fn do_fx(global: &mut GlobalState, voice: &mut Voice, song: &Song, periods: &PeriodTable) {
    let Some(fx) = voice.effect() else {
        return;
    };
    let arg = voice.fx_arg;

    if global.frame_cnt == 0 {
        if global.row_fetched {
            row_effect(global, voice, fx, arg, periods);
        }
        return;
    }

    if fx.is_frame_gated() {
        gated_effect(global, voice, fx, arg);
    }
    if fx == Effect::Extra {
        step_countdown(voice, song, periods);
    }
}

fn row_effect(global: &mut GlobalState, voice: &mut Voice, fx: Effect, arg: u8, periods: &PeriodTable) {
    match fx {
        Effect::SetFineTune => voice.set_fine_tune(arg, periods),
        Effect::SetWaveSpeed => voice.wave.speed = arg,
        Effect::PositionJump => {
            global.new_position = Some(arg);
            global.pattern_break = true;
        }
        Effect::SetVolume => voice.volume = arg.min(64),
        Effect::PatternBreak => {
            let target = (arg >> 4) * 10 + (arg & 0x0F);
            global.new_row = if target >= 64 { 0 } else { target };
            global.pattern_break = true;
        }
        Effect::Extra => extra_row(global, voice, arg, periods),
        Effect::SetSpeed => global.set_speed(arg),
        Effect::SetWaveLoopControl => voice.wave.control = WaveLoopControl::from_byte(arg),
        Effect::SetWavePosition => {
            if voice.wave.active {
                voice.wave.set_position(arg);
                voice.repeat_offset = voice.wave.entry_offset();
                voice.repeat_length = voice.wave.entry_bytes;
                if voice.trigger == Trigger::None {
                    voice.trigger = Trigger::Repeat;
                }
            }
        }
        Effect::SetArpeggioSpeed => voice.arpeggio_spd = arg,
        Effect::SetTrackVolume => voice.track_volume = arg.min(64),
        Effect::FineTrackVolumeSlide => voice.track_volume = volume_slide(voice.track_volume, arg),
        Effect::RestartEnvelope => {
            let envelope = voice.envelope;
            init_adsr(voice, &envelope);
        }
        Effect::SetSynthVolume => {
            voice.synth_volume = arg.min(ENVELOPE_MAX);
            voice.envelope_phase = EnvelopePhase::Done;
        }
        Effect::Oversize => global.oversize = arg != 0,
        Effect::NoiseAvoid => global.noise_avoid = arg != 0,
        Effect::FineTonePortamento => voice.tone_portamento(arg),
        Effect::SetVibratoWaveform => voice.vib_waveform = VibratoWaveform::from_byte(arg),
        Effect::SetInstrumentVibrato => {
            voice.inst_vib_param = arg;
            if arg == 0 {
                voice.inst_vibrato = InstrumentVibrato::Off;
            } else if voice.inst_vibrato == InstrumentVibrato::Off {
                voice.inst_vibrato = InstrumentVibrato::Running;
            }
        }
        Effect::WaveTableControl => voice.wave.stopped = arg == 0,
        // Handled at trigger time, or gated
        _ => {}
    }
}

fn extra_row(global: &mut GlobalState, voice: &mut Voice, arg: u8, periods: &PeriodTable) {
    match ExtraCommand::from_argument(arg) {
        ExtraCommand::FineSlideUp(y) => voice.slide(-(y as i32), global.oversize),
        ExtraCommand::FineSlideDown(y) => voice.slide(y as i32, global.oversize),
        ExtraCommand::SetVibratoWaveform(y) => voice.vib_waveform = VibratoWaveform::from_byte(y),
        ExtraCommand::SetFineTune(y) => voice.set_fine_tune(y, periods),
        ExtraCommand::FineVolumeUp(y) => voice.volume = voice.volume.saturating_add(y).min(64),
        ExtraCommand::FineVolumeDown(y) => voice.volume = voice.volume.saturating_sub(y),
        ExtraCommand::NoteCut(0) => voice.volume = 0,
        _ => {}
    }
}

fn gated_effect(global: &mut GlobalState, voice: &mut Voice, fx: Effect, arg: u8) {
    match fx {
        Effect::SlideUp => voice.slide(-(arg as i32), global.oversize),
        Effect::SlideDown => voice.slide(arg as i32, global.oversize),
        Effect::TonePortamento => {
            if arg != 0 {
                voice.porta_speed = arg;
            }
            voice.tone_portamento(voice.porta_speed);
        }
        Effect::Vibrato => {
            if arg >> 4 != 0 {
                voice.vib_speed = arg >> 4;
            }
            if arg & 0x0F != 0 {
                voice.vib_depth = arg & 0x0F;
            }
            vibrato(voice);
        }
        Effect::TonePortaVolumeSlide => {
            voice.tone_portamento(voice.porta_speed);
            voice.volume = volume_slide(voice.volume, arg);
        }
        Effect::VibratoVolumeSlide => {
            vibrato(voice);
            voice.volume = volume_slide(voice.volume, arg);
        }
        Effect::VolumeSlide => voice.volume = volume_slide(voice.volume, arg),
        Effect::TrackVolumeSlide => voice.track_volume = volume_slide(voice.track_volume, arg),
        Effect::TonePortaVibrato => {
            voice.tone_portamento(voice.porta_speed);
            vibrato(voice);
        }
        _ => {}
    }
}

fn vibrato(voice: &mut Voice) {
    voice.vib_offset = vibrato_offset(voice.vib_waveform, voice.vib_pos, voice.vib_depth);
    voice.vib_pos = voice.vib_pos.wrapping_add(voice.vib_speed) & 0x3F;
}

/// `x0` slides up by x, `0y` down by y, within 0..=64.
fn volume_slide(value: u8, arg: u8) -> u8 {
    let up = arg >> 4;
    if up != 0 {
        value.saturating_add(up).min(64)
    } else {
        value.saturating_sub(arg & 0x0F)
    }
}

fn step_countdown(voice: &mut Voice, song: &Song, periods: &PeriodTable) {
    if voice.step_fx_cnt == 0 {
        return;
    }
    voice.step_fx_cnt -= 1;
    if voice.step_fx_cnt != 0 {
        return;
    }

    match ExtraCommand::from_argument(voice.fx_arg) {
        ExtraCommand::Retrigger(ticks) => {
            if let Some(inst) = voice.instrument.and_then(|i| song.instrument(i as usize)) {
                restart_instrument(voice, inst, 0);
            }
            voice.step_fx_cnt = ticks;
        }
        ExtraCommand::NoteCut(_) => voice.volume = 0,
        ExtraCommand::NoteDelay(_) => {
            if let Some(cell) = voice.delayed.take() {
                trigger_cell(voice, &cell, None, song, periods);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_song::sample_song;
    use crate::voice::get_da_channel;
    use aon_ir::TrackCell;

    struct Rig {
        song: Song,
        periods: PeriodTable,
        global: GlobalState,
        voice: Voice,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                song: sample_song(),
                periods: PeriodTable::new(),
                global: GlobalState::new(48000),
                voice: Voice::new(),
            }
        }

        /// Feed a cell as a freshly fetched row and run its first tick.
        fn row(&mut self, note: u8, instrument: u8, effect: u8, argument: u8) {
            let cell = TrackCell { note, instrument, effect, argument, ..TrackCell::empty() };
            self.global.frame_cnt = 0;
            self.global.row_fetched = true;
            get_da_channel(&mut self.global, &mut self.voice, &cell, &self.song, &self.periods);
            self.tick();
        }

        fn tick(&mut self) {
            self.voice.begin_tick();
            do_fx(&mut self.global, &mut self.voice, &self.song, &self.periods);
            self.global.frame_cnt += 1;
        }
    }

    #[test]
    fn slide_up_is_frame_gated() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x01, 4);
        assert_eq!(rig.voice.per_slide, 0);
        rig.tick();
        rig.tick();
        assert_eq!(rig.voice.per_slide, -8);
    }

    #[test]
    fn tone_portamento_reaches_target() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0, 0);
        rig.voice.trigger = Trigger::None;
        rig.row(26, 0, 0x03, 30);
        assert_eq!(rig.voice.per_slide, 856 - 808);
        rig.tick();
        assert_eq!(rig.voice.per_slide, 18);
        rig.tick();
        assert_eq!(rig.voice.per_slide, 0);
        rig.tick();
        assert_eq!(rig.voice.per_slide, 0);
    }

    #[test]
    fn volume_slide_nibbles() {
        assert_eq!(volume_slide(60, 0x80), 64);
        assert_eq!(volume_slide(10, 0x04), 6);
        assert_eq!(volume_slide(2, 0x0F), 0);
        // Up wins when both nibbles are set
        assert_eq!(volume_slide(10, 0x23), 12);
    }

    #[test]
    fn set_volume_on_first_tick_only() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x0C, 80);
        assert_eq!(rig.voice.volume, 64);
        rig.voice.volume = 5;
        rig.tick();
        assert_eq!(rig.voice.volume, 5);
    }

    #[test]
    fn pattern_break_decimal_target() {
        let mut rig = Rig::new();
        rig.row(0, 0, 0x0D, 0x16);
        assert!(rig.global.pattern_break);
        assert_eq!(rig.global.new_row, 16);

        rig.row(0, 0, 0x0D, 0x70);
        assert_eq!(rig.global.new_row, 0);
    }

    #[test]
    fn position_jump_sets_target() {
        let mut rig = Rig::new();
        rig.row(0, 0, 0x0B, 3);
        assert_eq!(rig.global.new_position, Some(3));
        assert!(rig.global.pattern_break);
    }

    #[test]
    fn vibrato_remembers_parameters() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x04, 0x48);
        rig.tick();
        assert_eq!((rig.voice.vib_speed, rig.voice.vib_depth), (4, 8));
        assert_eq!(rig.voice.vib_pos, 4);
        rig.row(0, 0, 0x04, 0x00);
        rig.tick();
        assert_eq!(rig.voice.vib_pos, 8);
        assert!(rig.voice.vib_offset > 0);
    }

    #[test]
    fn note_cut_after_ticks() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x0E, 0xC2);
        rig.tick();
        assert_eq!(rig.voice.volume, 64);
        rig.tick();
        assert_eq!(rig.voice.volume, 0);
    }

    #[test]
    fn note_delay_triggers_later() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x0E, 0xD2);
        assert_eq!(rig.voice.trigger, Trigger::None);
        rig.tick();
        assert_eq!(rig.voice.trigger, Trigger::None);
        rig.tick();
        assert_eq!(rig.voice.trigger, Trigger::Start);
        assert_eq!(rig.voice.period, 856);
    }

    #[test]
    fn retrigger_repeats() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x0E, 0x92);
        rig.voice.trigger = Trigger::None;
        rig.tick();
        assert_eq!(rig.voice.trigger, Trigger::None);
        rig.tick();
        assert_eq!(rig.voice.trigger, Trigger::Start);
        assert_eq!(rig.voice.step_fx_cnt, 2);
    }

    #[test]
    fn global_flags() {
        let mut rig = Rig::new();
        rig.row(0, 0, 0x19, 1);
        assert!(rig.global.oversize);
        rig.row(0, 0, 0x1A, 1);
        assert!(rig.global.noise_avoid);
        rig.row(0, 0, 0x1A, 0);
        assert!(!rig.global.noise_avoid);
    }

    #[test]
    fn track_volume_effects() {
        let mut rig = Rig::new();
        rig.row(0, 0, 0x14, 40);
        assert_eq!(rig.voice.track_volume, 40);
        rig.row(0, 0, 0x16, 0x05);
        assert_eq!(rig.voice.track_volume, 35);
        rig.row(0, 0, 0x15, 0x20);
        rig.tick();
        assert_eq!(rig.voice.track_volume, 37);
    }

    #[test]
    fn synth_volume_holds_envelope() {
        let mut rig = Rig::new();
        rig.row(25, 1, 0x18, 200);
        assert_eq!(rig.voice.synth_volume, 127);
        assert_eq!(rig.voice.envelope_phase, EnvelopePhase::Done);
    }

    #[test]
    fn row_effects_skipped_without_fetch() {
        let mut rig = Rig::new();
        rig.row(0, 0, 0x0F, 3);
        assert_eq!(rig.global.speed, 3);
        rig.voice.fx_arg = 9;
        rig.global.frame_cnt = 0;
        rig.global.row_fetched = false;
        rig.tick();
        assert_eq!(rig.global.speed, 3);
    }
}
