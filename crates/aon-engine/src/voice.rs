//! Per-channel voice state and row processing.
//!
//! A [`Voice`] holds everything one channel remembers between ticks: the
//! instrument it plays, pitch and volume, effect memory, the arpeggio
//! cursor and the synth wave-table cursor. [`get_da_channel`] applies one
//! pattern cell to it at the start of a row.

use aon_ir::{
    Effect, Envelope, ExtraCommand, Instrument, InstrumentKind, SampleParams, Song, SynthParams,
    TrackCell, VibratoWaveform, MAX_NOTE,
};
use heapless::Vec;

use crate::frequency::{slide_floor, PeriodTable, PERIOD_FLOOR, SLIDE_PERIOD_MAX};
use crate::sequencer::GlobalState;
use crate::synth::{init_adsr, init_instrument_vibrato, EnvelopePhase, InstrumentVibrato, WaveTable};

/// Arpeggio steps plus room for the wrap position.
pub const ARPEGGIO_CAPACITY: usize = 8;

/// Note offsets cycled by the arpeggio, in semitones.
pub type ArpeggioSteps = Vec<u8, ARPEGGIO_CAPACITY>;

/// What the mixer has to do with the voice's waveform region on the next tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Trigger {
    #[default]
    None,
    /// Loop region changed, keep playing
    Repeat,
    /// Restart from the sample start
    Start,
}

/// Mutable playback state of one channel.
#[derive(Clone, Debug, Default)]
pub struct Voice {
    /// Index into `Song::instruments`
    pub instrument: Option<u8>,
    pub note: u8,
    pub fine_tune: u8,
    /// Period of `note` without modulation
    pub period: u16,
    /// Portamento and slide offset added to `period`
    pub per_slide: i32,
    pub porta_speed: u8,
    /// Period sent to the mixer this tick
    pub output_period: u16,

    /// Note volume (0-64)
    pub volume: u8,
    /// Channel volume (0-64)
    pub track_volume: u8,
    /// Envelope level (0-127)
    pub synth_volume: u8,
    pub envelope: Envelope,
    pub envelope_phase: EnvelopePhase,

    /// Effect command and argument of the current row
    pub fx_com: u8,
    pub fx_arg: u8,
    /// Countdown for retrigger, note cut and note delay
    pub step_fx_cnt: u8,
    /// Cell held back by a note delay
    pub delayed: Option<TrackCell>,

    pub arpeggio: ArpeggioSteps,
    pub arpeggio_pos: u8,
    pub arpeggio_cnt: u8,
    pub arpeggio_spd: u8,
    pub arpeggio_offset: u8,

    pub vib_speed: u8,
    pub vib_depth: u8,
    pub vib_pos: u8,
    pub vib_waveform: VibratoWaveform,
    pub vib_offset: i16,

    pub inst_vibrato: InstrumentVibrato,
    pub inst_vib_param: u8,
    pub inst_vib_waveform: VibratoWaveform,
    pub inst_vib_pos: u8,
    pub inst_vib_offset: i16,

    pub wave: WaveTable,

    /// Waveform region in bytes
    pub waveform: Option<u8>,
    pub sample_offset: u32,
    pub sample_length: u32,
    pub repeat_offset: u32,
    pub repeat_length: u32,
    pub trigger: Trigger,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            track_volume: 64,
            synth_volume: crate::synth::ENVELOPE_MAX,
            ..Default::default()
        }
    }

    /// Current effect, if the code is known.
    pub fn effect(&self) -> Option<Effect> {
        Effect::from_code(self.fx_com)
    }

    /// Clear per-tick modulation before effects run.
    pub fn begin_tick(&mut self) {
        self.vib_offset = 0;
        self.inst_vib_offset = 0;
    }

    /// Apply a slide to `per_slide`, keeping the sounding period in range.
    pub fn slide(&mut self, delta: i32, oversize: bool) {
        if self.period == 0 {
            return;
        }
        let base = self.period as i32;
        let min = slide_floor(oversize) as i32 - base;
        let max = SLIDE_PERIOD_MAX as i32 - base;
        self.per_slide = (self.per_slide + delta).clamp(min.min(max), max);
    }

    /// Move `per_slide` toward zero by `speed`.
    pub fn tone_portamento(&mut self, speed: u8) {
        let speed = speed as i32;
        self.per_slide = if self.per_slide > 0 {
            (self.per_slide - speed).max(0)
        } else {
            (self.per_slide + speed).min(0)
        };
    }

    /// Compute `output_period` from note, arpeggio, slide and vibratos.
    pub fn update_output_period(&mut self, periods: &PeriodTable) {
        if self.note == 0 || self.period == 0 {
            self.output_period = 0;
            return;
        }
        let note = self.note.saturating_add(self.arpeggio_offset).min(MAX_NOTE);
        let base = periods.period(self.fine_tune, note) as i32;
        let period = base
            + self.per_slide
            + self.vib_offset as i32
            + self.inst_vib_offset as i32;
        self.output_period = period.clamp(PERIOD_FLOOR as i32, u16::MAX as i32) as u16;
    }

    /// Reload the fine-tune and the base period of the current note.
    pub fn set_fine_tune(&mut self, fine_tune: u8, periods: &PeriodTable) {
        self.fine_tune = fine_tune & 0x0F;
        if self.note != 0 {
            self.period = periods.period(self.fine_tune, self.note);
        }
    }

    /// Advance the arpeggio cursor; runs once per tick.
    pub fn do_arpeggio(&mut self) {
        self.arpeggio_offset = self
            .arpeggio
            .get(self.arpeggio_pos as usize)
            .copied()
            .unwrap_or(0);
        if self.arpeggio_cnt >= self.arpeggio_spd {
            self.arpeggio_cnt = 0;
            self.arpeggio_pos = (self.arpeggio_pos + 1) & 7;
            if self.arpeggio_pos as usize >= self.arpeggio.len() {
                self.arpeggio_pos = 0;
            }
        } else {
            self.arpeggio_cnt += 1;
        }
    }

    fn set_arpeggio(&mut self, steps: ArpeggioSteps, restart: bool) {
        if restart || steps != self.arpeggio {
            self.arpeggio_pos = 0;
            self.arpeggio_cnt = 0;
        }
        self.arpeggio = steps;
    }
}

/// Arpeggio table for a row.
///
/// A plain `0xy` effect builds `[0, x, y]`. Otherwise the song table is
/// picked by effect 0x1E or the cell's arpeggio index; index 0 in the
/// cell means no arpeggio.
pub fn arpeggio_steps(cell: &TrackCell, song: &Song) -> ArpeggioSteps {
    let mut steps = ArpeggioSteps::new();
    let table = match cell.effect_code() {
        Some(Effect::Arpeggio) if cell.argument != 0 => {
            for offset in [0, cell.argument >> 4, cell.argument & 0x0F] {
                let _ = steps.push(offset);
            }
            return steps;
        }
        Some(Effect::SetArpeggioTable) => cell.argument & 0x0F,
        _ if cell.arpeggio != 0 => cell.arpeggio,
        _ => return steps,
    };
    if let Some(table) = song.arpeggios.get(table as usize) {
        for offset in table.offsets() {
            let _ = steps.push(offset);
        }
    }
    steps
}

/// Set up a sample instrument's regions. `offset` is a start offset in bytes.
pub fn start_sample(voice: &mut Voice, waveform: u8, params: &SampleParams, offset: u32) {
    voice.waveform = Some(waveform);
    voice.wave.active = false;
    start_repeat(voice, params);

    let length = params.length_bytes();
    if offset < length {
        voice.sample_offset = params.start_bytes().saturating_add(offset);
        voice.sample_length = length - offset;
    } else {
        // Offset past the one-shot part starts in the repeat region
        voice.sample_offset = voice.repeat_offset;
        voice.sample_length = voice.repeat_length;
    }
}

/// Refresh the repeat region from the instrument.
pub fn start_repeat(voice: &mut Voice, params: &SampleParams) {
    voice.repeat_offset = params.repeat_start_bytes();
    voice.repeat_length = params.repeat_length_bytes();
}

/// Set up a synth instrument's wave table and vibrato.
pub fn init_synth(voice: &mut Voice, waveform: u8, params: &SynthParams) {
    voice.waveform = Some(waveform);
    voice.wave = WaveTable::new(params);
    let offset = voice.wave.entry_offset();
    voice.sample_offset = offset;
    voice.sample_length = voice.wave.entry_bytes;
    voice.repeat_offset = offset;
    voice.repeat_length = voice.wave.entry_bytes;
    init_instrument_vibrato(
        voice,
        params.vibrato_param,
        params.vibrato_delay,
        params.vibrato_waveform,
    );
}

/// Restart the voice's instrument from the beginning.
pub fn restart_instrument(voice: &mut Voice, inst: &Instrument, offset: u32) {
    init_adsr(voice, &inst.envelope);
    match &inst.kind {
        InstrumentKind::Sample(params) => start_sample(voice, inst.waveform, params, offset),
        InstrumentKind::Synth(params) => init_synth(voice, inst.waveform, params),
    }
    voice.trigger = Trigger::Start;
}

/// Apply the row's cell to a voice.
///
/// Effects that act before the note is handled (pattern loop and delay,
/// new volume, note delay, row-63 break clamp) are resolved here; the rest
/// run from `do_fx`.
pub fn get_da_channel(
    global: &mut GlobalState,
    voice: &mut Voice,
    cell: &TrackCell,
    song: &Song,
    periods: &PeriodTable,
) {
    let mut cell = *cell;
    voice.step_fx_cnt = 0;
    voice.delayed = None;
    let mut new_volume = None;

    match cell.effect_code() {
        Some(Effect::PatternBreak) if global.current_row == 63 => {
            let target = (cell.argument >> 4) * 10 + (cell.argument & 0x0F);
            if target > 62 {
                cell.argument = 0x62;
            }
        }
        Some(Effect::NewVolume) => new_volume = Some(cell.argument.min(64)),
        Some(Effect::Extra) => match ExtraCommand::from_argument(cell.argument) {
            ExtraCommand::PatternLoop(count) => global.pattern_loop(count),
            ExtraCommand::PatternDelay(rows) => {
                if global.pat_delay_cnt == 0 {
                    global.pat_delay_cnt = rows;
                }
            }
            ExtraCommand::Retrigger(ticks) | ExtraCommand::NoteCut(ticks) => {
                voice.step_fx_cnt = ticks;
            }
            ExtraCommand::NoteDelay(ticks) if ticks > 0 && cell.note != 0 => {
                voice.fx_com = cell.effect;
                voice.fx_arg = cell.argument;
                voice.step_fx_cnt = ticks;
                voice.delayed = Some(cell);
                return;
            }
            _ => {}
        },
        _ => {}
    }

    voice.fx_com = cell.effect;
    voice.fx_arg = cell.argument;
    trigger_cell(voice, &cell, new_volume, song, periods);
}

/// Note and instrument handling for a cell.
pub fn trigger_cell(
    voice: &mut Voice,
    cell: &TrackCell,
    new_volume: Option<u8>,
    song: &Song,
    periods: &PeriodTable,
) {
    let selected = cell
        .instrument
        .checked_sub(1)
        .filter(|&i| song.instrument(i as usize).is_some());
    if selected.is_some() {
        voice.instrument = selected;
    }
    let steps = arpeggio_steps(cell, song);

    let Some(inst) = voice.instrument.and_then(|i| song.instrument(i as usize)) else {
        voice.set_arpeggio(steps, false);
        return;
    };

    if cell.note == 0 {
        if selected.is_some() {
            voice.volume = new_volume.unwrap_or(inst.volume.min(64));
            if let InstrumentKind::Sample(params) = &inst.kind {
                start_repeat(voice, params);
                if voice.trigger == Trigger::None {
                    voice.trigger = Trigger::Repeat;
                }
            }
        } else if let Some(volume) = new_volume {
            voice.volume = volume;
        }
        voice.set_arpeggio(steps, false);
        return;
    }

    let note = cell.note.min(MAX_NOTE);
    let legato = cell.effect_code().is_some_and(|fx| fx.is_tone_portamento());
    if legato && voice.period != 0 {
        let target = periods.period(voice.fine_tune, note);
        voice.per_slide += voice.period as i32 - target as i32;
        voice.period = target;
        voice.note = note;
        if let Some(volume) = new_volume {
            voice.volume = volume;
        } else if selected.is_some() {
            voice.volume = inst.volume.min(64);
        }
        voice.set_arpeggio(steps, false);
        return;
    }

    voice.note = note;
    voice.fine_tune = inst.fine_tune & 0x0F;
    voice.period = periods.period(voice.fine_tune, note);
    voice.per_slide = 0;
    voice.vib_pos = 0;
    voice.volume = match (new_volume, selected) {
        (Some(volume), _) => volume,
        (None, Some(_)) => inst.volume.min(64),
        (None, None) => voice.volume,
    };

    let offset = match cell.effect_code() {
        Some(Effect::SampleOffset) => cell.argument as u32 * 256,
        _ => 0,
    };
    restart_instrument(voice, inst, offset);
    voice.set_arpeggio(steps, true);
}
