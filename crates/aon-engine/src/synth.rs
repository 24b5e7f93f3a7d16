//! Synth instrument engine: wave-table stepping, ADSR and instrument vibrato.

use aon_ir::{Envelope, SynthParams, VibratoWaveform, WaveLoopControl};

use crate::frequency::vibrato_offset;
use crate::voice::{Trigger, Voice};

/// Peak of the envelope level.
pub const ENVELOPE_MAX: u8 = 127;

/// Envelope state machine: `Add` -> `Sub` -> `Done`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopePhase {
    /// Rising toward the peak by `add` per tick
    Add,
    /// Falling toward `end` by `sub` per tick
    Sub,
    /// Level is held
    #[default]
    Done,
}

/// Vibrato supplied by a synth instrument, separate from effect 4xy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstrumentVibrato {
    #[default]
    Off,
    /// Ticks left before the vibrato starts
    Delay(u8),
    Running,
}

/// Read cursor over a synth instrument's wave table.
///
/// The table is a run of equally sized single-cycle waves inside one
/// waveform. Positions are entry indices; `loop_end` is exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveTable {
    /// Set while a synth instrument owns the voice
    pub active: bool,
    /// Stepping halted by effect 0x20 or the end of a table without loop
    pub stopped: bool,
    pub pos: u8,
    pub counter: u8,
    pub speed: u8,
    pub length: u8,
    pub loop_start: u8,
    pub loop_end: u8,
    pub control: WaveLoopControl,
    pub reverse: bool,
    pub entry_bytes: u32,
}

impl WaveTable {
    pub fn new(params: &SynthParams) -> Self {
        let length = params.wave_length.max(1);
        let loop_start = params.loop_start.min(length - 1);
        let loop_end = loop_start.saturating_add(params.loop_length).min(length);
        Self {
            active: true,
            stopped: false,
            pos: 0,
            counter: params.wave_speed,
            speed: params.wave_speed,
            length,
            loop_start,
            loop_end,
            control: params.loop_control,
            reverse: false,
            entry_bytes: params.entry_bytes(),
        }
    }

    /// Byte offset of the current entry in the waveform.
    pub fn entry_offset(&self) -> u32 {
        self.pos as u32 * self.entry_bytes
    }

    fn has_loop(&self) -> bool {
        self.loop_end > self.loop_start
    }

    /// Jump to an entry, clamped to the table.
    pub fn set_position(&mut self, pos: u8) {
        self.pos = pos.min(self.length - 1);
    }

    /// Count down one tick and move to the next entry when due.
    ///
    /// Returns true when the cursor moved.
    pub fn step(&mut self) -> bool {
        if !self.active || self.stopped {
            return false;
        }
        if self.counter > 0 {
            self.counter -= 1;
            return false;
        }
        self.counter = self.speed;

        let old = self.pos;
        if self.reverse {
            self.step_backward();
        } else {
            self.step_forward();
        }
        self.pos != old
    }

    fn step_forward(&mut self) {
        let limit = if self.has_loop() { self.loop_end } else { self.length };
        if self.pos + 1 < limit {
            self.pos += 1;
            return;
        }
        if !self.has_loop() {
            self.stopped = true;
            return;
        }
        match self.control {
            WaveLoopControl::Normal => self.pos = self.loop_start,
            WaveLoopControl::Backwards => {
                self.reverse = true;
                self.pos = self.loop_end - 1;
            }
            WaveLoopControl::PingPong => {
                self.reverse = true;
                self.pos = self.pos.saturating_sub(1).max(self.loop_start);
            }
        }
    }

    fn step_backward(&mut self) {
        if self.pos > self.loop_start {
            self.pos -= 1;
            return;
        }
        match self.control {
            WaveLoopControl::PingPong => {
                self.reverse = false;
                self.pos = (self.pos + 1).min(self.loop_end.saturating_sub(1));
            }
            // Backwards keeps running down through the loop
            _ => self.pos = self.loop_end.saturating_sub(1).max(self.loop_start),
        }
    }
}

/// Reset the envelope to its start level.
pub fn init_adsr(voice: &mut Voice, envelope: &Envelope) {
    voice.envelope = *envelope;
    voice.synth_volume = envelope.start.min(ENVELOPE_MAX);
    voice.envelope_phase = EnvelopePhase::Add;
    if envelope.add == 0 {
        voice.synth_volume = ENVELOPE_MAX;
        voice.envelope_phase = if envelope.sub == 0 {
            EnvelopePhase::Done
        } else {
            EnvelopePhase::Sub
        };
    }
}

fn step_envelope(voice: &mut Voice) {
    let env = voice.envelope;
    match voice.envelope_phase {
        EnvelopePhase::Add => {
            let level = voice.synth_volume.saturating_add(env.add);
            if level >= ENVELOPE_MAX {
                voice.synth_volume = ENVELOPE_MAX;
                voice.envelope_phase = if env.sub == 0 {
                    EnvelopePhase::Done
                } else {
                    EnvelopePhase::Sub
                };
            } else {
                voice.synth_volume = level;
            }
        }
        EnvelopePhase::Sub => {
            let end = env.end.min(ENVELOPE_MAX);
            let level = voice.synth_volume.saturating_sub(env.sub);
            if level <= end {
                voice.synth_volume = end;
                voice.envelope_phase = EnvelopePhase::Done;
            } else {
                voice.synth_volume = level;
            }
        }
        EnvelopePhase::Done => {}
    }
}

/// Prime the instrument vibrato from a synth's parameters.
pub fn init_instrument_vibrato(voice: &mut Voice, param: u8, delay: u8, waveform: VibratoWaveform) {
    voice.inst_vib_param = param;
    voice.inst_vib_waveform = waveform;
    voice.inst_vib_pos = 0;
    voice.inst_vibrato = match (param, delay) {
        (0, _) => InstrumentVibrato::Off,
        (_, 0) => InstrumentVibrato::Running,
        (_, d) => InstrumentVibrato::Delay(d),
    };
}

fn step_instrument_vibrato(voice: &mut Voice) {
    match voice.inst_vibrato {
        InstrumentVibrato::Off => {}
        InstrumentVibrato::Delay(n) => {
            voice.inst_vibrato = if n <= 1 {
                InstrumentVibrato::Running
            } else {
                InstrumentVibrato::Delay(n - 1)
            };
        }
        InstrumentVibrato::Running => {
            let speed = voice.inst_vib_param >> 4;
            let depth = voice.inst_vib_param & 0x0F;
            voice.inst_vib_offset = vibrato_offset(voice.inst_vib_waveform, voice.inst_vib_pos, depth);
            voice.inst_vib_pos = voice.inst_vib_pos.wrapping_add(speed) & 0x3F;
        }
    }
}

/// Per-tick synth processing for one voice.
///
/// The envelope and instrument vibrato run for every voice. The wave-table
/// cursor only moves when no trigger is waiting for the mixer.
pub fn do_synth(voice: &mut Voice) {
    step_envelope(voice);
    step_instrument_vibrato(voice);

    if voice.trigger != Trigger::None {
        return;
    }
    if voice.wave.step() {
        voice.repeat_offset = voice.wave.entry_offset();
        voice.repeat_length = voice.wave.entry_bytes;
        voice.trigger = Trigger::Repeat;
    }
}
