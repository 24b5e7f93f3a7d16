//! Instrument types.

use arrayvec::ArrayString;

/// An instrument definition.
#[derive(Clone, Debug)]
pub struct Instrument {
    /// Instrument name (from the INAM chunk)
    pub name: ArrayString<32>,
    /// Default volume (0-64)
    pub volume: u8,
    /// Fine-tune row (0-15, 8-15 are negative)
    pub fine_tune: u8,
    /// Index into the song's waveforms
    pub waveform: u8,
    /// Volume envelope shared by both kinds
    pub envelope: Envelope,
    /// Sampled or synthetic playback parameters
    pub kind: InstrumentKind,
}

impl Instrument {
    /// Create a sample instrument.
    pub fn sample(waveform: u8, volume: u8, params: SampleParams) -> Self {
        Self {
            name: ArrayString::new(),
            volume,
            fine_tune: 0,
            waveform,
            envelope: Envelope::default(),
            kind: InstrumentKind::Sample(params),
        }
    }

    /// Create a synth instrument.
    pub fn synth(waveform: u8, volume: u8, params: SynthParams) -> Self {
        Self {
            name: ArrayString::new(),
            volume,
            fine_tune: 0,
            waveform,
            envelope: Envelope::default(),
            kind: InstrumentKind::Synth(params),
        }
    }

    /// Set the name, truncating at a character boundary if it does not fit.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars() {
            if self.name.try_push(c).is_err() {
                break;
            }
        }
    }

    pub fn is_synth(&self) -> bool {
        matches!(self.kind, InstrumentKind::Synth(_))
    }
}

/// Playback parameters, discriminated by instrument type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrumentKind {
    /// Plays a region of a waveform once, then its repeat region
    Sample(SampleParams),
    /// Steps through a table of single-cycle waves
    Synth(SynthParams),
}

/// Sample region, all values in 16-bit words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleParams {
    pub start: u32,
    pub length: u32,
    /// Relative to `start`
    pub repeat_start: u32,
    /// A length of 0 or 1 word means no repeat
    pub repeat_length: u32,
}

impl SampleParams {
    pub fn start_bytes(&self) -> u32 {
        self.start.saturating_mul(2)
    }

    pub fn length_bytes(&self) -> u32 {
        self.length.saturating_mul(2)
    }

    pub fn repeat_start_bytes(&self) -> u32 {
        self.start.saturating_add(self.repeat_start).saturating_mul(2)
    }

    pub fn repeat_length_bytes(&self) -> u32 {
        self.repeat_length.saturating_mul(2)
    }
}

/// Wave-table parameters of a synth instrument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SynthParams {
    /// Length of one wave-table entry in words
    pub entry_length: u8,
    /// Vibrato speed (high nibble) and depth (low nibble)
    pub vibrato_param: u8,
    /// Ticks before the instrument vibrato starts
    pub vibrato_delay: u8,
    pub vibrato_waveform: VibratoWaveform,
    /// Ticks between wave-table steps
    pub wave_speed: u8,
    /// Number of wave-table entries
    pub wave_length: u8,
    pub loop_start: u8,
    pub loop_length: u8,
    pub loop_control: WaveLoopControl,
}

impl SynthParams {
    /// Bytes per wave-table entry, never less than one word.
    pub fn entry_bytes(&self) -> u32 {
        (self.entry_length.max(1) as u32) * 2
    }
}

/// How the wave-table cursor behaves at the loop boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaveLoopControl {
    /// Jump back to the loop start
    #[default]
    Normal,
    /// Reverse once and keep running backwards through the loop
    Backwards,
    /// Reverse at both ends
    PingPong,
}

impl WaveLoopControl {
    pub fn from_byte(value: u8) -> Self {
        match value {
            1 => WaveLoopControl::Backwards,
            2 => WaveLoopControl::PingPong,
            _ => WaveLoopControl::Normal,
        }
    }
}

/// Vibrato oscillator shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VibratoWaveform {
    #[default]
    Sine,
    RampDown,
    Square,
}

impl VibratoWaveform {
    pub fn from_byte(value: u8) -> Self {
        match value & 0x03 {
            1 => VibratoWaveform::RampDown,
            2 => VibratoWaveform::Square,
            _ => VibratoWaveform::Sine,
        }
    }
}

/// Volume envelope. `add` raises the level toward 127 each tick, then
/// `sub` lowers it until it reaches `end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    pub start: u8,
    pub add: u8,
    pub end: u8,
    pub sub: u8,
}
