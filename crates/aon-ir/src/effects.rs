//! Effect command codes.

/// Effect column command.
///
/// Codes 0x00-0x0F follow ProTracker; the rest drive the synth engine,
/// track volume and global flags. Codes above [`Effect::Off`] have no
/// meaning and are ignored during playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Effect {
    /// Cycle note, note+x, note+y
    Arpeggio = 0x00,
    SlideUp = 0x01,
    SlideDown = 0x02,
    /// Slide toward the target note without retriggering
    TonePortamento = 0x03,
    Vibrato = 0x04,
    TonePortaVolumeSlide = 0x05,
    VibratoVolumeSlide = 0x06,
    SetFineTune = 0x07,
    /// Synth wave-table speed
    SetWaveSpeed = 0x08,
    /// Sample start offset in 256-byte units
    SampleOffset = 0x09,
    VolumeSlide = 0x0A,
    PositionJump = 0x0B,
    SetVolume = 0x0C,
    /// Break to a (decimal-coded) row of the next position
    PatternBreak = 0x0D,
    /// Sub-commands in the high nibble, see [`ExtraCommand`]
    Extra = 0x0E,
    /// Speed (<= 32) or tempo (33-200); 0 signals song end
    SetSpeed = 0x0F,
    /// Volume set before the note triggers
    NewVolume = 0x10,
    SetWaveLoopControl = 0x11,
    SetWavePosition = 0x12,
    SetArpeggioSpeed = 0x13,
    SetTrackVolume = 0x14,
    TrackVolumeSlide = 0x15,
    FineTrackVolumeSlide = 0x16,
    RestartEnvelope = 0x17,
    SetSynthVolume = 0x18,
    Oversize = 0x19,
    NoiseAvoid = 0x1A,
    FineTonePortamento = 0x1B,
    TonePortaVibrato = 0x1C,
    SetVibratoWaveform = 0x1D,
    SetArpeggioTable = 0x1E,
    SetInstrumentVibrato = 0x1F,
    /// 0 stops wave-table cycling, anything else resumes it
    WaveTableControl = 0x20,
    /// Reserved no-op; also marks "instrument vibrato off"
    Off = 0x21,
}

impl Effect {
    /// Decode a raw effect command.
    pub fn from_code(code: u8) -> Option<Self> {
        use Effect::*;
        let effect = match code {
            0x00 => Arpeggio,
            0x01 => SlideUp,
            0x02 => SlideDown,
            0x03 => TonePortamento,
            0x04 => Vibrato,
            0x05 => TonePortaVolumeSlide,
            0x06 => VibratoVolumeSlide,
            0x07 => SetFineTune,
            0x08 => SetWaveSpeed,
            0x09 => SampleOffset,
            0x0A => VolumeSlide,
            0x0B => PositionJump,
            0x0C => SetVolume,
            0x0D => PatternBreak,
            0x0E => Extra,
            0x0F => SetSpeed,
            0x10 => NewVolume,
            0x11 => SetWaveLoopControl,
            0x12 => SetWavePosition,
            0x13 => SetArpeggioSpeed,
            0x14 => SetTrackVolume,
            0x15 => TrackVolumeSlide,
            0x16 => FineTrackVolumeSlide,
            0x17 => RestartEnvelope,
            0x18 => SetSynthVolume,
            0x19 => Oversize,
            0x1A => NoiseAvoid,
            0x1B => FineTonePortamento,
            0x1C => TonePortaVibrato,
            0x1D => SetVibratoWaveform,
            0x1E => SetArpeggioTable,
            0x1F => SetInstrumentVibrato,
            0x20 => WaveTableControl,
            0x21 => Off,
            _ => return None,
        };
        Some(effect)
    }

    /// Raw command code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Effects that slide into a new note instead of retriggering it.
    pub const fn is_tone_portamento(self) -> bool {
        matches!(
            self,
            Effect::TonePortamento
                | Effect::TonePortaVolumeSlide
                | Effect::FineTonePortamento
                | Effect::TonePortaVibrato
        )
    }

    /// Effects that only run on the ticks after the first tick of a row.
    pub const fn is_frame_gated(self) -> bool {
        matches!(
            self,
            Effect::SlideUp
                | Effect::SlideDown
                | Effect::TonePortamento
                | Effect::Vibrato
                | Effect::TonePortaVolumeSlide
                | Effect::VibratoVolumeSlide
                | Effect::VolumeSlide
                | Effect::TrackVolumeSlide
                | Effect::TonePortaVibrato
        )
    }

    /// Returns the variant name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Arpeggio => "Arpeggio",
            Effect::SlideUp => "SlideUp",
            Effect::SlideDown => "SlideDown",
            Effect::TonePortamento => "TonePortamento",
            Effect::Vibrato => "Vibrato",
            Effect::TonePortaVolumeSlide => "TonePortaVolumeSlide",
            Effect::VibratoVolumeSlide => "VibratoVolumeSlide",
            Effect::SetFineTune => "SetFineTune",
            Effect::SetWaveSpeed => "SetWaveSpeed",
            Effect::SampleOffset => "SampleOffset",
            Effect::VolumeSlide => "VolumeSlide",
            Effect::PositionJump => "PositionJump",
            Effect::SetVolume => "SetVolume",
            Effect::PatternBreak => "PatternBreak",
            Effect::Extra => "Extra",
            Effect::SetSpeed => "SetSpeed",
            Effect::NewVolume => "NewVolume",
            Effect::SetWaveLoopControl => "SetWaveLoopControl",
            Effect::SetWavePosition => "SetWavePosition",
            Effect::SetArpeggioSpeed => "SetArpeggioSpeed",
            Effect::SetTrackVolume => "SetTrackVolume",
            Effect::TrackVolumeSlide => "TrackVolumeSlide",
            Effect::FineTrackVolumeSlide => "FineTrackVolumeSlide",
            Effect::RestartEnvelope => "RestartEnvelope",
            Effect::SetSynthVolume => "SetSynthVolume",
            Effect::Oversize => "Oversize",
            Effect::NoiseAvoid => "NoiseAvoid",
            Effect::FineTonePortamento => "FineTonePortamento",
            Effect::TonePortaVibrato => "TonePortaVibrato",
            Effect::SetVibratoWaveform => "SetVibratoWaveform",
            Effect::SetArpeggioTable => "SetArpeggioTable",
            Effect::SetInstrumentVibrato => "SetInstrumentVibrato",
            Effect::WaveTableControl => "WaveTableControl",
            Effect::Off => "Off",
        }
    }
}

/// Sub-command of [`Effect::Extra`] (high nibble of the argument).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraCommand {
    FineSlideUp(u8),
    FineSlideDown(u8),
    SetVibratoWaveform(u8),
    SetFineTune(u8),
    /// 0 sets the loop point, n > 0 repeats n times
    PatternLoop(u8),
    /// Restart the note every n ticks
    Retrigger(u8),
    FineVolumeUp(u8),
    FineVolumeDown(u8),
    NoteCut(u8),
    NoteDelay(u8),
    /// Hold the current row for n extra rows
    PatternDelay(u8),
    /// Sub-commands without a meaning
    Unused,
}

impl ExtraCommand {
    /// Decode an `Exy` argument.
    pub fn from_argument(arg: u8) -> Self {
        let value = arg & 0x0F;
        match arg >> 4 {
            0x1 => ExtraCommand::FineSlideUp(value),
            0x2 => ExtraCommand::FineSlideDown(value),
            0x4 => ExtraCommand::SetVibratoWaveform(value),
            0x5 => ExtraCommand::SetFineTune(value),
            0x6 => ExtraCommand::PatternLoop(value),
            0x9 => ExtraCommand::Retrigger(value),
            0xA => ExtraCommand::FineVolumeUp(value),
            0xB => ExtraCommand::FineVolumeDown(value),
            0xC => ExtraCommand::NoteCut(value),
            0xD => ExtraCommand::NoteDelay(value),
            0xE => ExtraCommand::PatternDelay(value),
            _ => ExtraCommand::Unused,
        }
    }
}
