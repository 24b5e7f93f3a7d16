//! Period tables and vibrato waveforms.
//!
//! Periods follow the Amiga convention: the value is the number of PAL
//! color clocks between two output samples, so a lower period means a
//! higher pitch.

use aon_ir::{VibratoWaveform, MAX_NOTE};

/// PAL Amiga color clock in Hz.
pub const PAL_CLOCK: f64 = 3_546_895.0;

/// Lowest period the mixer will play.
pub const PERIOD_FLOOR: u16 = 103;

/// Slide limits (B-4 .. C-0 of the extended table).
pub const SLIDE_PERIOD_MIN: u16 = 113;
pub const SLIDE_PERIOD_MAX: u16 = 3424;

/// Number of fine-tune rows.
pub const FINE_TUNES: usize = 16;

const NOTES: usize = MAX_NOTE as usize;

/// ProTracker periods for fine-tune 0, C-1 to B-3.
const PROTRACKER_PERIODS: [u16; 36] = [
    856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480, 453, //
    428, 404, 381, 360, 339, 320, 302, 285, 269, 254, 240, 226, //
    214, 202, 190, 180, 170, 160, 151, 143, 135, 127, 120, 113,
];

/// ProTracker vibrato sine, first half of the cycle.
const VIBRATO_SINE: [u8; 32] = [
    0, 24, 49, 74, 97, 120, 141, 161, 180, 197, 212, 224, 235, 244, 250, 253, //
    255, 253, 250, 244, 235, 224, 212, 197, 180, 161, 141, 120, 97, 74, 49, 24,
];

/// Note periods for every fine-tune row.
#[derive(Clone, Debug)]
pub struct PeriodTable {
    rows: [[u16; NOTES]; FINE_TUNES],
}

impl PeriodTable {
    pub fn new() -> Self {
        // Two octaves below ProTracker's lowest, then its three octaves
        let mut base = [0u16; NOTES];
        for (i, &p) in PROTRACKER_PERIODS[..12].iter().enumerate() {
            base[i] = p * 4;
            base[i + 12] = p * 2;
        }
        base[24..].copy_from_slice(&PROTRACKER_PERIODS);

        let mut rows = [[0u16; NOTES]; FINE_TUNES];
        rows[0] = base;
        for (ft, row) in rows.iter_mut().enumerate().skip(1) {
            let factor = libm::exp2(-(signed_fine_tune(ft as u8) as f64) / 96.0);
            for (dst, &p) in row.iter_mut().zip(base.iter()) {
                *dst = libm::round(p as f64 * factor) as u16;
            }
        }
        Self { rows }
    }

    /// Period of a 1-based note (1..=60). Note 0 yields 0.
    pub fn period(&self, fine_tune: u8, note: u8) -> u16 {
        if note == 0 {
            return 0;
        }
        let col = note.min(MAX_NOTE) as usize - 1;
        self.rows[(fine_tune & 0x0F) as usize][col]
    }
}

impl Default for PeriodTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Fine-tune nibble as a signed value: 8..15 map to -8..-1.
pub fn signed_fine_tune(fine_tune: u8) -> i8 {
    let ft = (fine_tune & 0x0F) as i8;
    if ft > 7 {
        ft - 16
    } else {
        ft
    }
}

/// Lower slide limit, relaxed when the oversize flag is set.
pub fn slide_floor(oversize: bool) -> u16 {
    if oversize {
        PERIOD_FLOOR
    } else {
        SLIDE_PERIOD_MIN
    }
}

/// Resampling step for a period at the given output rate.
pub fn period_to_increment(period: u16, sample_rate: u32) -> f64 {
    if period == 0 || sample_rate == 0 {
        return 0.0;
    }
    PAL_CLOCK / period.max(PERIOD_FLOOR) as f64 / sample_rate as f64
}

/// Signed vibrato waveform value (-255..=255) at position 0..63.
pub fn vibrato_value(waveform: VibratoWaveform, pos: u8) -> i16 {
    let pos = pos & 0x3F;
    let negative = pos & 0x20 != 0;
    let magnitude = match waveform {
        VibratoWaveform::Sine => VIBRATO_SINE[(pos & 0x1F) as usize] as i16,
        VibratoWaveform::RampDown => {
            let ramp = ((pos & 0x1F) as i16) << 3;
            if negative {
                255 - ramp
            } else {
                ramp
            }
        }
        VibratoWaveform::Square => 255,
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Period offset for a vibrato of the given depth.
pub fn vibrato_offset(waveform: VibratoWaveform, pos: u8, depth: u8) -> i16 {
    (vibrato_value(waveform, pos) * depth as i16) >> 7
}
