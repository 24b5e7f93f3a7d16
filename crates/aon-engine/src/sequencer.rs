//! Song sequencer: row fetching and position advance.

use aon_ir::{Song, TrackCell, ROWS_PER_PATTERN};

use crate::frequency::PeriodTable;
use crate::voice::{get_da_channel, Voice};

/// Default tempo (50 ticks per second).
pub const DEFAULT_TEMPO: u8 = 125;
/// Default ticks per row.
pub const DEFAULT_SPEED: u8 = 6;

/// Song-wide playback state.
#[derive(Clone, Debug)]
pub struct GlobalState {
    pub sample_rate: u32,
    pub tempo: u8,
    /// Ticks per row
    pub speed: u8,
    /// Output frames per tick at the current tempo
    pub samples_per_tick: f64,
    /// Tick within the current row
    pub frame_cnt: u8,

    /// Position and row fetched next
    pub position: u8,
    pub row: u8,
    /// Position, pattern and row fetched last
    pub current_position: u8,
    pub current_pattern: u8,
    pub current_row: u8,
    /// A row was fetched on the current first tick (false while a pattern delay holds it)
    pub row_fetched: bool,

    pub pat_delay_cnt: u8,
    pub loop_point: u8,
    pub loop_cnt: u8,
    pub loop_jump: bool,

    /// Leave the pattern before the next row fetch
    pub pattern_break: bool,
    pub new_position: Option<u8>,
    pub new_row: u8,

    pub oversize: bool,
    pub noise_avoid: bool,

    pub end_reached: bool,
    /// Times the song played through (or signalled its end)
    pub loop_count: u32,
}

impl GlobalState {
    pub fn new(sample_rate: u32) -> Self {
        let mut state = Self {
            sample_rate: sample_rate.max(1),
            tempo: DEFAULT_TEMPO,
            speed: DEFAULT_SPEED,
            samples_per_tick: 0.0,
            frame_cnt: 0,
            position: 0,
            row: 0,
            current_position: 0,
            current_pattern: 0,
            current_row: 0,
            row_fetched: false,
            pat_delay_cnt: 0,
            loop_point: 0,
            loop_cnt: 0,
            loop_jump: false,
            pattern_break: false,
            new_position: None,
            new_row: 0,
            oversize: false,
            noise_avoid: false,
            end_reached: false,
            loop_count: 0,
        };
        state.update_samples_per_tick();
        state
    }

    /// ticks per second = tempo * 2 / 5
    fn update_samples_per_tick(&mut self) {
        let ticks_per_second = self.tempo as f64 * 2.0 / 5.0;
        self.samples_per_tick = self.sample_rate as f64 / ticks_per_second;
    }

    pub fn set_tempo(&mut self, tempo: u8) {
        self.tempo = tempo.max(1);
        self.update_samples_per_tick();
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.update_samples_per_tick();
    }

    /// Effect F: 0 signals the end, up to 32 sets speed, up to 200 sets tempo.
    pub fn set_speed(&mut self, value: u8) {
        match value {
            0 => self.signal_end(),
            1..=32 => self.speed = value,
            33..=200 => self.set_tempo(value),
            _ => {}
        }
    }

    pub fn signal_end(&mut self) {
        self.end_reached = true;
        self.loop_count = self.loop_count.saturating_add(1);
    }

    /// Effect E6y, resolved while the row is read.
    pub fn pattern_loop(&mut self, count: u8) {
        if count == 0 {
            self.loop_point = self.current_row;
        } else if self.loop_cnt == 0 {
            self.loop_cnt = count;
            self.loop_jump = true;
        } else {
            self.loop_cnt -= 1;
            if self.loop_cnt != 0 {
                self.loop_jump = true;
            }
        }
    }

    /// Move to the break target or the next position, wrapping at the end.
    fn advance_position(&mut self, song: &Song) {
        let next = match self.new_position.take() {
            Some(target) => {
                // Jumping back counts as a completed loop
                if target <= self.position {
                    self.signal_end();
                }
                target as usize
            }
            None => self.position as usize + 1,
        };

        if next >= song.num_positions() {
            self.position = song.restart_position;
            self.signal_end();
        } else {
            self.position = next as u8;
        }
        self.loop_point = 0;
        self.loop_cnt = 0;
    }
}

/// Fetch the next row and hand each channel's cell to the voice engine.
pub fn play_new_step(
    global: &mut GlobalState,
    voices: &mut [Voice],
    song: &Song,
    periods: &PeriodTable,
) {
    if global.pat_delay_cnt > 0 {
        global.pat_delay_cnt -= 1;
        global.row_fetched = false;
        return;
    }

    if global.pattern_break {
        global.advance_position(song);
        global.row = global.new_row.min(ROWS_PER_PATTERN - 1);
        global.new_row = 0;
        global.pattern_break = false;
    }

    let pattern = song.positions.get(global.position as usize).copied().unwrap_or(0);
    global.current_position = global.position;
    global.current_pattern = pattern;
    global.current_row = global.row;
    global.row_fetched = true;

    for (channel, voice) in voices.iter_mut().enumerate() {
        let cell = song
            .cell(pattern as usize, global.row, channel as u8)
            .copied()
            .unwrap_or_else(TrackCell::empty);
        get_da_channel(global, voice, &cell, song, periods);
    }

    if global.loop_jump {
        global.loop_jump = false;
        global.row = global.loop_point;
        return;
    }

    global.row += 1;
    if global.row >= ROWS_PER_PATTERN {
        global.pattern_break = true;
    }
}
