//! Small songs built in memory for unit tests.

use aon_ir::{
    ArpeggioTable, Instrument, Pattern, SampleParams, Song, SynthParams, VibratoWaveform,
    WaveLoopControl, Waveform,
};

/// Square wave alternating +100/-100 every 16 bytes.
fn square(len: usize) -> Waveform {
    Waveform::new((0..len).map(|i| if (i / 16) % 2 == 0 { 100 } else { -100 }).collect())
}

fn song_with(instrument: Instrument, waveform: Waveform, note: u8) -> Song {
    let mut song = Song::with_channels(4);
    song.waveforms.push(waveform);
    song.instruments.push(instrument);
    song.arpeggios[1] = ArpeggioTable([0x30, 0x37, 0x00, 0x00]);
    let mut pattern = Pattern::new(4);
    let cell = pattern.cell_mut(0, 0);
    cell.note = note;
    cell.instrument = 1;
    song.add_pattern(pattern);
    song
}

/// Channel 0 plays a 256-byte sample with a 128-byte loop at C-1.
pub fn sample_song() -> Song {
    let params = SampleParams {
        start: 0,
        length: 128,
        repeat_start: 64,
        repeat_length: 64,
    };
    song_with(Instrument::sample(0, 64, params), square(256), 25)
}

/// Like `sample_song`, but the whole sample loops.
pub fn looping_song() -> Song {
    let params = SampleParams {
        start: 0,
        length: 32,
        repeat_start: 0,
        repeat_length: 32,
    };
    song_with(Instrument::sample(0, 64, params), square(128), 25)
}

/// Sample note with a `0x47` ProTracker arpeggio.
pub fn arpeggio_song() -> Song {
    let mut song = sample_song();
    let cell = song.patterns[0].cell_mut(0, 0);
    cell.effect = 0x00;
    cell.argument = 0x47;
    song
}

/// Channel 0 plays a four-entry synth wave table.
pub fn synth_song() -> Song {
    let params = SynthParams {
        entry_length: 16,
        vibrato_param: 0x24,
        vibrato_delay: 2,
        vibrato_waveform: VibratoWaveform::Sine,
        wave_speed: 1,
        wave_length: 4,
        loop_start: 0,
        loop_length: 4,
        loop_control: WaveLoopControl::PingPong,
    };
    let saw = Waveform::new((0..128).map(|i| ((i % 32) * 8 - 128) as i8).collect());
    song_with(Instrument::synth(0, 64, params), saw, 37)
}
