//! Resampling mixer.
//!
//! Each [`MixerChannel`] is a view into one waveform: a one-shot part
//! followed by an optional loop, read at a fractional phase. The view is
//! rebuilt from the voice once per tick by [`setup_channel`] and read once
//! per output frame by [`mix_one_frame`].

use aon_ir::Song;

use crate::frequency::period_to_increment;
use crate::scope::Scope;
use crate::sequencer::GlobalState;
use crate::voice::{Trigger, Voice};

/// Shortest loop the mixer will repeat, in bytes.
pub const MIN_LOOP_BYTES: usize = 2;

/// Left gain of each channel before stereo mixing (LRRL).
const PAN_4: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Left gain of each channel before stereo mixing (LLRRRRLL).
const PAN_8: [f32; 8] = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];

/// Output-side state of one channel.
#[derive(Clone, Debug, Default)]
pub struct MixerChannel {
    pub waveform: Option<u8>,
    pub sample_offset: usize,
    pub sample_length: usize,
    pub loop_offset: usize,
    /// 0 means no loop
    pub loop_length: usize,
    /// Read position relative to `sample_offset`
    pub phase: f64,
    pub phase_inc: f64,
    pub playing: bool,
    pub volume: f32,
    pub pan_left: f32,
    pub pan_right: f32,
    pub period: u16,
}

impl MixerChannel {
    fn set_loop(&mut self, voice: &Voice, waveform_len: usize) {
        let offset = (voice.repeat_offset as usize).min(waveform_len);
        let length = (voice.repeat_length as usize).min(waveform_len - offset);
        if length >= MIN_LOOP_BYTES {
            self.loop_offset = offset;
            self.loop_length = length;
        } else {
            self.loop_offset = 0;
            self.loop_length = 0;
        }
    }

    /// Read the sample under the phase and advance it.
    fn next_sample(&mut self, song: &Song) -> f32 {
        if !self.playing || self.phase_inc <= 0.0 {
            return 0.0;
        }
        let Some(wave) = self.waveform.and_then(|w| song.waveform(w as usize)) else {
            return 0.0;
        };

        let pos = self.phase as usize;
        let index = if pos < self.sample_length {
            self.sample_offset + pos
        } else if self.loop_length > 0 {
            self.loop_offset + (pos - self.sample_length) % self.loop_length
        } else {
            self.playing = false;
            return 0.0;
        };
        let value = wave.get(index) as f32 / 128.0 * self.volume;

        self.phase += self.phase_inc;
        if self.loop_length > 0 {
            let start = self.sample_length as f64;
            if self.phase >= start + self.loop_length as f64 {
                self.phase = start + libm::fmod(self.phase - start, self.loop_length as f64);
            }
        }
        value
    }
}

/// Output gain for a voice.
///
/// The fixed-point products and the divisors reproduce the reference
/// player's scaling bit for bit.
pub fn channel_volume(voice: &Voice, channels: u8) -> f32 {
    let volume = voice.volume as u32;
    let track = voice.track_volume as u32;
    let synth = voice.synth_volume as u32;
    if channels == 8 {
        let level = (((volume * synth) >> 6) * track) >> 6;
        level.min(64) as f32 / 254.0
    } else {
        let level = (((volume * (synth >> 1)) >> 6) * track) >> 6;
        level.min(64) as f32 / 128.0
    }
}

/// Left and right gain of a channel, blended toward center by `stereo_mix`.
pub fn pan_gains(channels: u8, index: usize, stereo_mix: f32) -> (f32, f32) {
    let table: &[f32] = if channels == 8 { &PAN_8 } else { &PAN_4 };
    let left = table.get(index % table.len()).copied().unwrap_or(0.5);
    let right = 1.0 - left;
    let mix = stereo_mix.clamp(0.0, 1.0);
    (left + (0.5 - left) * mix, right + (0.5 - right) * mix)
}

/// Rebuild a mixer channel from its voice; runs once per tick.
pub fn setup_channel(
    mixer: &mut MixerChannel,
    voice: &mut Voice,
    song: &Song,
    global: &GlobalState,
    index: usize,
    stereo_mix: f32,
) {
    let waveform_len = voice
        .waveform
        .and_then(|w| song.waveform(w as usize))
        .map_or(0, |w| w.len());

    match voice.trigger {
        Trigger::Start => {
            let same_region = mixer.playing
                && mixer.waveform == voice.waveform
                && mixer.sample_offset == voice.sample_offset as usize;
            mixer.waveform = voice.waveform;
            let offset = (voice.sample_offset as usize).min(waveform_len);
            mixer.sample_offset = offset;
            mixer.sample_length = (voice.sample_length as usize).min(waveform_len - offset);
            mixer.set_loop(voice, waveform_len);
            if !(global.noise_avoid && same_region) {
                mixer.phase = 0.0;
            }
            mixer.playing = mixer.sample_length > 0 || mixer.loop_length > 0;
        }
        Trigger::Repeat => {
            if mixer.waveform == voice.waveform {
                mixer.set_loop(voice, waveform_len);
            }
        }
        Trigger::None => {}
    }
    voice.trigger = Trigger::None;

    // Paula never stops DMA: a stopped channel with repeat data plays the loop
    if !mixer.playing && voice.waveform.is_some() && voice.repeat_length as usize >= MIN_LOOP_BYTES {
        mixer.waveform = voice.waveform;
        mixer.set_loop(voice, waveform_len);
        if mixer.loop_length > 0 {
            mixer.sample_offset = mixer.loop_offset;
            mixer.sample_length = 0;
            mixer.phase = 0.0;
            mixer.playing = true;
        }
    }

    mixer.period = voice.output_period;
    mixer.phase_inc = period_to_increment(voice.output_period, global.sample_rate);
    mixer.volume = channel_volume(voice, song.channels);
    (mixer.pan_left, mixer.pan_right) = pan_gains(song.channels, index, stereo_mix);
}

/// Mix one stereo frame from all audible channels.
///
/// With a solo channel set, only that channel is read; the others hold
/// their position.
pub fn mix_one_frame(
    mixers: &mut [MixerChannel],
    song: &Song,
    solo: Option<u8>,
    scope: &mut Scope,
) -> (f32, f32) {
    let solo = solo.filter(|&s| (s as usize) < mixers.len());
    let mut left = 0.0;
    let mut right = 0.0;
    for (i, ch) in mixers.iter_mut().enumerate() {
        let value = match solo {
            Some(s) if s as usize != i => 0.0,
            _ => ch.next_sample(song),
        };
        left += value * ch.pan_left;
        right += value * ch.pan_right;
        scope.push(i, value);
    }
    (left, right)
}
