//! Public playback API.

use aon_ir::{Song, TrackCell};
use heapless::Vec;
use tracing::debug;

use crate::scope::Scope;
use crate::session::{MixSettings, PlaybackSession};

/// Most channels a module can have.
pub const MAX_CHANNELS: usize = 8;

/// Player settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Output rate in Hz
    pub sample_rate: u32,
    /// 0.0 keeps the hard Amiga panning, 1.0 is mono
    pub stereo_mix: f32,
    /// Play only this channel
    pub solo_channel: Option<u8>,
    pub scope_capture: bool,
    /// Samples kept per channel for scope reads
    pub scope_len: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            stereo_mix: 0.0,
            solo_channel: None,
            scope_capture: false,
            scope_len: 1024,
        }
    }
}

impl PlayerConfig {
    fn mix_settings(&self) -> MixSettings {
        MixSettings {
            stereo_mix: self.stereo_mix,
            solo_channel: self.solo_channel,
        }
    }
}

/// State of one channel as of the last tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelSnapshot {
    /// 0-based instrument index
    pub instrument: Option<u8>,
    pub volume: u8,
    pub period: u16,
    pub effect: u8,
    pub argument: u8,
}

/// Playback position and channel states, refreshed once per `decode` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub position: u8,
    pub pattern: u8,
    pub row: u8,
    pub speed: u8,
    pub tempo: u8,
    pub channels: Vec<ChannelSnapshot, MAX_CHANNELS>,
}

/// Descriptive information about the loaded song.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SongInfo<'a> {
    pub name: &'a str,
    pub author: &'a str,
    pub remarks: &'a str,
    pub version: u8,
    pub channels: usize,
    pub positions: usize,
    pub patterns: usize,
    pub instruments: usize,
    pub waveforms: usize,
}

/// Plays one song into interleaved stereo `f32` frames.
pub struct Player {
    song: Song,
    config: PlayerConfig,
    session: PlaybackSession,
    scope: Scope,
    state: PlaybackState,
}

impl Player {
    pub fn new(song: Song, config: PlayerConfig) -> Self {
        debug!(
            channels = song.channels,
            positions = song.num_positions(),
            sample_rate = config.sample_rate,
            "creating player"
        );
        let session = PlaybackSession::new(&song, config.sample_rate);
        let mut scope = Scope::new(song.channels as usize, config.scope_len);
        scope.set_enabled(config.scope_capture);
        let mut player = Self {
            song,
            config,
            session,
            scope,
            state: PlaybackState::default(),
        };
        player.refresh_state();
        player
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn channel_count(&self) -> usize {
        self.song.channels as usize
    }

    /// Reset playback to the first position.
    pub fn start(&mut self) {
        self.session = PlaybackSession::new(&self.song, self.config.sample_rate);
        self.scope.clear();
        self.refresh_state();
    }

    /// Same as [`Player::start`].
    pub fn reset(&mut self) {
        self.start();
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.config.sample_rate = sample_rate.max(1);
        debug!(sample_rate = self.config.sample_rate, "output rate changed");
        self.session.global.set_sample_rate(self.config.sample_rate);
    }

    /// `None` plays all channels.
    pub fn set_solo_channel(&mut self, channel: Option<u8>) {
        self.config.solo_channel = channel;
    }

    pub fn set_stereo_mix(&mut self, mix: f32) {
        self.config.stereo_mix = mix.clamp(0.0, 1.0);
    }

    /// Render up to `num_frames` interleaved stereo frames into `out`.
    ///
    /// Never fails: silence is produced when nothing plays, and the song
    /// keeps looping after its end.
    pub fn decode(&mut self, out: &mut [f32], num_frames: usize) -> usize {
        let frames = num_frames.min(out.len() / 2);
        let out = &mut out[..frames * 2];
        let settings = self.config.mix_settings();

        #[cfg(feature = "alloc_check")]
        let written = assert_no_alloc::assert_no_alloc(|| {
            self.session.render(&self.song, &settings, &mut self.scope, out)
        });
        #[cfg(not(feature = "alloc_check"))]
        let written = self.session.render(&self.song, &settings, &mut self.scope, out);

        self.refresh_state();
        written
    }

    /// True once the song has played through (or signalled its end) once.
    pub fn is_finished(&self) -> bool {
        self.loop_count() > 0
    }

    pub fn loop_count(&self) -> u32 {
        self.session.global.loop_count
    }

    pub fn metadata(&self) -> SongInfo<'_> {
        let song = &self.song;
        SongInfo {
            name: &song.metadata.name,
            author: &song.metadata.author,
            remarks: &song.metadata.remarks,
            version: song.metadata.version,
            channels: song.channels as usize,
            positions: song.num_positions(),
            patterns: song.patterns.len(),
            instruments: song.instruments.len(),
            waveforms: song.waveforms.len(),
        }
    }

    pub fn get_pattern_cell(&self, pattern: usize, row: u8, channel: u8) -> Option<TrackCell> {
        self.song.cell(pattern, row, channel).copied()
    }

    pub fn playback_state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn enable_scope_capture(&mut self, enabled: bool) {
        self.config.scope_capture = enabled;
        self.scope.set_enabled(enabled);
    }

    /// Copy the most recent `n` captured samples of a channel into `out`.
    pub fn get_scope_data(&self, channel: usize, out: &mut [f32], n: usize) -> usize {
        let n = n.min(out.len());
        self.scope.read(channel, &mut out[..n])
    }

    fn refresh_state(&mut self) {
        let global = &self.session.global;
        self.state.position = global.current_position;
        self.state.pattern = global.current_pattern;
        self.state.row = global.current_row;
        self.state.speed = global.speed;
        self.state.tempo = global.tempo;
        self.state.channels.clear();
        for voice in &self.session.voices {
            let _ = self.state.channels.push(ChannelSnapshot {
                instrument: voice.instrument,
                volume: voice.volume,
                period: voice.output_period,
                effect: voice.fx_com,
                argument: voice.fx_arg,
            });
        }
    }
}
