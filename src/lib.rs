//! Headless controller for the Art of Noise replayer.
//!
//! Ties the loader and the playback engine together for the CLI and for
//! hosts that only want bytes in and frames out.

mod wav;

use tracing::debug;

// Re-export common types so callers don't need the member crates directly.
pub use aon_engine::{PlaybackState, Player, PlayerConfig, SongInfo};
pub use aon_formats::ParseError;
pub use aon_ir::Song;

pub use wav::{frames_to_wav, to_i16, write_wav};

/// Frames rendered per `decode` call during offline rendering.
const RENDER_BLOCK: usize = 1024;

/// Parse a module and build a player for it.
///
/// All-or-nothing: on error no player exists.
pub fn create(data: &[u8], config: PlayerConfig) -> Result<Player, ParseError> {
    let song = aon_formats::load_aon(data)?;
    Ok(Player::new(song, config))
}

/// Owns a loaded song and renders it offline.
pub struct Controller {
    song: Option<Song>,
    config: PlayerConfig,
}

impl Controller {
    pub fn new(config: PlayerConfig) -> Self {
        Self { song: None, config }
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlayerConfig {
        &mut self.config
    }

    /// Replace the current song. A failed load keeps the previous one.
    pub fn load(&mut self, data: &[u8]) -> Result<(), ParseError> {
        self.song = Some(aon_formats::load_aon(data)?);
        Ok(())
    }

    /// A fresh player positioned at the start of the loaded song.
    pub fn player(&self) -> Option<Player> {
        self.song.clone().map(|song| Player::new(song, self.config))
    }

    /// Render interleaved stereo frames until the song has played through
    /// once or `max_frames` frames exist.
    pub fn render_frames(&self, max_frames: usize) -> Vec<f32> {
        let Some(mut player) = self.player() else {
            return Vec::new();
        };

        let mut samples = vec![0.0f32; max_frames * 2];
        let mut rendered = 0;
        while rendered < max_frames && !player.is_finished() {
            let n = RENDER_BLOCK.min(max_frames - rendered);
            rendered += player.decode(&mut samples[rendered * 2..], n);
        }
        samples.truncate(rendered * 2);
        debug!(frames = rendered, finished = player.is_finished(), "offline render done");
        samples
    }

    pub fn render_to_wav(&self, max_seconds: u32) -> Vec<u8> {
        let max_frames = self.config.sample_rate as usize * max_seconds as usize;
        let samples = self.render_frames(max_frames);
        wav::frames_to_wav(&samples, self.config.sample_rate)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}
