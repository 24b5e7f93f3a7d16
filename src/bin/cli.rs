//! Art of Noise CLI: module info, play length and WAV export.
//!
//! Usage:
//!   aon-cli path/to/song.aon
//!   aon-cli path/to/song.aon --wav output.wav --seconds 60

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artofnoise::{Controller, PlayerConfig, Song};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "aon-cli")]
#[command(about = "Play Art of Noise (AON4/AON8) modules offline")]
struct Args {
    /// Module file
    file: PathBuf,

    /// Render to this WAV file
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Stop rendering after this many seconds
    #[arg(long, default_value_t = 300)]
    seconds: u32,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    rate: u32,

    /// 0.0 keeps the hard Amiga panning, 1.0 is mono
    #[arg(long, default_value_t = 0.0)]
    stereo_mix: f32,

    /// Play only this channel
    #[arg(long)]
    solo: Option<u8>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let data = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let config = PlayerConfig {
        sample_rate: args.rate.max(1),
        stereo_mix: args.stereo_mix.clamp(0.0, 1.0),
        solo_channel: args.solo,
        ..PlayerConfig::default()
    };
    let mut ctrl = Controller::new(config);
    ctrl.load(&data)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    if let Some(song) = ctrl.song() {
        print_info(song);
    }

    match args.wav {
        Some(path) => render_to_wav(&ctrl, &path, args.seconds),
        None => {
            report_length(&ctrl, args.seconds);
            Ok(())
        }
    }
}

fn print_info(song: &Song) {
    let meta = &song.metadata;
    println!("Title:       {}", meta.name);
    println!("Author:      {}", meta.author);
    println!("Version:     {}", meta.version);
    println!("Channels:    {}", song.channels);
    println!("Positions:   {} (restart {})", song.num_positions(), song.restart_position);
    println!("Patterns:    {}", song.patterns.len());
    let synths = song.instruments.iter().filter(|i| i.is_synth()).count();
    println!("Instruments: {} ({} synth)", song.instruments.len(), synths);
    println!("Waveforms:   {}", song.waveforms.len());
    for line in meta.remarks.lines().filter(|l| !l.trim().is_empty()) {
        println!("  {}", line);
    }
    println!();
}

fn report_length(ctrl: &Controller, max_seconds: u32) {
    let rate = ctrl.config().sample_rate;
    let max_frames = rate as usize * max_seconds as usize;
    let frames = ctrl.render_frames(max_frames).len() / 2;
    let seconds = frames / rate as usize;
    if frames >= max_frames {
        println!("Length:      more than {}:{:02}", seconds / 60, seconds % 60);
    } else {
        println!("Length:      {}:{:02}", seconds / 60, seconds % 60);
    }
}

fn render_to_wav(ctrl: &Controller, path: &Path, max_seconds: u32) -> Result<()> {
    info!(path = %path.display(), rate = ctrl.config().sample_rate, "rendering");

    let wav = ctrl.render_to_wav(max_seconds);
    fs::write(path, &wav).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Rendered {} bytes to {}", wav.len(), path.display());
    Ok(())
}
