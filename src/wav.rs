//! WAV encoding for 16-bit stereo PCM.

use std::io::Write;

const NUM_CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;

/// Write interleaved stereo `f32` frames as a 16-bit PCM WAV stream.
pub fn write_wav(w: &mut impl Write, samples: &[f32], sample_rate: u32) -> std::io::Result<()> {
    let block_align = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);
    let frames = samples.len() / NUM_CHANNELS as usize;
    let data_size = frames as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, sample_rate, block_align)?;
    write_data_chunk(w, &samples[..frames * NUM_CHANNELS as usize], data_size)
}

pub fn frames_to_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44 + samples.len() * 2);
    // Writing into a Vec cannot fail
    let _ = write_wav(&mut buf, samples, sample_rate);
    buf
}

/// Scale to 16 bits, clamping what the mixer leaves outside [-1, 1].
pub fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(w: &mut impl Write, sample_rate: u32, block_align: u16) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&NUM_CHANNELS.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&BITS_PER_SAMPLE.to_le_bytes())
}

fn write_data_chunk(w: &mut impl Write, samples: &[f32], data_size: u32) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for &s in samples {
        w.write_all(&to_i16(s).to_le_bytes())?;
    }
    Ok(())
}
