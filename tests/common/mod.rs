//! Synthesized AON module images shared by the integration tests.

#![allow(dead_code)]

const HEADER_LEN: usize = 46;

/// Builds an in-memory AON file chunk by chunk.
pub struct Image {
    bytes: Vec<u8>,
}

impl Image {
    pub fn new(magic: &[u8; 4], author: &str) -> Self {
        let mut bytes = magic.to_vec();
        let mut field = [0u8; HEADER_LEN - 4];
        field[..author.len()].copy_from_slice(author.as_bytes());
        bytes.extend_from_slice(&field);
        Self { bytes }
    }

    pub fn chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(tag);
        self.bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// One packed pattern cell: note, instrument, effect, argument.
#[derive(Clone, Copy)]
pub struct Cell {
    pub row: usize,
    pub channel: usize,
    pub bytes: [u8; 4],
}

pub fn cell(row: usize, channel: usize, note: u8, instrument: u8, effect: u8, arg: u8) -> Cell {
    Cell {
        row,
        channel,
        bytes: [note, instrument, effect, arg],
    }
}

/// Sample instrument on waveform 0 looping all of its 128 words.
fn sample_record() -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[1] = 64;
    raw[8..12].copy_from_slice(&128u32.to_be_bytes());
    raw[16..20].copy_from_slice(&128u32.to_be_bytes());
    raw
}

/// Synth instrument stepping through eight 16-word entries of waveform 1.
fn synth_record() -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[0] = 1;
    raw[1] = 48;
    raw[3] = 1;
    raw[4] = 16;
    raw[10] = 0x34;
    raw[11] = 3;
    raw[13] = 2;
    raw[14] = 8;
    raw[15] = 2;
    raw[16] = 6;
    raw[17] = 2;
    raw[28..32].copy_from_slice(&[16, 24, 40, 2]);
    raw
}

fn square() -> Vec<u8> {
    (0..256).map(|i| if (i / 32) % 2 == 0 { 0x50 } else { 0xB0 }).collect()
}

fn saw() -> Vec<u8> {
    (0..256).map(|i| ((i % 32) * 8) as u8 ^ 0x80).collect()
}

/// A module with one pattern per entry of `patterns`, played in order.
pub fn module(magic: &[u8; 4], patterns: &[&[Cell]]) -> Vec<u8> {
    let channels = if magic == b"AON8" { 8 } else { 4 };
    let mut patt = vec![0u8; patterns.len() * 64 * channels * 4];
    for (p, cells) in patterns.iter().enumerate() {
        for c in cells.iter() {
            let at = ((p * 64 + c.row) * channels + c.channel) * 4;
            patt[at..at + 4].copy_from_slice(&c.bytes);
        }
    }
    let positions: Vec<u8> = (0..patterns.len() as u8).collect();
    let mut inst = sample_record().to_vec();
    inst.extend_from_slice(&synth_record());
    let wlen: Vec<u8> = [256u32, 256].iter().flat_map(|l| l.to_be_bytes()).collect();
    let mut wave = square();
    wave.extend(saw());

    Image::new(magic, "integration")
        .chunk(b"NAME", b"test tune\0")
        .chunk(b"INFO", &[1, positions.len() as u8, 0])
        .chunk(b"ARPG", &[0x30, 0x47, 0, 0].repeat(16))
        .chunk(b"PLST", &positions)
        .chunk(b"PATT", &patt)
        .chunk(b"INST", &inst)
        .chunk(b"INAM", &[b'x'; 64])
        .chunk(b"WLEN", &wlen)
        .chunk(b"WAVE", &wave)
        .build()
}

/// One pattern at speed 3 with a sample note on channel 0.
pub fn simple(magic: &[u8; 4]) -> Vec<u8> {
    module(magic, &[&[cell(0, 0, 25, 1, 0x0F, 3)]])
}

/// Two patterns touching slides, vibrato, portamento, retrigger, note
/// delay, pattern loop, synth instruments and a pattern break.
pub fn busy(magic: &[u8; 4]) -> Vec<u8> {
    let first = [
        cell(0, 0, 25, 1, 0x00, 0x47),
        cell(0, 1, 37, 2, 0x04, 0x46),
        cell(0, 2, 13, 1, 0x0E, 0x93),
        cell(0, 3, 30, 2, 0x1F, 0x28),
        cell(4, 0, 0, 0, 0x01, 0x04),
        cell(8, 0, 32, 0, 0x03, 0x08),
        cell(8, 1, 0, 0, 0x0A, 0x02),
        cell(12, 2, 20, 1, 0x0E, 0xD2),
        cell(16, 3, 0, 0, 0x0E, 0x60),
        cell(20, 3, 0, 0, 0x0E, 0x62),
        cell(24, 0, 40, 1, 0x09, 0x01),
        cell(24, 1, 0, 0, 0x12, 0x03),
        cell(28, 1, 25, 2, 0x11, 0x01),
        cell(32, 2, 0, 0, 0x15, 0x04),
        cell(36, 0, 18, 1, 0x0E, 0xC3),
        cell(40, 1, 0, 0, 0x1C, 0x20),
        cell(44, 2, 44, 1, 0x1E, 0x01),
        cell(48, 0, 0, 0, 0x0F, 0x96),
        cell(56, 3, 0, 0, 0x0D, 0x10),
    ];
    let second = [
        cell(0, 0, 27, 2, 0x0E, 0xE1),
        cell(0, 1, 34, 1, 0x1A, 0x01),
        cell(16, 0, 0, 0, 0x0B, 0x00),
    ];
    module(magic, &[&first, &second])
}
