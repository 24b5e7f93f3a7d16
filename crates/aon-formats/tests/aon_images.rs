//! Integration tests for the AON loader against synthesized module images.

use aon_formats::{load_aon, ChunkTag, ParseError, HEADER_LEN};
use aon_ir::{Effect, InstrumentKind, WaveLoopControl};

/// Builds an in-memory AON file chunk by chunk.
struct Image {
    bytes: Vec<u8>,
}

impl Image {
    fn new(magic: &[u8; 4], author: &str) -> Self {
        let mut bytes = magic.to_vec();
        let mut field = [0u8; HEADER_LEN - 4];
        field[..author.len()].copy_from_slice(author.as_bytes());
        bytes.extend_from_slice(&field);
        Self { bytes }
    }

    fn chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(tag);
        self.bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn sample_record(waveform: u8, volume: u8, length_words: u32) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[1] = volume;
    raw[3] = waveform;
    raw[8..12].copy_from_slice(&length_words.to_be_bytes());
    raw[16..20].copy_from_slice(&length_words.to_be_bytes());
    raw
}

fn synth_record(waveform: u8) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[0] = 1;
    raw[1] = 64;
    raw[3] = waveform;
    raw[4] = 16;
    raw[13] = 2;
    raw[14] = 4;
    raw[16] = 4;
    raw[17] = 1;
    raw[28..32].copy_from_slice(&[0, 8, 32, 2]);
    raw
}

fn lengths(lens: &[u32]) -> Vec<u8> {
    lens.iter().flat_map(|l| l.to_be_bytes()).collect()
}

/// A well-formed module with the given counts.
fn module(magic: &[u8; 4], patterns: usize, instruments: usize, waveforms: usize) -> Vec<u8> {
    let channels = if magic == b"AON8" { 8 } else { 4 };
    let mut patt = vec![0u8; patterns * 64 * channels * 4];
    // pattern 0, row 0, channel 0: note 25, instrument 1, set speed 3
    if patterns > 0 {
        patt[..4].copy_from_slice(&[25, 1, 0x0F, 3]);
    }
    let inst: Vec<u8> = (0..instruments)
        .flat_map(|i| {
            if i % 2 == 0 {
                sample_record(0, 64, 32)
            } else {
                synth_record(0)
            }
        })
        .collect();
    let wlen = lengths(&vec![64; waveforms]);
    let wave = vec![0x40u8; 64 * waveforms];

    Image::new(magic, "tracker v1")
        .chunk(b"NAME", b"test tune\0\0\0")
        .chunk(b"INFO", &[1, 2, 0])
        .chunk(b"ARPG", &[0x30, 0x47, 0, 0].repeat(16))
        .chunk(b"PLST", &[0, 0])
        .chunk(b"PATT", &patt)
        .chunk(b"INST", &inst)
        .chunk(b"WLEN", &wlen)
        .chunk(b"WAVE", &wave)
        .build()
}

#[test]
fn aon4_chunk_counts_round_trip() {
    let song = load_aon(&module(b"AON4", 3, 5, 2)).unwrap();
    assert_eq!(song.channels, 4);
    assert_eq!(song.patterns.len(), 3);
    assert_eq!(song.instruments.len(), 5);
    assert_eq!(song.waveforms.len(), 2);
    assert_eq!(song.positions, vec![0, 0]);
    assert!(song.waveforms.iter().all(|w| w.len() == 64));
}

#[test]
fn aon8_has_eight_channel_patterns() {
    let song = load_aon(&module(b"AON8", 2, 1, 1)).unwrap();
    assert_eq!(song.channels, 8);
    assert_eq!(song.patterns.len(), 2);
    assert!(song.patterns.iter().all(|p| p.channels == 8 && p.data.len() == 64 * 8));
}

#[test]
fn first_cell_is_decoded() {
    let song = load_aon(&module(b"AON4", 1, 1, 1)).unwrap();
    let cell = song.cell(0, 0, 0).unwrap();
    assert_eq!(cell.note, 25);
    assert_eq!(cell.instrument, 1);
    assert_eq!(cell.effect_code(), Some(Effect::SetSpeed));
    assert_eq!(cell.argument, 3);
    assert!(song.cell(0, 1, 0).unwrap().is_empty());
}

#[test]
fn instrument_variants_follow_type_byte() {
    let song = load_aon(&module(b"AON4", 1, 2, 1)).unwrap();
    assert!(matches!(song.instruments[0].kind, InstrumentKind::Sample(p) if p.length == 32));
    match song.instruments[1].kind {
        InstrumentKind::Synth(p) => {
            assert_eq!(p.entry_length, 16);
            assert_eq!(p.wave_speed, 2);
            assert_eq!(p.wave_length, 4);
            assert_eq!(p.loop_control, WaveLoopControl::Backwards);
        }
        InstrumentKind::Sample(_) => panic!("expected synth"),
    }
    assert_eq!(song.instruments[1].envelope.end, 32);
}

#[test]
fn metadata_and_author_fallback() {
    let song = load_aon(&module(b"AON4", 1, 1, 1)).unwrap();
    assert_eq!(song.metadata.name, "test tune");
    assert_eq!(song.metadata.author, "tracker v1");
    assert_eq!(song.metadata.version, 1);

    let mut data = module(b"AON4", 1, 1, 1);
    let extra = Image { bytes: Vec::new() }
        .chunk(b"AUTH", b"Someone")
        .chunk(b"RMRK", b"  hello  ")
        .build();
    data.extend_from_slice(&extra);
    let song = load_aon(&data).unwrap();
    assert_eq!(song.metadata.author, "Someone");
    assert_eq!(song.metadata.remarks, "hello");
}

#[test]
fn instrument_names_are_trimmed() {
    let mut inam = [0u8; 64];
    inam[..6].copy_from_slice(b"bass  ");
    inam[32..36].copy_from_slice(b"lead");
    let mut data = module(b"AON4", 1, 2, 1);
    data.extend(Image { bytes: Vec::new() }.chunk(b"INAM", &inam).build());

    let song = load_aon(&data).unwrap();
    assert_eq!(song.instruments[0].name.as_str(), "bass");
    assert_eq!(song.instruments[1].name.as_str(), "lead");
}

#[test]
fn arpeggio_tables_are_loaded() {
    let song = load_aon(&module(b"AON4", 1, 1, 1)).unwrap();
    assert_eq!(song.arpeggios[0].offsets().as_slice(), &[0, 4, 7]);
    assert_eq!(song.arpeggios[15].offsets().as_slice(), &[0, 4, 7]);
}

#[test]
fn bad_magic_is_rejected() {
    let mut data = module(b"AON4", 1, 1, 1);
    data[..4].copy_from_slice(b"M.K.");
    assert_eq!(load_aon(&data).unwrap_err(), ParseError::BadMagic);
    assert_eq!(load_aon(b"AO").unwrap_err(), ParseError::BadMagic);
    assert_eq!(load_aon(&[]).unwrap_err(), ParseError::BadMagic);
}

#[test]
fn missing_required_chunk_is_named() {
    let data = Image::new(b"AON4", "")
        .chunk(b"INFO", &[1, 1, 0])
        .chunk(b"ARPG", &[0; 64])
        .chunk(b"PLST", &[0])
        .chunk(b"PATT", &[0; 1024])
        .chunk(b"WLEN", &[])
        .chunk(b"WAVE", &[])
        .build();
    assert_eq!(load_aon(&data).unwrap_err(), ParseError::MissingChunk("INST"));
}

#[test]
fn truncated_chunk_reports_tag_and_offset() {
    let mut data = module(b"AON4", 1, 1, 1);
    let offset = data.len();
    data.extend_from_slice(b"WAVE");
    data.extend_from_slice(&1000u32.to_be_bytes());
    data.extend_from_slice(&[0; 10]);

    assert_eq!(
        load_aon(&data).unwrap_err(),
        ParseError::TruncatedChunk { tag: ChunkTag(*b"WAVE"), offset }
    );
}

#[test]
fn short_header_is_truncated() {
    assert!(matches!(
        load_aon(b"AON4short"),
        Err(ParseError::TruncatedChunk { offset: 0, .. })
    ));
}

#[test]
fn unknown_chunks_are_skipped() {
    let data = module(b"AON4", 1, 1, 1);
    let (header, rest) = data.split_at(HEADER_LEN);
    let mut patched = header.to_vec();
    patched.extend(Image { bytes: Vec::new() }.chunk(b"XTRA", &[9; 17]).build());
    patched.extend_from_slice(rest);

    let song = load_aon(&patched).unwrap();
    assert_eq!(song.patterns.len(), 1);
}

#[test]
fn restart_position_is_clamped() {
    let data = Image::new(b"AON4", "")
        .chunk(b"INFO", &[1, 3, 9])
        .chunk(b"ARPG", &[0; 64])
        .chunk(b"PLST", &[0, 0, 0])
        .chunk(b"PATT", &[0; 1024])
        .chunk(b"INST", &[])
        .chunk(b"WLEN", &[])
        .chunk(b"WAVE", &[])
        .build();
    let song = load_aon(&data).unwrap();
    assert_eq!(song.restart_position, 2);
}

#[test]
fn empty_position_list_is_rejected() {
    let data = Image::new(b"AON4", "")
        .chunk(b"INFO", &[1, 0, 0])
        .chunk(b"ARPG", &[0; 64])
        .chunk(b"PLST", &[0, 0])
        .chunk(b"PATT", &[0; 1024])
        .chunk(b"INST", &[])
        .chunk(b"WLEN", &[])
        .chunk(b"WAVE", &[])
        .build();
    assert_eq!(load_aon(&data).unwrap_err(), ParseError::EmptySong);
}

#[test]
fn short_info_chunk_is_truncated() {
    let data = Image::new(b"AON4", "")
        .chunk(b"INFO", &[1])
        .chunk(b"ARPG", &[0; 64])
        .chunk(b"PLST", &[0])
        .chunk(b"PATT", &[])
        .chunk(b"INST", &[])
        .chunk(b"WLEN", &[])
        .chunk(b"WAVE", &[])
        .build();
    assert!(matches!(
        load_aon(&data),
        Err(ParseError::TruncatedChunk { tag: ChunkTag(t), .. }) if &t == b"INFO"
    ));
}

#[test]
fn partial_pattern_data_is_floored() {
    let data = Image::new(b"AON4", "")
        .chunk(b"INFO", &[1, 1, 0])
        .chunk(b"ARPG", &[0; 64])
        .chunk(b"PLST", &[0])
        .chunk(b"PATT", &[0; 1024 + 1000])
        .chunk(b"INST", &[0; 32 + 31])
        .chunk(b"WLEN", &lengths(&[2, 2]))
        .chunk(b"WAVE", &[1, 2, 3, 4])
        .build();
    let song = load_aon(&data).unwrap();
    assert_eq!(song.patterns.len(), 1);
    assert_eq!(song.instruments.len(), 1);
    assert_eq!(song.waveforms.len(), 2);
}
