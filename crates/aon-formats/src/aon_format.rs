//! Art of Noise (AON4/AON8) module parser.

use binrw::io::Cursor;
use binrw::{BinRead, BinReaderExt};
use tracing::{debug, warn};

use aon_ir::{
    ArpeggioTable, Envelope, Instrument, InstrumentKind, Pattern, SampleParams, Song, SongMetadata,
    SynthParams, TrackCell, VibratoWaveform, WaveLoopControl, Waveform, ARPEGGIO_TABLES,
    ROWS_PER_PATTERN,
};

use crate::chunk::{Chunk, ChunkReader, ChunkTag};
use crate::ParseError;

/// Magic (4 bytes) plus the author/tool text field (42 bytes).
pub const HEADER_LEN: usize = 46;

const INST_RECORD_LEN: usize = 32;
const INAM_RECORD_LEN: usize = 32;
const ARPG_RECORD_LEN: usize = 4;
const CELL_LEN: usize = 4;

/// One 32-byte INST entry. The 24-byte body is decoded according to `kind`.
#[derive(BinRead, Debug)]
#[br(big)]
struct InstrumentRecord {
    kind: u8,
    volume: u8,
    fine_tune: u8,
    waveform: u8,
    body: [u8; 24],
    envelope: [u8; 4],
}

#[derive(BinRead, Debug)]
#[br(big)]
struct SampleBody {
    start: u32,
    length: u32,
    repeat_start: u32,
    repeat_length: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct SynthBody {
    entry_length: u8,
    #[br(pad_before = 5)]
    vibrato_param: u8,
    vibrato_delay: u8,
    vibrato_waveform: u8,
    wave_speed: u8,
    wave_length: u8,
    loop_start: u8,
    loop_length: u8,
    loop_control: u8,
}

/// Chunks found while walking the file, by tag.
#[derive(Default)]
struct ModuleChunks<'a> {
    name: Option<Chunk<'a>>,
    auth: Option<Chunk<'a>>,
    rmrk: Option<Chunk<'a>>,
    info: Option<Chunk<'a>>,
    arpg: Option<Chunk<'a>>,
    plst: Option<Chunk<'a>>,
    patt: Option<Chunk<'a>>,
    inst: Option<Chunk<'a>>,
    inam: Option<Chunk<'a>>,
    wlen: Option<Chunk<'a>>,
    wave: Option<Chunk<'a>>,
}

/// Load an AON4/AON8 module from bytes.
pub fn load_aon(data: &[u8]) -> Result<Song, ParseError> {
    let channels: u8 = match data.get(..4) {
        Some(b"AON4") => 4,
        Some(b"AON8") => 8,
        _ => return Err(ParseError::BadMagic),
    };
    if data.len() < HEADER_LEN {
        return Err(ParseError::TruncatedChunk {
            tag: ChunkTag([data[0], data[1], data[2], data[3]]),
            offset: 0,
        });
    }

    let mut chunks = ModuleChunks::default();
    for chunk in ChunkReader::new(data, HEADER_LEN) {
        let chunk = chunk?;
        let slot = match &chunk.tag.0 {
            b"NAME" => &mut chunks.name,
            b"AUTH" => &mut chunks.auth,
            b"RMRK" => &mut chunks.rmrk,
            b"INFO" => &mut chunks.info,
            b"ARPG" => &mut chunks.arpg,
            b"PLST" => &mut chunks.plst,
            b"PATT" => &mut chunks.patt,
            b"INST" => &mut chunks.inst,
            b"INAM" => &mut chunks.inam,
            b"WLEN" => &mut chunks.wlen,
            b"WAVE" => &mut chunks.wave,
            _ => {
                debug!(tag = %chunk.tag, offset = chunk.offset, "skipping unknown chunk");
                continue;
            }
        };
        // First occurrence wins
        if slot.is_none() {
            *slot = Some(chunk);
        }
    }

    let info = chunks.info.ok_or(ParseError::MissingChunk("INFO"))?;
    let arpg = chunks.arpg.ok_or(ParseError::MissingChunk("ARPG"))?;
    let plst = chunks.plst.ok_or(ParseError::MissingChunk("PLST"))?;
    let patt = chunks.patt.ok_or(ParseError::MissingChunk("PATT"))?;
    let inst = chunks.inst.ok_or(ParseError::MissingChunk("INST"))?;
    let wlen = chunks.wlen.ok_or(ParseError::MissingChunk("WLEN"))?;
    let wave = chunks.wave.ok_or(ParseError::MissingChunk("WAVE"))?;

    if info.payload.len() < 3 {
        return Err(info.truncated());
    }
    let version = info.payload[0];
    let declared_positions = info.payload[1] as usize;
    let declared_restart = info.payload[2];

    let mut song = Song::with_channels(channels);
    song.positions = parse_positions(plst.payload, declared_positions)?;
    if song.positions.is_empty() {
        return Err(ParseError::EmptySong);
    }

    let last_position = (song.positions.len() - 1) as u8;
    song.restart_position = if declared_restart > last_position {
        warn!(
            restart = declared_restart,
            positions = song.positions.len(),
            "restart position out of range, clamping"
        );
        last_position
    } else {
        declared_restart
    };

    song.arpeggios = parse_arpeggios(arpg.payload);
    song.patterns = parse_patterns(patt.payload, channels)?;
    song.instruments = parse_instruments(&inst)?;
    if let Some(inam) = chunks.inam {
        apply_instrument_names(&mut song.instruments, inam.payload);
    }
    song.waveforms = parse_waveforms(wlen.payload, wave.payload)?;

    let author = chunks
        .auth
        .map(|c| parse_string(c.payload))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| parse_string(&data[4..HEADER_LEN]));
    song.metadata = SongMetadata {
        name: chunks.name.map(|c| parse_string(c.payload)).unwrap_or_default(),
        author,
        remarks: chunks.rmrk.map(|c| parse_string(c.payload)).unwrap_or_default(),
        version,
    };

    debug!(
        channels,
        positions = song.positions.len(),
        patterns = song.patterns.len(),
        instruments = song.instruments.len(),
        waveforms = song.waveforms.len(),
        "loaded AON module"
    );

    Ok(song)
}

/// Parse a NUL-terminated, space-padded text field.
fn parse_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).trim().to_string()
}

fn parse_positions(payload: &[u8], declared: usize) -> Result<Vec<u8>, ParseError> {
    let count = declared.min(payload.len());
    let mut positions = Vec::new();
    positions
        .try_reserve_exact(count)
        .map_err(|_| ParseError::AllocationFailure)?;
    positions.extend_from_slice(&payload[..count]);
    Ok(positions)
}

/// Tables missing from a short ARPG chunk stay empty.
fn parse_arpeggios(payload: &[u8]) -> [ArpeggioTable; ARPEGGIO_TABLES] {
    let mut tables = [ArpeggioTable::default(); ARPEGGIO_TABLES];
    for (table, raw) in tables.iter_mut().zip(payload.chunks_exact(ARPG_RECORD_LEN)) {
        table.0.copy_from_slice(raw);
    }
    tables
}

fn parse_patterns(payload: &[u8], channels: u8) -> Result<Vec<Pattern>, ParseError> {
    let row_len = CELL_LEN * channels as usize;
    let pattern_len = row_len * ROWS_PER_PATTERN as usize;
    let count = payload.len() / pattern_len;

    let mut patterns = Vec::new();
    patterns
        .try_reserve_exact(count)
        .map_err(|_| ParseError::AllocationFailure)?;

    for raw in payload.chunks_exact(pattern_len) {
        let mut data = Vec::new();
        data.try_reserve_exact(pattern_len / CELL_LEN)
            .map_err(|_| ParseError::AllocationFailure)?;
        data.extend(
            raw.chunks_exact(CELL_LEN)
                .map(|b| TrackCell::from_packed([b[0], b[1], b[2], b[3]])),
        );
        patterns.push(Pattern { channels, data });
    }
    Ok(patterns)
}

fn parse_instruments(chunk: &Chunk<'_>) -> Result<Vec<Instrument>, ParseError> {
    let count = chunk.payload.len() / INST_RECORD_LEN;
    let mut instruments = Vec::new();
    instruments
        .try_reserve_exact(count)
        .map_err(|_| ParseError::AllocationFailure)?;

    for raw in chunk.payload.chunks_exact(INST_RECORD_LEN) {
        let record: InstrumentRecord = Cursor::new(raw)
            .read_be()
            .map_err(|_| chunk.truncated())?;
        instruments.push(decode_instrument(&record).map_err(|_| chunk.truncated())?);
    }
    Ok(instruments)
}

fn decode_instrument(record: &InstrumentRecord) -> binrw::BinResult<Instrument> {
    let mut body = Cursor::new(&record.body[..]);
    let kind = if record.kind == 0 {
        let s: SampleBody = body.read_be()?;
        InstrumentKind::Sample(SampleParams {
            start: s.start,
            length: s.length,
            repeat_start: s.repeat_start,
            repeat_length: s.repeat_length,
        })
    } else {
        let s: SynthBody = body.read_be()?;
        InstrumentKind::Synth(SynthParams {
            entry_length: s.entry_length,
            vibrato_param: s.vibrato_param,
            vibrato_delay: s.vibrato_delay,
            vibrato_waveform: VibratoWaveform::from_byte(s.vibrato_waveform),
            wave_speed: s.wave_speed,
            wave_length: s.wave_length,
            loop_start: s.loop_start,
            loop_length: s.loop_length,
            loop_control: WaveLoopControl::from_byte(s.loop_control),
        })
    };

    let [start, add, end, sub] = record.envelope;
    Ok(Instrument {
        name: Default::default(),
        volume: record.volume.min(64),
        fine_tune: record.fine_tune & 0x0F,
        waveform: record.waveform,
        envelope: Envelope { start, add, end, sub },
        kind,
    })
}

fn apply_instrument_names(instruments: &mut [Instrument], payload: &[u8]) {
    for (inst, raw) in instruments.iter_mut().zip(payload.chunks_exact(INAM_RECORD_LEN)) {
        inst.set_name(&parse_string(raw));
    }
}

/// Split the WAVE payload by the WLEN table. Data missing from a short
/// WAVE chunk leaves the trailing waveforms truncated or empty.
fn parse_waveforms(wlen: &[u8], wave: &[u8]) -> Result<Vec<Waveform>, ParseError> {
    let count = wlen.len() / 4;
    let mut waveforms = Vec::new();
    waveforms
        .try_reserve_exact(count)
        .map_err(|_| ParseError::AllocationFailure)?;

    let mut offset = 0usize;
    let mut short = false;
    for raw in wlen.chunks_exact(4) {
        let declared = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        let start = offset.min(wave.len());
        let end = offset.saturating_add(declared).min(wave.len());
        short |= end - start < declared;
        offset = offset.saturating_add(declared);

        let mut data = Vec::new();
        data.try_reserve_exact(end - start)
            .map_err(|_| ParseError::AllocationFailure)?;
        data.extend(wave[start..end].iter().map(|&b| b as i8));
        waveforms.push(Waveform::new(data));
    }

    if short {
        warn!(
            declared = offset,
            available = wave.len(),
            "WAVE chunk shorter than WLEN total, truncating waveforms"
        );
    }
    Ok(waveforms)
}
