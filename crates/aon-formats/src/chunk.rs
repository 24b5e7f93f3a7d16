//! IFF-style chunk walking.

use binrw::io::Cursor;
use binrw::{BinRead, BinReaderExt};

use crate::ParseError;

/// Tag (4 bytes) plus big-endian payload length (4 bytes).
pub const CHUNK_HEADER_LEN: usize = 8;

/// Four-character chunk identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

#[derive(BinRead, Debug)]
#[br(big)]
struct ChunkHeader {
    tag: [u8; 4],
    length: u32,
}

/// One chunk borrowed from the module data.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Chunk<'a> {
    pub tag: ChunkTag,
    /// Offset of the chunk header in the file
    pub offset: usize,
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    pub fn truncated(&self) -> ParseError {
        ParseError::TruncatedChunk {
            tag: self.tag,
            offset: self.offset,
        }
    }
}

/// Iterates over the chunks following the file header.
///
/// Stops quietly when fewer than 8 bytes remain; a chunk whose declared
/// length runs past the end yields `TruncatedChunk` and ends the walk.
pub(crate) struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self { data, pos: start }
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let header_bytes = self.data.get(offset..offset.checked_add(CHUNK_HEADER_LEN)?)?;
        let header: ChunkHeader = match Cursor::new(header_bytes).read_be() {
            Ok(header) => header,
            Err(_) => {
                self.pos = self.data.len();
                return Some(Err(ParseError::TruncatedChunk {
                    tag: ChunkTag([0; 4]),
                    offset,
                }));
            }
        };

        let tag = ChunkTag(header.tag);
        let start = offset + CHUNK_HEADER_LEN;
        let end = match start.checked_add(header.length as usize) {
            Some(end) if end <= self.data.len() => end,
            _ => {
                self.pos = self.data.len();
                return Some(Err(ParseError::TruncatedChunk { tag, offset }));
            }
        };

        self.pos = end;
        Some(Ok(Chunk {
            tag,
            offset,
            payload: &self.data[start..end],
        }))
    }
}
