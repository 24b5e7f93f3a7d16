//! Art of Noise module loader.
//!
//! Parses AON4/AON8 chunked files into the song model.

mod aon_format;
mod chunk;

use core::fmt;

pub use aon_format::{load_aon, HEADER_LEN};
pub use chunk::{ChunkTag, CHUNK_HEADER_LEN};

/// Error type for module parsing.
///
/// A load either produces a complete [`aon_ir::Song`] or one of these;
/// no partially loaded song is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The file does not start with `AON4` or `AON8`
    #[error("not an Art of Noise module (expected AON4 or AON8 magic)")]
    BadMagic,
    /// A chunk (or the file header) extends past the end of the data
    #[error("chunk {tag} at offset {offset} runs past the end of the data")]
    TruncatedChunk { tag: ChunkTag, offset: usize },
    /// A chunk every module must carry was not found
    #[error("required chunk {0} is missing")]
    MissingChunk(&'static str),
    /// The position list has no entries
    #[error("module has an empty position list")]
    EmptySong,
    /// Module data could not be allocated
    #[error("out of memory while loading module data")]
    AllocationFailure,
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
