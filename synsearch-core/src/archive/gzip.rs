use std::io::{Cursor, Read};

use flate2::read::GzDecoder;

use super::format_err;
use crate::error::{IndexError, Result};

pub const MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflates a complete gzip stream into memory.
///
/// The tar walker needs the whole decompressed buffer, so there is no
/// streaming variant. A bad magic, a truncated deflate stream or a CRC/size
/// mismatch in the trailer all surface as `ArchiveFormat`.
pub fn inflate<R: Read>(mut src: R) -> Result<Vec<u8>> {
    let mut magic = [0u8; 2];
    src.read_exact(&mut magic)
        .map_err(|e| format_err("gzip header", e))?;
    if magic != MAGIC {
        return Err(IndexError::ArchiveFormat(format!(
            "not a gzip stream (magic {:02x}{:02x})",
            magic[0], magic[1]
        )));
    }

    let mut dec = GzDecoder::new(Cursor::new(magic).chain(src));
    let mut out = Vec::new();
    dec.read_to_end(&mut out).map_err(|e| format_err("gzip", e))?;
    Ok(out)
}
