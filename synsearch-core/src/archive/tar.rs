//! Minimal POSIX tar walker.
//!
//! Only the fields the indexer needs are decoded: the entry name (plus the
//! ustar prefix when present) and the payload size. Everything else in the
//! header record is skipped.

use std::io::{self, Read};
use std::iter::FusedIterator;

use super::{ArchiveEntry, format_err};
use crate::error::{IndexError, Result};

pub const BLOCK_SIZE: usize = 512;

pub const NAME_OFFSET: usize = 0;
pub const NAME_LEN: usize = 100;
// mode(8) + uid(8) + gid(8) sit between name and size
pub const SIZE_OFFSET: usize = NAME_OFFSET + NAME_LEN + 24;
pub const SIZE_LEN: usize = 12;
pub const MAGIC_OFFSET: usize = 257;
pub const USTAR_MAGIC: &[u8; 5] = b"ustar";
pub const PREFIX_OFFSET: usize = 345;
pub const PREFIX_LEN: usize = 155;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TarHeader {
    pub name: String,
    pub size: u64,
}

impl TarHeader {
    /// Zero bytes between the end of this entry's payload and the next header.
    pub fn padding(&self) -> u64 {
        let block = BLOCK_SIZE as u64;
        (block - self.size % block) % block
    }
}

/// Decodes one 512-byte header record.
///
/// Returns `Ok(None)` for the end-of-archive marker (an empty name, which
/// covers the all-zero trailer blocks).
pub fn parse_header(block: &[u8; BLOCK_SIZE]) -> Result<Option<TarHeader>> {
    let name = field_str(&block[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
    if name.is_empty() {
        return Ok(None);
    }
    let size = parse_size(&block[SIZE_OFFSET..SIZE_OFFSET + SIZE_LEN])
        .map_err(|e| format_err(&format!("tar header `{name}`"), e))?;

    let name = if &block[MAGIC_OFFSET..MAGIC_OFFSET + USTAR_MAGIC.len()] == USTAR_MAGIC {
        let prefix = field_str(&block[PREFIX_OFFSET..PREFIX_OFFSET + PREFIX_LEN]);
        if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        }
    } else {
        name
    };

    Ok(Some(TarHeader { name, size }))
}

fn field_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
        .trim_matches(|c| c == ' ' || c == '\0')
        .to_string()
}

/// Octal ASCII size, or GNU base-256 when the high bit of the first byte is set.
fn parse_size(field: &[u8]) -> std::result::Result<u64, String> {
    if field[0] & 0x80 != 0 {
        if field[0] == 0xff {
            return Err("negative size".into());
        }
        let mut v = u64::from(field[0] & 0x7f);
        for &b in &field[1..] {
            v = v
                .checked_mul(256)
                .and_then(|v| v.checked_add(u64::from(b)))
                .ok_or("size overflows u64")?;
        }
        return Ok(v);
    }

    let text = field_str(field);
    if text.is_empty() {
        return Err("empty size field".into());
    }
    u64::from_str_radix(&text, 8).map_err(|e| format!("bad octal size {text:?}: {e}"))
}

/// Forward-only entry sequence over a raw (already decompressed) tar stream.
///
/// Stops at the first empty-name header or at a clean end of stream on a
/// record boundary. After an error nothing more is yielded.
pub struct TarEntries<R> {
    inner: R,
    done: bool,
}

impl<R: Read> TarEntries<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    fn read_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        let mut block = [0u8; BLOCK_SIZE];
        if !read_block(&mut self.inner, &mut block)? {
            return Ok(None);
        }
        let Some(header) = parse_header(&block)? else {
            return Ok(None);
        };

        let mut data = Vec::new();
        (&mut self.inner)
            .take(header.size)
            .read_to_end(&mut data)?;
        if data.len() as u64 != header.size {
            return Err(IndexError::ArchiveFormat(format!(
                "tar entry `{}` truncated: {} of {} bytes",
                header.name,
                data.len(),
                header.size
            )));
        }

        // A short final padding just means the stream ends here; the next
        // header read reports a clean end.
        io::copy(&mut (&mut self.inner).take(header.padding()), &mut io::sink())?;

        Ok(Some(ArchiveEntry {
            name: header.name,
            data,
        }))
    }
}

impl<R: Read> Iterator for TarEntries<R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_entry() {
            Ok(Some(e)) => Some(Ok(e)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for TarEntries<R> {}

/// Fills `buf` completely. `Ok(false)` when the stream was already exhausted.
fn read_block<R: Read>(r: &mut R, buf: &mut [u8; BLOCK_SIZE]) -> Result<bool> {
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(false),
        BLOCK_SIZE => Ok(true),
        n => Err(IndexError::ArchiveFormat(format!(
            "tar header truncated: {n} of {BLOCK_SIZE} bytes"
        ))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn header(name: &str, size: usize) -> [u8; BLOCK_SIZE] {
        let mut h = [0u8; BLOCK_SIZE];
        h[..name.len()].copy_from_slice(name.as_bytes());
        h[100..108].copy_from_slice(b"0000644\0");
        h[108..116].copy_from_slice(b"0000000\0");
        h[116..124].copy_from_slice(b"0000000\0");
        let size = format!("{size:011o}\0");
        h[124..136].copy_from_slice(size.as_bytes());
        h[257..263].copy_from_slice(b"ustar\0");
        h
    }

    pub(crate) fn tar_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, data) in entries {
            out.extend_from_slice(&header(name, data.len()));
            out.extend_from_slice(data);
            let pad = (BLOCK_SIZE - data.len() % BLOCK_SIZE) % BLOCK_SIZE;
            out.resize(out.len() + pad, 0);
        }
        out.resize(out.len() + 2 * BLOCK_SIZE, 0);
        out
    }

    fn collect(bytes: Vec<u8>) -> Vec<Result<ArchiveEntry>> {
        TarEntries::new(Cursor::new(bytes)).collect()
    }

    #[test]
    fn yields_entries_in_order_with_declared_sizes() {
        let big = vec![b'x'; 1300];
        let tar = tar_of(&[
            ("a/asset", b"hello".as_slice()),
            ("a/pathname", b"Assets/Pkg/A.prefab\n00".as_slice()),
            ("b/asset", big.as_slice()),
        ]);
        let got: Vec<_> = collect(tar).into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].name, "a/asset");
        assert_eq!(got[0].data, b"hello");
        assert_eq!(got[1].name, "a/pathname");
        assert_eq!(got[2].data.len(), 1300);
    }

    #[test]
    fn zero_size_entry_resumes_at_next_block() {
        let tar = tar_of(&[("empty", b"".as_slice()), ("next", b"abc".as_slice())]);
        let got: Vec<_> = collect(tar).into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(got.len(), 2);
        assert!(got[0].data.is_empty());
        assert_eq!(got[1].name, "next");
        assert_eq!(got[1].data, b"abc");
    }

    #[test]
    fn block_aligned_payload_has_no_padding() {
        let exact = vec![1u8; BLOCK_SIZE];
        let tar = tar_of(&[("exact", exact.as_slice()), ("after", b"z".as_slice())]);
        let got: Vec<_> = collect(tar).into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(got[0].data.len(), BLOCK_SIZE);
        assert_eq!(got[1].name, "after");
    }

    #[test]
    fn stops_at_end_of_stream_without_trailer() {
        let mut tar = header("only", 3).to_vec();
        tar.extend_from_slice(b"abc");
        tar.resize(BLOCK_SIZE * 2, 0);
        let got = collect(tar);
        assert_eq!(got.len(), 1);

        assert!(collect(Vec::new()).is_empty());
    }

    #[test]
    fn truncated_payload_is_a_format_error() {
        let mut tar = header("cut", 100).to_vec();
        tar.extend_from_slice(&[0u8; 10]);
        let got = collect(tar);
        assert_eq!(got.len(), 1);
        assert!(matches!(got[0], Err(IndexError::ArchiveFormat(_))));
    }

    #[test]
    fn truncated_header_is_a_format_error() {
        let tar = header("half", 0)[..200].to_vec();
        let got = collect(tar);
        assert!(matches!(got[..], [Err(IndexError::ArchiveFormat(_))]));
    }

    #[test]
    fn bad_octal_size_is_rejected() {
        let mut h = header("bad", 0);
        h[124..136].copy_from_slice(b"0000000009z\0");
        assert!(matches!(
            parse_header(&h),
            Err(IndexError::ArchiveFormat(_))
        ));
    }

    #[test]
    fn size_field_padding_is_trimmed() {
        let mut h = header("spaced", 0);
        h[124..136].copy_from_slice(b"     17 \0\0\0\0");
        assert_eq!(parse_header(&h).unwrap().unwrap().size, 0o17);
    }

    #[test]
    fn gnu_base256_size() {
        let mut h = header("huge", 0);
        h[124..136].copy_from_slice(&[0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x00]);
        assert_eq!(parse_header(&h).unwrap().unwrap().size, 512);
    }

    #[test]
    fn ustar_prefix_is_joined() {
        let mut h = header("pathname", 0);
        h[PREFIX_OFFSET..PREFIX_OFFSET + 4].copy_from_slice(b"0a1b");
        assert_eq!(parse_header(&h).unwrap().unwrap().name, "0a1b/pathname");
    }

    #[test]
    fn empty_name_ends_archive() {
        assert_eq!(parse_header(&[0u8; BLOCK_SIZE]).unwrap(), None);
    }
}
