pub mod gzip;
pub mod tar;
pub mod zipfile;

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use tar::TarEntries;
use zipfile::ZipEntries;

/// One raw archive member. Consumed by the indexer and then dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// gzip-compressed tar, one `pathname` member per asset
    UnityPackage,
    Zip,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("unitypackage") {
            Some(Self::UnityPackage)
        } else if ext.eq_ignore_ascii_case("zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UnityPackage => "unitypackage",
            Self::Zip => "zip",
        }
    }
}

/// Entry stream over either archive flavour.
pub enum Entries {
    Tar(TarEntries<Cursor<Vec<u8>>>),
    Zip(ZipEntries<BufReader<File>>),
}

impl Iterator for Entries {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::Tar(t) => t.next(),
            Entries::Zip(z) => z.next(),
        }
    }
}

/// Inflates a whole `.unitypackage` stream and returns its tar entries.
pub fn read_unitypackage<R: Read>(src: R) -> Result<TarEntries<Cursor<Vec<u8>>>> {
    let tar = gzip::inflate(src)?;
    Ok(TarEntries::new(Cursor::new(tar)))
}

/// Opens an archive file. The file handle lives as long as the returned
/// iterator (zip) or only until the gzip stream is inflated (tar).
pub fn open(path: &Path, kind: ArchiveKind) -> Result<Entries> {
    let f = File::open(path)?;
    match kind {
        ArchiveKind::UnityPackage => Ok(Entries::Tar(read_unitypackage(BufReader::new(f))?)),
        ArchiveKind::Zip => Ok(Entries::Zip(ZipEntries::new(BufReader::new(f))?)),
    }
}

/// Hex BLAKE3 of the file contents.
pub fn fingerprint(path: &Path) -> Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut f, &mut hasher)?;
    Ok(hex::encode(hasher.finalize().as_bytes()))
}

pub(crate) fn format_err(what: &str, e: impl std::fmt::Display) -> IndexError {
    IndexError::ArchiveFormat(format!("{what}: {e}"))
}
