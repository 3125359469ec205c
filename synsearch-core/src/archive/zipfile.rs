use std::io::{Read, Seek};
use std::iter::FusedIterator;

use zip::ZipArchive;

use super::{ArchiveEntry, format_err};
use crate::error::Result;

/// Lazily reads zip members in central-directory order, one whole member
/// per step. Directory members are skipped.
pub struct ZipEntries<R> {
    archive: ZipArchive<R>,
    next: usize,
    done: bool,
}

impl<R: Read + Seek> ZipEntries<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
            next: 0,
            done: false,
        })
    }

    /// Member count including directories.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    fn read_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        while self.next < self.archive.len() {
            let mut file = self.archive.by_index(self.next)?;
            self.next += 1;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| format_err(&format!("zip entry `{name}`"), e))?;
            return Ok(Some(ArchiveEntry { name, data }));
        }
        Ok(None)
    }
}

impl<R: Read + Seek> Iterator for ZipEntries<R> {
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

impl<R: Read + Seek> FusedIterator for ZipEntries<R> {}
