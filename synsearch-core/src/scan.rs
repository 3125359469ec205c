//! Finding archives under a directory and scanning them one per step.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::archive::ArchiveKind;
use crate::config::IndexPolicy;
use crate::error::{IndexError, Result};
use crate::index::indexer::{IndexedPackage, index_archive};
use crate::probe::ImportProbe;

#[derive(Clone, Debug)]
pub struct ScanPattern {
    pub pattern: Pattern,
    pub kind: ArchiveKind,
    pub full_text: bool,
}

impl ScanPattern {
    pub fn new(glob: &str, kind: ArchiveKind, full_text: bool) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::new(glob)?,
            kind,
            full_text,
        })
    }

    /// Matches against the file name only.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.pattern.matches(n))
    }
}

/// Outcome of one step of a [`ScanTask`].
#[derive(Debug)]
pub struct FileScan {
    pub path: PathBuf,
    pub kind: ArchiveKind,
    pub result: Result<IndexedPackage>,
}

/// Lazy, finite, non-restartable: each `next` scans exactly one archive.
/// Archive errors are carried in [`FileScan::result`] and never end the task.
pub struct ScanTask<'a> {
    files: std::vec::IntoIter<PathBuf>,
    kind: ArchiveKind,
    full_text: bool,
    policy: &'a IndexPolicy,
    probe: &'a dyn ImportProbe,
}

impl<'a> ScanTask<'a> {
    pub fn new(
        files: Vec<PathBuf>,
        pattern: &ScanPattern,
        policy: &'a IndexPolicy,
        probe: &'a dyn ImportProbe,
    ) -> Self {
        Self {
            files: files.into_iter(),
            kind: pattern.kind,
            full_text: pattern.full_text,
            policy,
            probe,
        }
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for ScanTask<'_> {
    type Item = FileScan;

    fn next(&mut self) -> Option<FileScan> {
        let path = self.files.next()?;
        info!("Scanning {}", path.display());
        let result = index_archive(&path, self.kind, self.policy, self.full_text, self.probe);
        if let Err(e) = &result {
            warn!(error = %e, "failed to index {}", path.display());
        }
        Some(FileScan {
            path,
            kind: self.kind,
            result,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

/// Every regular file under `dir`, recursively, in a stable order.
pub fn archive_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IndexError::PathNotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// One task per pattern, each over the files it matches under `dir`.
pub fn plan<'a>(
    dir: &Path,
    patterns: &[ScanPattern],
    policy: &'a IndexPolicy,
    probe: &'a dyn ImportProbe,
) -> Result<Vec<ScanTask<'a>>> {
    let files = archive_files(dir)?;
    let tasks = patterns
        .iter()
        .map(|p| {
            let matched: Vec<PathBuf> = files.iter().filter(|f| p.matches(f)).cloned().collect();
            info!(
                pattern = p.pattern.as_str(),
                count = matched.len(),
                "matched archives under {}",
                dir.display()
            );
            ScanTask::new(matched, p, policy, probe)
        })
        .collect();
    Ok(tasks)
}
