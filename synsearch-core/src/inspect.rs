use std::path::Path;

use crate::archive::{self, ArchiveKind};
use crate::config::IndexPolicy;
use crate::domain::EntryRow;
use crate::error::{IndexError, Result};
use crate::index::paths::pathname_payload;

/// Raw entries of one archive, in archive order. Tar members named with the
/// policy's path marker also get their decoded asset path.
pub fn inspect(path: &Path, policy: &IndexPolicy) -> Result<Vec<EntryRow>> {
    let kind = ArchiveKind::from_path(path).ok_or_else(|| {
        IndexError::ArchiveFormat(format!("unsupported archive: {}", path.display()))
    })?;
    let mut rows = Vec::new();
    for entry in archive::open(path, kind)? {
        let entry = entry?;
        let asset_path = (kind == ArchiveKind::UnityPackage
            && entry.name.ends_with(&policy.path_marker))
        .then(|| pathname_payload(&entry.data));
        rows.push(EntryRow {
            size: entry.data.len() as u64,
            name: entry.name,
            asset_path,
        });
    }
    Ok(rows)
}
