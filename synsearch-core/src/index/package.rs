use std::path::PathBuf;

use super::table::{AssetRecord, AssetTable};
use crate::probe::ImportProbe;

/// One scanned package as the catalog keeps it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageCatalogEntry {
    pub name: String,
    pub source_path: PathBuf,
    pub assets: AssetTable,
    /// Derived through an `ImportProbe`, never read from the archive.
    pub is_imported: bool,
    /// Set by the host; keeps `is_imported` on whatever the probe says.
    pub marked_imported: bool,
    /// Hex BLAKE3 of the archive at scan time.
    pub fingerprint: Option<String>,
}

impl PackageCatalogEntry {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>, assets: AssetTable) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            assets,
            is_imported: false,
            marked_imported: false,
            fingerprint: None,
        }
    }

    pub fn first_asset(&self) -> Option<&AssetRecord> {
        self.assets.first()
    }

    pub fn mark_imported(&mut self) {
        self.marked_imported = true;
        self.is_imported = true;
    }

    /// Re-evaluates `is_imported` from the first discovered asset.
    pub fn refresh_imported(&mut self, probe: &dyn ImportProbe) -> bool {
        self.is_imported = self.marked_imported
            || self
                .first_asset()
                .is_some_and(|a| probe.is_asset_present(&self.name, &a.relative_path));
        self.is_imported
    }
}
