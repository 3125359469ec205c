use std::path::Path;

use tracing::{debug, warn};

use super::package::PackageCatalogEntry;
use super::paths::{asset_name, pathname_payload, split_package, under_asset_root};
use super::table::AssetTable;
use super::terms::SearchTermIndex;
use super::tokenize::tokenize_with;
use crate::archive::{self, ArchiveEntry, ArchiveKind};
use crate::config::IndexPolicy;
use crate::error::{IndexError, Result};
use crate::probe::ImportProbe;

/// Result of indexing one archive.
#[derive(Clone, Debug)]
pub struct IndexedPackage {
    pub entry: PackageCatalogEntry,
    /// Present when the scan asked for full-text indexing.
    pub terms: Option<SearchTermIndex>,
    /// Asset names dropped because an earlier record already used them.
    pub duplicates: Vec<String>,
}

/// Per-archive state threaded through one indexing call.
struct Accumulator<'p> {
    policy: &'p IndexPolicy,
    kind: ArchiveKind,
    full_text: bool,
    package_name: Option<String>,
    assets: AssetTable,
    terms: SearchTermIndex,
    duplicates: Vec<String>,
}

impl<'p> Accumulator<'p> {
    fn new(policy: &'p IndexPolicy, kind: ArchiveKind, full_text: bool) -> Self {
        Self {
            policy,
            kind,
            full_text,
            package_name: None,
            assets: AssetTable::new(),
            terms: SearchTermIndex::default(),
            duplicates: Vec::new(),
        }
    }

    fn asset_path(&self, entry: ArchiveEntry) -> Option<String> {
        match self.kind {
            ArchiveKind::UnityPackage => entry
                .name
                .ends_with(&self.policy.path_marker)
                .then(|| pathname_payload(&entry.data)),
            ArchiveKind::Zip => Some(entry.name),
        }
    }

    fn accept(&mut self, asset_path: &str) {
        if !asset_path.ends_with(&self.policy.prefab_extension) {
            return;
        }
        let under_root = under_asset_root(asset_path, &self.policy.asset_root, self.kind);
        let Some((package, relative)) = split_package(under_root) else {
            warn!(path = asset_path, "prefab outside any package folder, skipping");
            return;
        };
        if self.package_name.is_none() {
            debug!(package, "package name from first prefab");
            self.package_name = Some(package.to_owned());
        }

        let name = asset_name(relative);
        match self.assets.insert(name, relative) {
            Some(ordinal) => {
                if self.full_text {
                    for word in tokenize_with(name, self.policy.min_word_len) {
                        self.terms.add(word, ordinal);
                    }
                }
            }
            None => {
                warn!(asset = name, path = asset_path, "duplicate asset name");
                self.duplicates.push(name.to_owned());
            }
        }
    }

    fn finish(self, source_path: &Path, probe: &dyn ImportProbe) -> Result<IndexedPackage> {
        let Some(name) = self.package_name else {
            return Err(IndexError::NoPrefabs(source_path.to_path_buf()));
        };
        let terms = self.full_text.then(|| SearchTermIndex {
            package_name: name.clone(),
            terms: self.terms.terms,
            assets: self.assets.clone(),
        });

        let mut entry = PackageCatalogEntry::new(name, source_path, self.assets);
        entry.refresh_imported(probe);

        Ok(IndexedPackage {
            entry,
            terms,
            duplicates: self.duplicates,
        })
    }
}

/// Builds the catalog entry (and optional search index) from an entry
/// stream. The first entry error aborts the package.
pub fn index_entries<I>(
    entries: I,
    kind: ArchiveKind,
    source_path: &Path,
    policy: &IndexPolicy,
    full_text: bool,
    probe: &dyn ImportProbe,
) -> Result<IndexedPackage>
where
    I: IntoIterator<Item = Result<ArchiveEntry>>,
{
    let mut acc = Accumulator::new(policy, kind, full_text);
    for entry in entries {
        if let Some(path) = acc.asset_path(entry?) {
            acc.accept(&path);
        }
    }
    acc.finish(source_path, probe)
}

/// Opens, fingerprints and indexes one archive file. Every handle is closed
/// before this returns, on success or error.
pub fn index_archive(
    path: &Path,
    kind: ArchiveKind,
    policy: &IndexPolicy,
    full_text: bool,
    probe: &dyn ImportProbe,
) -> Result<IndexedPackage> {
    let fingerprint = archive::fingerprint(path)?;
    let entries = archive::open(path, kind)?;
    let mut indexed = index_entries(entries, kind, path, policy, full_text, probe)?;
    indexed.entry.fingerprint = Some(fingerprint);
    debug!(
        package = %indexed.entry.name,
        assets = indexed.entry.assets.len(),
        "indexed {}",
        path.display()
    );
    Ok(indexed)
}
