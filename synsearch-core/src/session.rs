use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::archive;
use crate::cache::codec::CatalogLoad;
use crate::cache::store::CacheStore;
use crate::catalog::Catalog;
use crate::domain::{PackageRow, SearchHit};
use crate::error::{IndexError, Result};
use crate::index::terms::SearchTermIndex;
use crate::probe::ImportProbe;
use crate::scan::FileScan;
use crate::stats::CatalogStats;

/// Shortest accepted search query, in characters.
pub const MIN_QUERY_LEN: usize = 3;

pub const STALE_CACHE_NOTICE: &str =
    "Cache files need to be updated - please set package location to re-scan";

/// What [`Session::absorb`] did with one scan result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Absorbed {
    Added,
    /// Already catalogued, entry left untouched. `changed` is set when the
    /// archive's fingerprint differs from the catalogued one.
    Known { changed: bool },
    Failed,
}

/// Everything a host keeps between scans: catalog, search indexes,
/// remembered locations and whether any of it still needs saving.
#[derive(Debug, Default)]
pub struct Session {
    catalog: Catalog,
    indexes: Vec<SearchTermIndex>,
    locations: Vec<PathBuf>,
    dirty: bool,
    notice: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads all three documents. A stale catalog leaves the session with an
    /// empty catalog and a notice for the host.
    pub fn load(store: &CacheStore, probe: &dyn ImportProbe) -> Result<Self> {
        let mut session = Session::new();
        match store.load_catalog()? {
            CatalogLoad::Loaded(c) => session.catalog = c,
            CatalogLoad::Stale { reason } => {
                info!(reason = %reason, "starting with an empty catalog");
                session.notice = Some(STALE_CACHE_NOTICE.to_string());
            }
        }
        session.catalog.refresh_imported(probe);
        session.indexes = store.load_terms()?;
        session.locations = store.load_locations()?;
        Ok(session)
    }

    /// Writes the documents if anything changed since the last save.
    /// Returns whether a write happened.
    pub fn save(&mut self, store: &CacheStore) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        store.save_catalog(&self.catalog)?;
        store.save_terms(&self.indexes)?;
        store.save_locations(&self.locations)?;
        self.mark_clean();
        Ok(true)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn indexes(&self) -> &[SearchTermIndex] {
        &self.indexes
    }

    pub fn index_for(&self, package: &str) -> Option<&SearchTermIndex> {
        self.indexes.iter().find(|i| i.package_name == package)
    }

    /// Applies one scan step. Search indexes are always replaced by the newer
    /// one; catalog entries are only added for unseen package names.
    pub fn absorb(&mut self, scan: FileScan) -> Absorbed {
        let indexed = match scan.result {
            Ok(i) => i,
            Err(e) => {
                warn!(error = %e, "skipping {}", scan.path.display());
                return Absorbed::Failed;
            }
        };
        if let Some(terms) = indexed.terms {
            self.replace_index(terms);
        }

        let entry = indexed.entry;
        match self.catalog.get(&entry.name) {
            Some(known) => {
                let changed = match (&known.fingerprint, &entry.fingerprint) {
                    (Some(old), Some(new)) => old != new,
                    _ => false,
                };
                if changed {
                    info!(package = %entry.name, "archive changed since it was catalogued");
                }
                Absorbed::Known { changed }
            }
            None => {
                info!(package = %entry.name, assets = entry.assets.len(), "new package");
                self.catalog.insert_new(entry);
                self.dirty = true;
                Absorbed::Added
            }
        }
    }

    /// Drops any index for the same package and appends `index`.
    pub fn replace_index(&mut self, index: SearchTermIndex) {
        self.indexes.retain(|i| i.package_name != index.package_name);
        self.indexes.push(index);
        self.dirty = true;
    }

    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Returns false if `dir` was already remembered.
    pub fn remember_location(&mut self, dir: &Path) -> bool {
        if self.locations.iter().any(|l| l == dir) {
            return false;
        }
        self.locations.push(dir.to_path_buf());
        self.dirty = true;
        true
    }

    pub fn mark_imported(&mut self, package: &str) -> Result<()> {
        self.catalog.mark_imported(package)?;
        self.dirty = true;
        Ok(())
    }

    pub fn refresh_imported(&mut self, probe: &dyn ImportProbe) -> usize {
        self.catalog.refresh_imported(probe)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            owned: self.catalog.len(),
            imported: self.catalog.imported_count(),
            indexed_packages: self.indexes.len(),
            assets: self.catalog.asset_count(),
            terms: self.indexes.iter().map(SearchTermIndex::term_count).sum(),
        }
    }

    pub fn rows(&self) -> Vec<PackageRow> {
        self.catalog
            .iter()
            .map(|p| PackageRow {
                name: p.name.clone(),
                source_path: p.source_path.clone(),
                assets: p.assets.len(),
                imported: p.is_imported,
                indexed: self.index_for(&p.name).is_some(),
            })
            .collect()
    }

    /// Offline search over every package's index. `term` must have at least
    /// [`MIN_QUERY_LEN`] characters once trimmed.
    pub fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        let term = term.trim();
        if term.chars().count() < MIN_QUERY_LEN {
            return Err(IndexError::TermTooShort(MIN_QUERY_LEN));
        }
        let mut hits: Vec<SearchHit> = self
            .indexes
            .iter()
            .flat_map(|idx| {
                // older documents carry no asset table of their own
                let table = if idx.assets.is_empty() {
                    self.catalog.get(&idx.package_name).map(|p| &p.assets)
                } else {
                    Some(&idx.assets)
                };
                idx.matching(term).into_iter().map(move |ordinal| {
                    let record = table.and_then(|t| t.by_ordinal(ordinal));
                    SearchHit {
                        package: idx.package_name.clone(),
                        ordinal,
                        asset_name: record.map(|r| r.asset_name.clone()),
                        relative_path: record.map(|r| r.relative_path.clone()),
                    }
                })
            })
            .collect();
        hits.sort_by(|a, b| (&a.package, a.ordinal).cmp(&(&b.package, b.ordinal)));
        Ok(hits)
    }

    /// Whether the catalogued archive no longer matches its recorded
    /// fingerprint. `None` when there is nothing to compare.
    pub fn archive_changed(&self, package: &str) -> Option<bool> {
        let p = self.catalog.get(package)?;
        let recorded = p.fingerprint.as_deref()?;
        let current = archive::fingerprint(&p.source_path).ok()?;
        Some(current != recorded)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// One-line message for the host, e.g. after a stale cache was dropped.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveKind;
    use crate::index::indexer::IndexedPackage;
    use crate::index::package::PackageCatalogEntry;
    use crate::index::table::AssetTable;

    fn scan(name: &str, assets: &[&str], fingerprint: &str, full_text: bool) -> FileScan {
        let mut t = AssetTable::new();
        let mut terms = SearchTermIndex::new(name);
        for (i, a) in assets.iter().enumerate() {
            t.insert(a, &format!("Prefabs/{a}.prefab"));
            for w in crate::index::tokenize::tokenize(a) {
                terms.add(w, i);
            }
        }
        terms.assets = t.clone();
        let mut entry = PackageCatalogEntry::new(name, format!("/p/{name}.unitypackage"), t);
        entry.fingerprint = Some(fingerprint.into());
        FileScan {
            path: entry.source_path.clone(),
            kind: ArchiveKind::UnityPackage,
            result: Ok(IndexedPackage {
                entry,
                terms: full_text.then_some(terms),
                duplicates: vec![],
            }),
        }
    }

    #[test]
    fn known_packages_are_skipped_but_changes_reported() {
        let mut s = Session::new();
        assert_eq!(s.absorb(scan("SimpleFarm", &["Barn"], "aa", false)), Absorbed::Added);
        s.mark_clean();
        assert_eq!(
            s.absorb(scan("SimpleFarm", &["Barn", "Silo"], "aa", false)),
            Absorbed::Known { changed: false }
        );
        assert_eq!(
            s.absorb(scan("SimpleFarm", &["Barn", "Silo"], "bb", false)),
            Absorbed::Known { changed: true }
        );
        assert!(!s.is_dirty());
        assert_eq!(s.catalog().get("SimpleFarm").unwrap().assets.len(), 1);
    }

    #[test]
    fn failed_scan_changes_nothing() {
        let mut s = Session::new();
        let failed = FileScan {
            path: "/p/bad.zip".into(),
            kind: ArchiveKind::Zip,
            result: Err(IndexError::ArchiveFormat("zip: invalid".into())),
        };
        assert_eq!(s.absorb(failed), Absorbed::Failed);
        assert!(s.catalog().is_empty());
        assert!(!s.is_dirty());
    }

    #[test]
    fn newer_index_replaces_older() {
        let mut s = Session::new();
        s.absorb(scan("SimpleFarm", &["Barn"], "aa", true));
        s.absorb(scan("SimpleTown", &["Shop"], "cc", true));
        s.absorb(scan("SimpleFarm", &["Tractor"], "bb", true));
        assert_eq!(s.indexes().len(), 2);
        assert_eq!(s.indexes()[1].package_name, "SimpleFarm");
        assert_eq!(s.index_for("SimpleFarm").unwrap().exact("tractor"), [0]);
        assert!(s.index_for("SimpleFarm").unwrap().exact("barn").is_empty());
    }

    #[test]
    fn search_resolves_and_orders_hits() {
        let mut s = Session::new();
        s.absorb(scan("SimpleTown", &["WoodenSign", "Shop"], "t", true));
        s.absorb(scan("SimpleFarm", &["Cart", "BarrelOldWood02"], "f", true));
        let hits = s.search("Wood").unwrap();
        let got: Vec<_> = hits
            .iter()
            .map(|h| (h.package.as_str(), h.ordinal, h.asset_name.as_deref()))
            .collect();
        assert_eq!(
            got,
            [
                ("SimpleFarm", 1, Some("BarrelOldWood02")),
                ("SimpleTown", 0, Some("WoodenSign")),
            ]
        );
        assert_eq!(hits[0].relative_path.as_deref(), Some("Prefabs/BarrelOldWood02.prefab"));
    }

    #[test]
    fn hits_resolve_against_the_newest_scan() {
        let mut s = Session::new();
        s.absorb(scan("SimpleFarm", &["Cart", "BarrelOldWood02"], "tar", true));
        assert_eq!(
            s.absorb(scan("SimpleFarm", &["BarrelOldWood02", "Cart"], "zip", true)),
            Absorbed::Known { changed: true }
        );
        let hits = s.search("wood").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ordinal, 0);
        assert_eq!(hits[0].asset_name.as_deref(), Some("BarrelOldWood02"));
    }

    #[test]
    fn index_without_assets_falls_back_to_catalog() {
        let mut s = Session::new();
        s.absorb(scan("SimpleFarm", &["Cart", "BarrelOldWood02"], "f", false));
        let mut legacy = SearchTermIndex::new("SimpleFarm");
        legacy.add("wood".into(), 1);
        s.replace_index(legacy);
        let hits = s.search("wood").unwrap();
        assert_eq!(hits[0].asset_name.as_deref(), Some("BarrelOldWood02"));
    }

    #[test]
    fn short_queries_are_rejected() {
        let s = Session::new();
        assert!(matches!(s.search(" wo "), Err(IndexError::TermTooShort(3))));
        assert!(s.search("woo").unwrap().is_empty());
    }

    #[test]
    fn locations_are_deduplicated() {
        let mut s = Session::new();
        assert!(s.remember_location(Path::new("/synty")));
        assert!(!s.remember_location(Path::new("/synty")));
        assert_eq!(s.locations(), [PathBuf::from("/synty")]);
        assert!(s.is_dirty());
    }

    #[test]
    fn stats_and_rows() {
        let mut s = Session::new();
        s.absorb(scan("PolygonTown", &["Car", "Bus"], "a", false));
        s.absorb(scan("SimpleFarm", &["BarrelOldWood02"], "b", true));
        s.mark_imported("PolygonTown").unwrap();
        let st = s.stats();
        assert_eq!(
            st,
            CatalogStats {
                owned: 2,
                imported: 1,
                indexed_packages: 1,
                assets: 3,
                terms: 3,
            }
        );
        let rows = s.rows();
        assert_eq!(rows[0].name, "PolygonTown");
        assert!(rows[0].imported && !rows[0].indexed);
        assert!(rows[1].indexed);
    }

    #[test]
    fn save_only_when_dirty_and_stale_load_sets_notice() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mut s = Session::new();
        assert!(!s.save(&store).unwrap());
        s.absorb(scan("PolygonTown", &["Car"], "a", false));
        assert!(s.save(&store).unwrap());
        assert!(!s.is_dirty());

        let probe = |_: &str, rel: &str| rel == "Prefabs/Car.prefab";
        let back = Session::load(&store, &probe).unwrap();
        assert!(back.notice().is_none());
        assert!(back.catalog().get("PolygonTown").unwrap().is_imported);

        std::fs::write(
            dir.path().join(crate::cache::store::CATALOG_FILE),
            r#"{"Version":"0.9","packageDtos":[]}"#,
        )
        .unwrap();
        let stale = Session::load(&store, &crate::probe::NoProject).unwrap();
        assert_eq!(stale.notice(), Some(STALE_CACHE_NOTICE));
        assert!(stale.catalog().is_empty());
    }

    #[test]
    fn corrupt_search_document_does_not_block_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mut s = Session::new();
        s.absorb(scan("SimpleFarm", &["Cart"], "a", true));
        s.save(&store).unwrap();
        std::fs::write(dir.path().join(crate::cache::store::SEARCH_FILE), "{ truncated").unwrap();

        let back = Session::load(&store, &crate::probe::NoProject).unwrap();
        assert!(back.indexes().is_empty());
        assert!(back.catalog().contains("SimpleFarm"));
    }
}
