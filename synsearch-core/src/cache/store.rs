use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use super::codec::{
    CatalogLoad, decode_catalog, decode_locations, decode_terms, encode_catalog, encode_locations,
    encode_terms,
};
use super::doc::{FolderPathsDto, OwnedPackagesDto, SearchTermsListDto};
use crate::catalog::Catalog;
use crate::error::{IndexError, Result};
use crate::index::terms::SearchTermIndex;

pub const CATALOG_FILE: &str = "cache.json";
pub const SEARCH_FILE: &str = "search.json";
pub const LOCATIONS_FILE: &str = "locations.json";

const APP_DIR: &str = "SyntySearch";

/// The three cache documents inside one directory.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user data directory for the current platform, if one can be found.
    pub fn default_dir() -> Option<PathBuf> {
        let base = if cfg!(target_os = "windows") {
            std::env::var_os("APPDATA").map(PathBuf::from)
        } else if cfg!(target_os = "macos") {
            std::env::var_os("HOME").map(|h| PathBuf::from(h).join("Library"))
        } else {
            std::env::var_os("XDG_DATA_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
        };
        base.map(|b| b.join(APP_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// A missing file loads as an empty catalog. A stale or undecodable
    /// document is deleted and reported as [`CatalogLoad::Stale`].
    pub fn load_catalog(&self) -> Result<CatalogLoad> {
        let load = match self.read_doc::<OwnedPackagesDto>(CATALOG_FILE) {
            Ok(None) => return Ok(CatalogLoad::Loaded(Catalog::new())),
            Ok(Some(doc)) => decode_catalog(doc).unwrap_or_else(|e| CatalogLoad::Stale {
                reason: e.to_string(),
            }),
            Err(e) => CatalogLoad::Stale {
                reason: e.to_string(),
            },
        };
        if let CatalogLoad::Stale { reason } = &load {
            warn!(reason = %reason, "discarding {}", self.path(CATALOG_FILE).display());
            self.remove(CATALOG_FILE)?;
        }
        Ok(load)
    }

    /// An empty catalog removes the file instead, since an empty document
    /// would read back as stale.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        if catalog.is_empty() {
            return self.remove(CATALOG_FILE);
        }
        let mut doc = encode_catalog(catalog);
        doc.saved_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        self.write_doc(CATALOG_FILE, &doc)
    }

    /// A missing or undecodable document loads as no indexes; the latter is
    /// deleted so the next full-text scan rewrites it.
    pub fn load_terms(&self) -> Result<Vec<SearchTermIndex>> {
        let loaded = self
            .read_doc::<SearchTermsListDto>(SEARCH_FILE)
            .and_then(|doc| doc.map(decode_terms).transpose());
        Ok(self.or_discard(SEARCH_FILE, loaded)?.unwrap_or_default())
    }

    pub fn save_terms(&self, indexes: &[SearchTermIndex]) -> Result<()> {
        self.write_doc(SEARCH_FILE, &encode_terms(indexes))
    }

    pub fn load_locations(&self) -> Result<Vec<PathBuf>> {
        let loaded = self
            .read_doc::<FolderPathsDto>(LOCATIONS_FILE)
            .map(|doc| doc.map(decode_locations));
        Ok(self.or_discard(LOCATIONS_FILE, loaded)?.unwrap_or_default())
    }

    pub fn save_locations(&self, locations: &[PathBuf]) -> Result<()> {
        self.write_doc(LOCATIONS_FILE, &encode_locations(locations))
    }

    fn read_doc<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        let f = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("reading {}", path.display());
        Ok(Some(serde_json::from_reader(BufReader::new(f))?))
    }

    /// Writes through a temp file in the cache dir, then renames over `file`.
    fn write_doc<T: Serialize>(&self, file: &str, doc: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut w = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut w, doc)?;
            w.flush()?;
        }
        let path = self.path(file);
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    /// Content errors drop the file and load as missing. I/O errors still fail.
    fn or_discard<T>(&self, file: &str, loaded: Result<Option<T>>) -> Result<Option<T>> {
        match loaded {
            Err(e @ (IndexError::Json(_) | IndexError::Cache(_))) => {
                warn!(error = %e, "discarding {}", self.path(file).display());
                self.remove(file)?;
                Ok(None)
            }
            other => other,
        }
    }

    fn remove(&self, file: &str) -> Result<()> {
        match fs::remove_file(self.path(file)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::package::PackageCatalogEntry;
    use crate::index::table::AssetTable;

    fn catalog() -> Catalog {
        let mut t = AssetTable::new();
        t.insert("Car", "Prefabs/Car.prefab");
        let mut c = Catalog::new();
        c.insert_new(PackageCatalogEntry::new("PolygonTown", "/p/town.unitypackage", t));
        c
    }

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("not-yet"));
        assert_eq!(store.load_catalog().unwrap(), CatalogLoad::Loaded(Catalog::new()));
        assert!(store.load_terms().unwrap().is_empty());
        assert!(store.load_locations().unwrap().is_empty());
    }

    #[test]
    fn documents_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache"));
        let c = catalog();
        let mut idx = SearchTermIndex::new("PolygonTown");
        idx.add("car".into(), 0);
        let locs = vec![PathBuf::from("/synty")];

        store.save_catalog(&c).unwrap();
        store.save_terms(std::slice::from_ref(&idx)).unwrap();
        store.save_locations(&locs).unwrap();

        assert_eq!(store.load_catalog().unwrap(), CatalogLoad::Loaded(c));
        assert_eq!(store.load_terms().unwrap(), [idx]);
        assert_eq!(store.load_locations().unwrap(), locs);

        let raw = fs::read_to_string(store.dir().join(CATALOG_FILE)).unwrap();
        assert!(raw.contains("\"Version\": \"1.1\""));
        assert!(raw.contains("\"packageDtos\""));
        assert!(raw.contains("\"savedAt\""));
    }

    #[test]
    fn reads_documents_without_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CATALOG_FILE),
            r#"{"Version":"1.1","packageDtos":[{"Name":"PolygonTown","Path":"C:/p/town.unitypackage","Assets":["Car|Prefabs/Car.prefab"]}]}"#,
        )
        .unwrap();
        let c = CacheStore::new(dir.path()).load_catalog().unwrap().into_catalog();
        let town = c.get("PolygonTown").unwrap();
        assert_eq!(town.assets.path_of("Car"), Some("Prefabs/Car.prefab"));
        assert!(town.fingerprint.is_none());
    }

    #[test]
    fn stale_catalog_file_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CATALOG_FILE);
        fs::write(&file, r#"{"Version":"1.0","packageDtos":[]}"#).unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.load_catalog().unwrap().is_stale());
        assert!(!file.exists());
    }

    #[test]
    fn garbage_catalog_is_treated_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CATALOG_FILE);
        fs::write(&file, "{ not json").unwrap();
        let load = CacheStore::new(dir.path()).load_catalog().unwrap();
        assert!(load.is_stale());
        assert!(!file.exists());
    }

    #[test]
    fn corrupt_search_document_loads_empty_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(SEARCH_FILE);
        fs::write(&file, "{ truncated").unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.load_terms().unwrap().is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn bad_term_record_loads_empty_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(SEARCH_FILE);
        fs::write(
            &file,
            r#"{"PackageSearchTerms":[{"PackageName":"P","SearchTerms":["wood|x"]}]}"#,
        )
        .unwrap();
        assert!(CacheStore::new(dir.path()).load_terms().unwrap().is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn corrupt_locations_document_loads_empty_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(LOCATIONS_FILE);
        fs::write(&file, r#"{"folderPaths": 7}"#).unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.load_locations().unwrap().is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn saving_empty_catalog_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.save_catalog(&catalog()).unwrap();
        store.save_catalog(&Catalog::new()).unwrap();
        assert!(!dir.path().join(CATALOG_FILE).exists());
        assert!(!store.load_catalog().unwrap().is_stale());
    }
}
