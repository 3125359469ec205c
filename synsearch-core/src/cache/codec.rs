//! Flattening between the in-memory catalog/index and the cache documents.
//!
//! An asset table becomes `assetName|relativePath` strings in ordinal order
//! and a term map becomes `term|ord,ord,...` strings. Decoding the output of
//! an encoder gives back an identical structure.

use std::path::PathBuf;

use super::doc::{
    CACHE_VERSION, FolderPathsDto, OwnedPackagesDto, PackageDto, SearchTermsDto, SearchTermsListDto,
};
use crate::catalog::Catalog;
use crate::error::{IndexError, Result};
use crate::index::package::PackageCatalogEntry;
use crate::index::table::AssetTable;
use crate::index::terms::SearchTermIndex;

pub const FIELD_SEP: char = '|';
pub const ORDINAL_SEP: char = ',';

/// Outcome of decoding an owned-packages document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLoad {
    Loaded(Catalog),
    /// The document must be discarded and the packages re-scanned.
    Stale { reason: String },
}

impl CatalogLoad {
    pub fn is_stale(&self) -> bool {
        matches!(self, CatalogLoad::Stale { .. })
    }

    /// The loaded catalog, or an empty one when stale.
    pub fn into_catalog(self) -> Catalog {
        match self {
            CatalogLoad::Loaded(c) => c,
            CatalogLoad::Stale { .. } => Catalog::new(),
        }
    }
}

fn cache_err(msg: impl Into<String>) -> IndexError {
    IndexError::Cache(msg.into())
}

fn flatten_assets(table: &AssetTable) -> Vec<String> {
    table
        .iter()
        .map(|a| format!("{}{FIELD_SEP}{}", a.asset_name, a.relative_path))
        .collect()
}

fn unflatten_assets(flat: &[String], package: &str) -> Result<AssetTable> {
    let mut assets = AssetTable::new();
    for record in flat {
        let (name, path) = record
            .split_once(FIELD_SEP)
            .ok_or_else(|| cache_err(format!("asset record without separator: {record:?}")))?;
        if assets.insert(name, path).is_none() {
            return Err(cache_err(format!(
                "duplicate asset {name:?} in package {package:?}"
            )));
        }
    }
    Ok(assets)
}

pub fn encode_catalog(catalog: &Catalog) -> OwnedPackagesDto {
    let packages = catalog
        .iter()
        .map(|p| PackageDto {
            name: p.name.clone(),
            path: p.source_path.to_string_lossy().into_owned(),
            assets: flatten_assets(&p.assets),
            fingerprint: p.fingerprint.clone(),
            imported: p.marked_imported,
        })
        .collect();
    OwnedPackagesDto {
        version: CACHE_VERSION.to_string(),
        packages,
        saved_at: None,
    }
}

/// Version mismatches and empty package lists are reported as
/// [`CatalogLoad::Stale`]; malformed asset strings are errors.
pub fn decode_catalog(doc: OwnedPackagesDto) -> Result<CatalogLoad> {
    if doc.version != CACHE_VERSION {
        return Ok(CatalogLoad::Stale {
            reason: format!("cache version {:?}, expected {CACHE_VERSION:?}", doc.version),
        });
    }
    if doc.packages.is_empty() {
        return Ok(CatalogLoad::Stale {
            reason: "no packages in cache".into(),
        });
    }

    let mut catalog = Catalog::new();
    for dto in doc.packages {
        let assets = unflatten_assets(&dto.assets, &dto.name)?;
        let mut entry = PackageCatalogEntry::new(dto.name, dto.path, assets);
        entry.fingerprint = dto.fingerprint;
        if dto.imported {
            entry.mark_imported();
        }
        let name = entry.name.clone();
        if !catalog.insert_new(entry) {
            return Err(cache_err(format!("duplicate package {name:?}")));
        }
    }
    Ok(CatalogLoad::Loaded(catalog))
}

pub fn encode_terms(indexes: &[SearchTermIndex]) -> SearchTermsListDto {
    let packages = indexes
        .iter()
        .map(|idx| SearchTermsDto {
            package_name: idx.package_name.clone(),
            search_terms: idx
                .terms
                .iter()
                .map(|(term, ords)| {
                    let ords: Vec<String> = ords.iter().map(usize::to_string).collect();
                    let sep = ORDINAL_SEP.to_string();
                    format!("{term}{FIELD_SEP}{}", ords.join(sep.as_str()))
                })
                .collect(),
            assets: flatten_assets(&idx.assets),
        })
        .collect();
    SearchTermsListDto { packages }
}

pub fn decode_terms(doc: SearchTermsListDto) -> Result<Vec<SearchTermIndex>> {
    doc.packages
        .into_iter()
        .map(|dto| {
            let mut idx = SearchTermIndex::new(dto.package_name);
            idx.assets = unflatten_assets(&dto.assets, &idx.package_name)?;
            for flat in &dto.search_terms {
                let (term, ords) = flat
                    .split_once(FIELD_SEP)
                    .ok_or_else(|| cache_err(format!("term record without separator: {flat:?}")))?;
                // `term|` is a term with no postings
                let ords = ords
                    .split(ORDINAL_SEP)
                    .filter(|o| !o.is_empty())
                    .map(|o| {
                        o.trim()
                            .parse::<usize>()
                            .map_err(|e| cache_err(format!("bad ordinal {o:?} for {term:?}: {e}")))
                    })
                    .collect::<Result<Vec<_>>>()?;
                idx.terms.insert(term.to_string(), ords);
            }
            Ok(idx)
        })
        .collect()
}

pub fn encode_locations(locations: &[PathBuf]) -> FolderPathsDto {
    FolderPathsDto {
        folder_paths: locations
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    }
}

pub fn decode_locations(doc: FolderPathsDto) -> Vec<PathBuf> {
    doc.folder_paths.into_iter().map(PathBuf::from).collect()
}
