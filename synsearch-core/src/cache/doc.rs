//! On-disk JSON documents. Field names match the cache files written by the
//! editor tool, so existing `cache.json`/`search.json`/`locations.json`
//! files load unchanged.

use serde::{Deserialize, Serialize};

/// Owned-packages documents with any other version are stale.
pub const CACHE_VERSION: &str = "1.1";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDto {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Path")]
    pub path: String,
    /// `assetName|relativePath`, ordinal order
    #[serde(rename = "Assets", default)]
    pub assets: Vec<String>,
    #[serde(rename = "Fingerprint", default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Only manual marks are stored; probe results are recomputed on load.
    #[serde(rename = "Imported", default, skip_serializing_if = "std::ops::Not::not")]
    pub imported: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedPackagesDto {
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "packageDtos", default)]
    pub packages: Vec<PackageDto>,
    /// RFC 3339
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTermsDto {
    #[serde(rename = "PackageName")]
    pub package_name: String,
    /// `term|ord1,ord2,...`
    #[serde(rename = "SearchTerms", default)]
    pub search_terms: Vec<String>,
    /// `assetName|relativePath` the ordinals refer to, ordinal order
    #[serde(rename = "Assets", default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTermsListDto {
    #[serde(rename = "PackageSearchTerms", default)]
    pub packages: Vec<SearchTermsDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPathsDto {
    #[serde(rename = "folderPaths", default)]
    pub folder_paths: Vec<String>,
}
