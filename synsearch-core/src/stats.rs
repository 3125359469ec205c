use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Packages in the catalog.
    pub owned: usize,
    pub imported: usize,
    /// Packages with a full-text index.
    pub indexed_packages: usize,
    pub assets: usize,
    pub terms: usize,
}
