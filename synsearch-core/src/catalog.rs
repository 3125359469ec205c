use std::collections::BTreeMap;

use crate::error::{IndexError, Result};
use crate::index::package::PackageCatalogEntry;
use crate::probe::ImportProbe;

/// Owned packages keyed by package name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    packages: BTreeMap<String, PackageCatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the package unless its name is already catalogued. An existing
    /// entry is never replaced; returns whether `entry` was added.
    pub fn insert_new(&mut self, entry: PackageCatalogEntry) -> bool {
        if self.packages.contains_key(&entry.name) {
            return false;
        }
        self.packages.insert(entry.name.clone(), entry);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PackageCatalogEntry> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageCatalogEntry> {
        self.packages.values()
    }

    pub fn mark_imported(&mut self, name: &str) -> Result<()> {
        self.packages
            .get_mut(name)
            .ok_or_else(|| IndexError::UnknownPackage(name.to_string()))?
            .mark_imported();
        Ok(())
    }

    /// Re-probes every package and returns how many are imported.
    pub fn refresh_imported(&mut self, probe: &dyn ImportProbe) -> usize {
        self.packages
            .values_mut()
            .filter_map(|p| p.refresh_imported(probe).then_some(()))
            .count()
    }

    pub fn imported_count(&self) -> usize {
        self.packages.values().filter(|p| p.is_imported).count()
    }

    pub fn asset_count(&self) -> usize {
        self.packages.values().map(|p| p.assets.len()).sum()
    }
}
