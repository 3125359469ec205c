use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    pub asset_name: String,
    pub relative_path: String,
}

/// Asset records of one package in discovery order.
///
/// A record's position is its ordinal, which is what search-index postings
/// point at. Names are unique: the first record with a given name wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetTable {
    records: Vec<AssetRecord>,
    by_name: HashMap<String, usize>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its ordinal, or `None` if the name is taken.
    pub fn insert(&mut self, asset_name: &str, relative_path: &str) -> Option<usize> {
        if self.by_name.contains_key(asset_name) {
            return None;
        }
        let ordinal = self.records.len();
        self.by_name.insert(asset_name.to_owned(), ordinal);
        self.records.push(AssetRecord {
            asset_name: asset_name.to_owned(),
            relative_path: relative_path.to_owned(),
        });
        Some(ordinal)
    }

    pub fn contains(&self, asset_name: &str) -> bool {
        self.by_name.contains_key(asset_name)
    }

    pub fn path_of(&self, asset_name: &str) -> Option<&str> {
        self.by_name
            .get(asset_name)
            .map(|&i| self.records[i].relative_path.as_str())
    }

    pub fn ordinal_of(&self, asset_name: &str) -> Option<usize> {
        self.by_name.get(asset_name).copied()
    }

    pub fn by_ordinal(&self, ordinal: usize) -> Option<&AssetRecord> {
        self.records.get(ordinal)
    }

    pub fn first(&self) -> Option<&AssetRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.records.iter()
    }
}
