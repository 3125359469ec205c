use std::collections::{BTreeMap, BTreeSet};

use super::table::AssetTable;

/// Inverted index of one package: lower-case word -> asset ordinals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTermIndex {
    pub package_name: String,
    pub terms: BTreeMap<String, Vec<usize>>,
    /// Assets of the scan that produced `terms`; postings index into this.
    /// Empty for indexes read from documents that predate it.
    pub assets: AssetTable,
}

impl SearchTermIndex {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            terms: BTreeMap::new(),
            assets: AssetTable::new(),
        }
    }

    /// Appends `ordinal` to the postings of `term`. Ordinals arrive in
    /// ascending order, so a repeat of the last one is a word occurring
    /// twice in the same name and is not stored again.
    pub fn add(&mut self, term: String, ordinal: usize) {
        let postings = self.terms.entry(term).or_default();
        if postings.last() != Some(&ordinal) {
            postings.push(ordinal);
        }
    }

    pub fn exact(&self, term: &str) -> &[usize] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ordinals of every term containing `query` (case-insensitive), ascending
    /// and without repeats.
    pub fn matching(&self, query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        self.terms
            .iter()
            .filter(|(term, _)| term.contains(&query))
            .flat_map(|(_, ords)| ords.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
