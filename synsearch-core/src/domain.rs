// Flat rows handed to hosts for display.
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRow {
    pub name: String,
    pub source_path: PathBuf,
    pub assets: usize,
    pub imported: bool,
    pub indexed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub package: String,
    pub ordinal: usize,
    /// `None` when the ordinal has no asset record to resolve against.
    pub asset_name: Option<String>,
    pub relative_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRow {
    pub name: String,
    pub size: u64,
    /// Decoded asset path for tar `pathname` members.
    pub asset_path: Option<String>,
}
