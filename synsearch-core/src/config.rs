use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveKind;
use crate::error::Result;
use crate::index::tokenize::MIN_WORD_LEN;
use crate::scan::ScanPattern;

/// Which archive files to pick up and how to read them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub glob: String,
    pub kind: ArchiveKind,
    #[serde(default)]
    pub full_text: bool,
}

impl PatternSpec {
    pub fn new(glob: &str, kind: ArchiveKind, full_text: bool) -> Self {
        Self {
            glob: glob.to_string(),
            kind,
            full_text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPolicy {
    /// Project folder every asset path starts from.
    pub asset_root: String,
    pub prefab_extension: String,
    /// Tar members whose name ends with this carry an asset path as payload.
    pub path_marker: String,
    pub min_word_len: usize,
    pub patterns: Vec<PatternSpec>,
}

impl Default for IndexPolicy {
    fn default() -> Self {
        Self {
            asset_root: "Assets/".into(),
            prefab_extension: ".prefab".into(),
            path_marker: "pathname".into(),
            min_word_len: MIN_WORD_LEN,
            patterns: vec![
                PatternSpec::new("polygon*.unitypackage", ArchiveKind::UnityPackage, false),
                PatternSpec::new("simple*.unitypackage", ArchiveKind::UnityPackage, true),
                PatternSpec::new("simple*.zip", ArchiveKind::Zip, true),
            ],
        }
    }
}

impl IndexPolicy {
    /// Reads a JSON policy. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    pub fn scan_patterns(&self) -> Result<Vec<ScanPattern>> {
        self.patterns
            .iter()
            .map(|p| ScanPattern::new(&p.glob, p.kind, p.full_text))
            .collect()
    }
}
