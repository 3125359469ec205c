use std::path::{Path, PathBuf};

/// Host-side check for whether a package's asset already exists in the
/// project. The indexer never looks at the project layout itself.
pub trait ImportProbe {
    fn is_asset_present(&self, package_name: &str, relative_asset_path: &str) -> bool;
}

impl<F> ImportProbe for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_asset_present(&self, package_name: &str, relative_asset_path: &str) -> bool {
        self(package_name, relative_asset_path)
    }
}

/// Looks for `<assets_dir>/<package>/<relative path>` on disk.
#[derive(Clone, Debug)]
pub struct ProjectProbe {
    assets_dir: PathBuf,
}

impl ProjectProbe {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

impl ImportProbe for ProjectProbe {
    fn is_asset_present(&self, package_name: &str, relative_asset_path: &str) -> bool {
        self.assets_dir
            .join(package_name)
            .join(relative_asset_path)
            .is_file()
    }
}

/// For hosts without a project: nothing is ever imported.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProject;

impl ImportProbe for NoProject {
    fn is_asset_present(&self, _: &str, _: &str) -> bool {
        false
    }
}
