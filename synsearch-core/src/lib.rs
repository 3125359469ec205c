#![forbid(unsafe_code)]

pub mod error;

pub mod archive;

pub mod index {
    pub mod indexer;
    pub mod package;
    pub mod paths;
    pub mod table;
    pub mod terms;
    pub mod tokenize;
}

pub mod cache {
    pub mod codec;
    pub mod doc;
    pub mod store;
}

pub mod catalog;
pub mod config;
pub mod domain;
pub mod inspect;
pub mod probe;
pub mod scan;
pub mod scheduler;
pub mod session;
pub mod stats;

// Re-exports: stable API surface
pub use archive::ArchiveKind;
pub use cache::store::CacheStore;
pub use catalog::Catalog;
pub use config::IndexPolicy;
pub use error::{IndexError, Result};
pub use index::indexer::{IndexedPackage, index_archive};
pub use index::package::PackageCatalogEntry;
pub use index::terms::SearchTermIndex;
pub use index::tokenize::tokenize;
pub use inspect::inspect;
pub use probe::{ImportProbe, NoProject, ProjectProbe};
pub use scan::{FileScan, ScanTask, plan};
pub use scheduler::Scheduler;
pub use session::{Absorbed, Session};
