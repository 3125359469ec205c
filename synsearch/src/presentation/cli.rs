use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "synsearch: offline index of Synty asset packages", long_about = None)]
pub struct Cli {
    /// Directory holding cache.json, search.json and locations.json
    #[arg(long, global = true, env = "SYNSEARCH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// The project's Assets folder, used to tell which packages are imported
    #[arg(long, global = true, env = "SYNSEARCH_PROJECT_ASSETS")]
    pub project_assets: Option<PathBuf>,

    /// JSON index policy (archive patterns, asset root, word length)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG wins when set
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan directories for packages and remember them as locations
    Scan {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Scan every remembered location again
    Rescan,

    /// List owned packages
    List {
        /// show asset count, source path and whether the archive changed
        #[arg(long)]
        long: bool,
    },

    /// Print the asset table of one package
    Assets { package: String },

    /// Search asset names of full-text indexed packages
    Search { term: String },

    /// Catalog and index counts
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Flag a package as imported into the project
    MarkImported { package: String },

    /// Print raw archive entries with payload sizes
    Inspect { archive: PathBuf },
}
