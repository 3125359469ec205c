pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use handlers::Context;
use synsearch_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Commands::Scan { dirs } => handlers::handle_scan(&ctx, dirs),
        Commands::Rescan => handlers::handle_rescan(&ctx),
        Commands::List { long } => handlers::handle_list(&ctx, long),
        Commands::Assets { package } => handlers::handle_assets(&ctx, &package),
        Commands::Search { term } => handlers::handle_search(&ctx, &term),
        Commands::Stats { json } => handlers::handle_stats(&ctx, json),
        Commands::MarkImported { package } => handlers::handle_mark_imported(&ctx, &package),
        Commands::Inspect { archive } => handlers::handle_inspect(&ctx, &archive),
    }
}
