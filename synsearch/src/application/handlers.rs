use std::path::{Path, PathBuf};

use synsearch_core::error::{IndexError, Result};
use synsearch_core::{
    Absorbed, CacheStore, ImportProbe, IndexPolicy, NoProject, ProjectProbe, Scheduler, Session,
    inspect, plan,
};
use tracing::{info, warn};

use crate::presentation::cli::Cli;

/// Global options resolved once per invocation.
pub struct Context {
    store: CacheStore,
    policy: IndexPolicy,
    probe: Box<dyn ImportProbe>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let dir = cli
            .cache_dir
            .clone()
            .or_else(CacheStore::default_dir)
            .ok_or_else(|| IndexError::Cache("no cache directory, pass --cache-dir".into()))?;
        let policy = match &cli.config {
            Some(p) => IndexPolicy::load(p)?,
            None => IndexPolicy::default(),
        };
        let probe: Box<dyn ImportProbe> = match &cli.project_assets {
            Some(assets) => Box::new(ProjectProbe::new(assets)),
            None => Box::new(NoProject),
        };
        info!(cache = %dir.display(), "using cache directory");
        Ok(Self {
            store: CacheStore::new(dir),
            policy,
            probe,
        })
    }

    fn load_session(&self) -> Result<Session> {
        let session = Session::load(&self.store, self.probe.as_ref())?;
        if let Some(notice) = session.notice() {
            eprintln!("{notice}");
        }
        Ok(session)
    }

    fn save_session(&self, session: &mut Session) -> Result<()> {
        if session.save(&self.store)? {
            eprintln!("cache: saved to {}", self.store.dir().display());
        }
        Ok(())
    }
}

#[derive(Default)]
struct ScanSummary {
    added: usize,
    known: usize,
    changed: usize,
    failed: usize,
}

fn scan_dirs(ctx: &Context, session: &mut Session, dirs: &[PathBuf]) -> Result<ScanSummary> {
    let patterns = ctx.policy.scan_patterns()?;
    let mut scheduler = Scheduler::new();
    for dir in dirs {
        let dir = dir
            .canonicalize()
            .map_err(|_| IndexError::PathNotFound(dir.clone()))?;
        scheduler.extend(plan(&dir, &patterns, &ctx.policy, ctx.probe.as_ref())?);
        session.remember_location(&dir);
    }

    let mut summary = ScanSummary::default();
    for scan in scheduler.drain() {
        match session.absorb(scan) {
            Absorbed::Added => summary.added += 1,
            Absorbed::Known { changed } => {
                summary.known += 1;
                summary.changed += usize::from(changed);
            }
            Absorbed::Failed => summary.failed += 1,
        }
    }
    Ok(summary)
}

fn report(summary: &ScanSummary, session: &Session) {
    eprintln!(
        "scan: {} added, {} already known ({} changed on disk), {} failed; {} packages owned",
        summary.added,
        summary.known,
        summary.changed,
        summary.failed,
        session.catalog().len()
    );
}

pub fn handle_scan(ctx: &Context, dirs: Vec<PathBuf>) -> Result<()> {
    let mut session = ctx.load_session()?;
    let summary = scan_dirs(ctx, &mut session, &dirs)?;
    report(&summary, &session);
    ctx.save_session(&mut session)
}

pub fn handle_rescan(ctx: &Context) -> Result<()> {
    let mut session = ctx.load_session()?;
    let dirs: Vec<PathBuf> = session
        .locations()
        .iter()
        .filter(|d| {
            let ok = d.is_dir();
            if !ok {
                warn!("remembered location {} is gone, skipping", d.display());
            }
            ok
        })
        .cloned()
        .collect();
    if dirs.is_empty() {
        eprintln!("rescan: no package locations remembered, run `scan <DIR>` first");
        return Ok(());
    }
    let summary = scan_dirs(ctx, &mut session, &dirs)?;
    report(&summary, &session);
    ctx.save_session(&mut session)
}

pub fn handle_list(ctx: &Context, long: bool) -> Result<()> {
    let session = ctx.load_session()?;
    for row in session.rows() {
        let mark = if row.imported { "imported" } else { "-" };
        if long {
            let changed = match session.archive_changed(&row.name) {
                Some(true) => "changed",
                Some(false) => "same",
                None => "?",
            };
            println!(
                "{:<40} {:>6} assets  {:<8}  index={}  archive={:<7}  {}",
                row.name,
                row.assets,
                mark,
                if row.indexed { "yes" } else { "no" },
                changed,
                row.source_path.display()
            );
        } else {
            println!("{:<40} {}", row.name, mark);
        }
    }
    Ok(())
}

pub fn handle_assets(ctx: &Context, package: &str) -> Result<()> {
    let session = ctx.load_session()?;
    let entry = session
        .catalog()
        .get(package)
        .ok_or_else(|| IndexError::UnknownPackage(package.to_string()))?;
    for (ordinal, a) in entry.assets.iter().enumerate() {
        println!("#{:<5} {:<48} {}", ordinal, a.asset_name, a.relative_path);
    }
    Ok(())
}

pub fn handle_search(ctx: &Context, term: &str) -> Result<()> {
    let session = ctx.load_session()?;
    let hits = session.search(term)?;
    if hits.is_empty() {
        eprintln!("search: no matches for {term:?}");
    }
    for h in hits {
        println!(
            "{:<32} {:<48} {}",
            h.package,
            h.asset_name.as_deref().unwrap_or("?"),
            h.relative_path.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub fn handle_stats(ctx: &Context, json: bool) -> Result<()> {
    let stats = ctx.load_session()?.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("owned packages:   {}", stats.owned);
        println!("imported:         {}", stats.imported);
        println!("full-text index:  {}", stats.indexed_packages);
        println!("assets:           {}", stats.assets);
        println!("search terms:     {}", stats.terms);
    }
    Ok(())
}

pub fn handle_mark_imported(ctx: &Context, package: &str) -> Result<()> {
    let mut session = ctx.load_session()?;
    session.mark_imported(package)?;
    eprintln!("mark-imported: {package}");
    ctx.save_session(&mut session)
}

pub fn handle_inspect(ctx: &Context, archive: &Path) -> Result<()> {
    for row in inspect(archive, &ctx.policy)? {
        match row.asset_path {
            Some(p) => println!("{}  {} bytes  -> {}", row.name, row.size, p),
            None => println!("{}  {} bytes", row.name, row.size),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(cache: &Path) -> Context {
        Context {
            store: CacheStore::new(cache),
            policy: IndexPolicy::default(),
            probe: Box::new(NoProject),
        }
    }

    #[test]
    fn scan_remembers_locations_for_rescan() {
        let synty = tempfile::tempdir().unwrap();
        std::fs::write(synty.path().join("readme.txt"), "nothing to index").unwrap();
        let cache = tempfile::tempdir().unwrap();
        let ctx = context(cache.path());

        handle_scan(&ctx, vec![synty.path().to_path_buf()]).unwrap();
        let session = ctx.load_session().unwrap();
        assert_eq!(session.locations(), [synty.path().canonicalize().unwrap()]);
        assert!(session.catalog().is_empty());
        handle_rescan(&ctx).unwrap();
    }

    #[test]
    fn missing_scan_dir_is_path_not_found() {
        let cache = tempfile::tempdir().unwrap();
        let ctx = context(cache.path());
        let gone = cache.path().join("gone");
        let err = handle_scan(&ctx, vec![gone.clone()]).unwrap_err();
        assert!(matches!(err, IndexError::PathNotFound(p) if p == gone));
    }

    #[test]
    fn unknown_package_is_reported() {
        let cache = tempfile::tempdir().unwrap();
        let ctx = context(cache.path());
        assert!(matches!(
            handle_mark_imported(&ctx, "PolygonNowhere"),
            Err(IndexError::UnknownPackage(_))
        ));
        assert!(matches!(
            handle_search(&ctx, "ab"),
            Err(IndexError::TermTooShort(3))
        ));
    }
}
