use std::path::Path;

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Cli, Mode};
use crate::config::Settings;
use crate::error::Result;
use crate::library::{
    CatalogCleaner, Reconciler, Relocator, SqliteStore, TagExtractor, TrackStore, prune_empty_dirs,
};
use crate::naming::RuleTable;

mod logging;
mod settings;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut settings = settings::load_settings();
    cli.apply(&mut settings);

    let store_path = settings.store_path();
    info!("catalog: {}", store_path.display());
    let mut store = SqliteStore::open(&store_path)?;

    match cli.mode() {
        Mode::Crawl => crawl(&settings, &mut store),
        Mode::Clean => clean(&settings, &mut store),
    }
}

/// Crawl, then move misplaced files, then drop emptied directories.
fn crawl(settings: &Settings, store: &mut SqliteStore) -> Result<()> {
    let library = &settings.library;
    let root = library.root.as_path();
    if !root_exists(root) {
        return Ok(());
    }

    let rules = RuleTable::new(settings.naming.resolve_rules()?);
    info!(rules = rules.rules().len(), "naming rules loaded");

    Reconciler::new(root, library, &rules, store, &TagExtractor).run()?;
    let moved = Relocator::new(root, library.batch_size, library.move_active, store).run()?;
    info!("relocated {moved} tracks");
    let pruned = prune_empty_dirs(root);
    info!("removed {pruned} empty directories");
    Ok(())
}

/// Sweep the catalog. Skipped when the root is missing, since every row
/// would look orphaned.
fn clean(settings: &Settings, store: &mut SqliteStore) -> Result<()> {
    let library = &settings.library;
    if !root_exists(&library.root) {
        return Ok(());
    }
    let stats = CatalogCleaner::new(&library.root, library.batch_size, store).clean()?;
    let remaining = store.count()?;
    info!(
        missing = stats.missing,
        duplicated = stats.duplicated,
        remaining,
        "catalog cleaned"
    );
    Ok(())
}

fn root_exists(root: &Path) -> bool {
    if root.is_dir() {
        return true;
    }
    error!("folder '{}' does not exist", root.display());
    false
}
