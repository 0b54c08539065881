use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;

/// Sort an MP3 folder by its tags and keep a catalog of it.
#[derive(Debug, Parser)]
#[command(name = "tracksort", version)]
pub struct Cli {
    /// Clean the catalog (missing files, duplicated paths) instead of crawling
    #[arg(short, long)]
    pub clean: bool,
    /// The folder to sort
    #[arg(short, long, value_name = "DIR")]
    pub folder: Option<PathBuf>,
    /// Maximum number of misplaced files to collect per run
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
    /// Only update the catalog, do not move files
    #[arg(long)]
    pub no_move: bool,
    /// Catalog database file
    #[arg(long, value_name = "PATH", env = "TRACKSORT_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Crawl,
    Clean,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.clean { Mode::Clean } else { Mode::Crawl }
    }

    /// Flags win over every other settings source.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(folder) = &self.folder {
            settings.library.root = folder.clone();
        }
        if let Some(limit) = self.limit {
            settings.library.scan_limit = limit;
        }
        if self.no_move {
            settings.library.move_active = false;
        }
        if let Some(store) = &self.store {
            settings.store.path = Some(store.clone());
        }
    }
}
