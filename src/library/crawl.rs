use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{Error, Result};
use crate::naming::RuleTable;

use super::extract::MetadataExtractor;
use super::model::Track;
use super::paths::{is_artifact, is_mp3, mtime_millis, relative_path};
use super::store::TrackStore;

/// Counters threaded through one crawl.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    /// MP3 files looked at (whether or not they needed a re-read).
    pub files_processed: usize,
    /// Rows written this run whose file is not where the rules want it.
    pub moves_pending: usize,
    /// Rows inserted or updated.
    pub written: usize,
    /// Files whose tags could not be read or did not validate.
    pub rejected: usize,
}

/// Walks the library and brings the catalog up to date with it.
pub struct Reconciler<'a, S, E> {
    root: &'a Path,
    settings: &'a LibrarySettings,
    rules: &'a RuleTable,
    store: &'a mut S,
    extractor: &'a E,
}

impl<'a, S: TrackStore, E: MetadataExtractor> Reconciler<'a, S, E> {
    pub fn new(
        root: &'a Path,
        settings: &'a LibrarySettings,
        rules: &'a RuleTable,
        store: &'a mut S,
        extractor: &'a E,
    ) -> Self {
        Self {
            root,
            settings,
            rules,
            store,
            extractor,
        }
    }

    /// Crawl the whole tree.
    ///
    /// Once `scan_limit` misplaced rows have been written, no further
    /// directories are entered and no further MP3s are read, so a single run
    /// never queues an unbounded number of moves.
    pub fn run(&mut self) -> Result<CrawlStats> {
        info!(root = %self.root.display(), scan_limit = self.settings.scan_limit, "start crawling");
        let mut stats = CrawlStats::default();

        let mut walker = WalkDir::new(self.root)
            .min_depth(1)
            .follow_links(self.settings.follow_links)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("cannot read directory entry: {err}");
                    continue;
                }
            };
            debug!("visiting {}", entry.path().display());

            if entry.file_type().is_dir() {
                if stats.moves_pending >= self.settings.scan_limit {
                    walker.skip_current_dir();
                }
                continue;
            }
            self.visit_file(entry.path(), &mut stats)?;
        }

        self.store.commit()?;
        info!(
            files = stats.files_processed,
            moves_pending = stats.moves_pending,
            written = stats.written,
            rejected = stats.rejected,
            "files analyzed"
        );
        Ok(stats)
    }

    fn visit_file(&mut self, path: &Path, stats: &mut CrawlStats) -> Result<()> {
        if !is_mp3(path) {
            if is_artifact(path, &self.settings.artifact_prefix) {
                info!("removing Finder artifact {}", path.display());
                if let Err(err) = fs::remove_file(path) {
                    warn!("could not remove {}: {err}", path.display());
                }
            } else {
                error!("file must be converted: {}", path.display());
            }
            return Ok(());
        }

        if stats.moves_pending >= self.settings.scan_limit {
            return Ok(());
        }

        let Some(rel) = relative_path(self.root, path) else {
            warn!(
                "skipping {}: not a UTF-8 path below {}",
                path.display(),
                self.root.display()
            );
            return Ok(());
        };
        let mtime = match mtime_millis(path) {
            Ok(mtime) => mtime,
            Err(err) => {
                warn!("cannot stat {}: {err}", path.display());
                return Ok(());
            }
        };

        let mut track = match self.store.find_by_path(&rel)? {
            Some(track) => track,
            None => Track::new(rel.clone()),
        };

        if track.modification_date != Some(mtime) {
            if track.modification_date.is_some() {
                info!("modification date changed, re-reading {rel}");
            }
            if self.read_tags(path, &rel, &mut track)? {
                // A misplaced file keeps its old checkpoint so the next crawl
                // looks at it again until it has been moved.
                if track.file_path_correct {
                    track.modification_date = Some(mtime);
                }
                self.save(&mut track, stats)?;
            } else {
                stats.rejected += 1;
            }
        }

        stats.files_processed += 1;
        if stats.files_processed % self.settings.batch_size.max(1) == 0 {
            info!(
                target: "progress",
                "read files: {} / files to move: {}",
                stats.files_processed,
                stats.moves_pending
            );
            self.store.commit()?;
        }
        Ok(())
    }

    /// Refresh `track` from the file's tags. `Ok(false)` means the file is
    /// skipped for this run; `Err` only for setup defects.
    fn read_tags(&self, path: &Path, rel: &str, track: &mut Track) -> Result<bool> {
        let tags = match self.extractor.extract(path) {
            Ok(tags) => tags,
            Err(err) => {
                error!("could not load tags of {}: {err}", path.display());
                return Ok(false);
            }
        };

        track.file_path = rel.to_string();
        track.apply_tags(tags);
        if let Err(err) = track.validate() {
            error!("file is not valid: {} - {err}", path.display());
            return Ok(false);
        }

        let target = self.rules.generate_name(track);
        if target.is_empty() {
            return Err(Error::EmptyTargetPath {
                path: path.to_path_buf(),
            });
        }
        track.file_path_correct = track.file_path == target;
        if !track.file_path_correct {
            info!("track must be moved to {target} -> {track}");
        }
        track.target_file_path = Some(target);
        Ok(true)
    }

    fn save(&mut self, track: &mut Track, stats: &mut CrawlStats) -> Result<()> {
        if track.artist.is_none() {
            return Ok(());
        }
        debug!("saving {track}");
        self.store.upsert(track)?;
        stats.written += 1;
        if !track.file_path_correct {
            stats.moves_pending += 1;
        }
        Ok(())
    }
}
