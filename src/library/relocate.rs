use std::fs;
use std::io;
use std::path::Path;

use tracing::{error, info, warn};

use crate::error::Result;

use super::model::Track;
use super::paths::{absolute_path, mtime_millis};
use super::store::{TrackFilter, TrackStore};

/// Drains misplaced rows and moves their files into place.
///
/// Every drained row is marked as relocated, even when the move was skipped
/// (`move_active = false`) or failed. The catalog then disagrees with the disk
/// until the next crawl and clean pick the file up again.
pub struct Relocator<'a, S> {
    root: &'a Path,
    batch_size: usize,
    move_active: bool,
    store: &'a mut S,
}

impl<'a, S: TrackStore> Relocator<'a, S> {
    pub fn new(root: &'a Path, batch_size: usize, move_active: bool, store: &'a mut S) -> Self {
        Self {
            root,
            batch_size,
            move_active,
            store,
        }
    }

    /// Returns the number of rows relocated.
    pub fn run(&mut self) -> Result<usize> {
        let mut count = 0;
        loop {
            let batch = self
                .store
                .filter_page(&TrackFilter::Misplaced, self.batch_size)?;
            if batch.is_empty() {
                break;
            }
            count += batch.len();
            for mut track in batch {
                self.relocate(&mut track)?;
            }
            info!(target: "progress", "moved files: {count}");
            self.store.commit()?;
        }
        Ok(count)
    }

    fn relocate(&mut self, track: &mut Track) -> Result<()> {
        let target = track
            .target_file_path
            .clone()
            .unwrap_or_else(|| track.file_path.clone());
        let src = absolute_path(self.root, &track.file_path);
        let dst = absolute_path(self.root, &target);

        let mut ready = src.exists();
        if !ready {
            warn!("source {} is gone", src.display());
        }
        if let Some(parent) = dst.parent() {
            if !parent.exists() {
                if let Err(err) = fs::create_dir_all(parent) {
                    error!("could not create {}: {err}", parent.display());
                    ready = false;
                }
            }
        }

        if ready {
            if self.move_active {
                info!("move {} to {}", src.display(), dst.display());
                if let Err(err) = move_file(&src, &dst) {
                    error!("could not move {} to {}: {err}", src.display(), dst.display());
                }
            } else {
                info!("moves disabled, leaving {} in place", src.display());
            }
        }

        track.file_path = target;
        track.file_path_correct = true;
        track.modification_date = mtime_millis(&dst).ok();
        self.store.upsert(track)?;
        Ok(())
    }
}

/// Rename, falling back to copy + delete across filesystems. Never
/// overwrites an existing file.
fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        ));
    }
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    fs::copy(src, dst)?;
    fs::remove_file(src)
}
