use std::path::Path;

use tracing::info;

use crate::error::Result;

use super::paths::absolute_path;
use super::store::{ScanOrder, TrackFilter, TrackStore};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub missing: usize,
    pub duplicated: usize,
}

/// Removes catalog rows that no longer stand for exactly one real file.
pub struct CatalogCleaner<'a, S> {
    root: &'a Path,
    batch_size: usize,
    store: &'a mut S,
}

impl<'a, S: TrackStore> CatalogCleaner<'a, S> {
    pub fn new(root: &'a Path, batch_size: usize, store: &'a mut S) -> Self {
        Self {
            root,
            batch_size,
            store,
        }
    }

    /// Both sweeps, missing files first.
    pub fn clean(&mut self) -> Result<CleanStats> {
        info!(target: "progress", "start cleaning the catalog");
        let missing = self.remove_missing_files()?;
        let duplicated = self.remove_duplicate_paths()?;
        Ok(CleanStats {
            missing,
            duplicated,
        })
    }

    /// Delete every row whose file does not exist. Rows are collected over a
    /// full paged scan and deleted together at the end, so paging offsets stay
    /// valid while scanning.
    pub fn remove_missing_files(&mut self) -> Result<usize> {
        let mut doomed = Vec::new();
        let mut offset = 0;
        loop {
            info!(target: "progress", "checked files: {offset}");
            let page = self
                .store
                .scan_page(ScanOrder::Id, offset, self.batch_size)?;
            if page.is_empty() {
                break;
            }
            offset += page.len();
            for track in page {
                if !absolute_path(self.root, &track.file_path).exists() {
                    info!("removing {track}");
                    doomed.push(track);
                }
            }
        }

        if !doomed.is_empty() {
            self.store.delete(&doomed)?;
            self.store.commit()?;
        }
        Ok(doomed.len())
    }

    /// Delete all rows of every path stored more than once. None of them is
    /// kept; the next crawl recreates a single row for the file.
    pub fn remove_duplicate_paths(&mut self) -> Result<usize> {
        let mut removed = 0;
        loop {
            info!(target: "progress", "delete duplicated paths from catalog");
            let groups = self.store.group_by_path_with_count(self.batch_size)?;
            let duplicated: Vec<(String, u64)> =
                groups.into_iter().filter(|(_, count)| *count > 1).collect();
            if duplicated.is_empty() {
                break;
            }

            for (path, count) in duplicated {
                let rows = self
                    .store
                    .filter_page(&TrackFilter::Path(path), count as usize)?;
                for row in &rows {
                    info!("remove from catalog: {row}");
                }
                self.store.delete(&rows)?;
                removed += rows.len();
            }
            self.store.commit()?;
        }
        Ok(removed)
    }
}
