use std::fs;
use std::path::Path;

use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Delete directories below `root` that are empty, deepest first, so a chain
/// of directories emptied by moves disappears in one pass. `root` itself and
/// all files are left alone. Returns the number of directories removed.
pub fn prune_empty_dirs(root: &Path) -> usize {
    info!("start cleaning directory: {}", root.display());
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("cannot read directory entry: {err}");
                None
            }
        })
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        let is_empty = match fs::read_dir(dir) {
            Ok(mut children) => children.next().is_none(),
            Err(err) => {
                warn!("cannot list {}: {err}", dir.display());
                false
            }
        };
        if is_empty {
            info!("delete folder {}", dir.display());
            match fs::remove_dir(dir) {
                Ok(()) => removed += 1,
                Err(err) => error!("could not delete directory {}: {err}", dir.display()),
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prune_removes_nested_empty_dirs_and_keeps_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b").join("c")).unwrap();
        fs::create_dir_all(root.join("keep").join("empty")).unwrap();
        fs::write(root.join("keep").join("song.mp3"), b"x").unwrap();

        let removed = prune_empty_dirs(root);

        assert_eq!(removed, 4);
        assert!(!root.join("a").exists());
        assert!(!root.join("keep").join("empty").exists());
        assert!(root.join("keep").join("song.mp3").exists());
        assert!(root.exists());
    }

    #[test]
    fn prune_on_empty_root_keeps_root() {
        let dir = tempdir().unwrap();
        assert_eq!(prune_empty_dirs(dir.path()), 0);
        assert!(dir.path().exists());
    }
}
