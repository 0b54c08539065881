use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Path of `file` below `root` in catalog form: `/`-separated with a leading
/// `/`, e.g. `/Music/A/Artist/Album/001.Title.mp3`.
///
/// `None` when `file` is not below `root` or a component is not valid UTF-8;
/// such a path could not be resolved back from the catalog.
pub fn relative_path(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            out.push('/');
            out.push_str(part.to_str()?);
        }
    }
    Some(out)
}

/// Resolve a catalog path against the library root.
pub fn absolute_path(root: &Path, catalog_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in catalog_path.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

/// Modification time in milliseconds since the epoch.
pub fn mtime_millis(path: &Path) -> io::Result<i64> {
    let modified = fs::metadata(path)?.modified()?;
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    Ok(millis)
}

pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// Finder litter such as `.DS_Store`.
pub fn is_artifact(path: &Path, prefix: &str) -> bool {
    !prefix.is_empty()
        && path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|name| name.starts_with(prefix))
            .unwrap_or(false)
}
