use std::path::{Path, PathBuf};
use vigil_core::paths::VIGIL_DIR;

/// Resolve the project root.
///
/// `--root` / `VIGIL_ROOT` wins; otherwise the nearest ancestor of the
/// working directory holding `.vigil/`; otherwise the working directory.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marked_ancestor(&cwd).unwrap_or(cwd)
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(VIGIL_DIR).is_dir())
        .map(Path::to_path_buf)
}
