use std::path::{Path, PathBuf};

use crate::path::normalize;

/// Finds the version-control root above a path.
pub type VcsBoundary = dyn Fn(&Path) -> Option<PathBuf> + Send + Sync;

/// Nearest ancestor of `path` (or `path` itself) containing a `.git` entry.
///
/// `.git` may be a directory or a file, so worktrees and submodules stop at
/// their own root.
pub fn find_git_root(path: &Path) -> Option<PathBuf> {
    normalize(path)
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
