use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and lexically clean.
///
/// Relative paths are joined onto the current directory; `.` components are
/// dropped and `..` pops the previous component. Symbolic links are left
/// alone, so two normalized paths can still name the same directory.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a path written inside a solution file against `base`.
///
/// Solution files are usually authored on Windows, so `\` separators are
/// rewritten before joining.
pub(crate) fn join_relative(base: &Path, raw: &str) -> PathBuf {
    normalize(&base.join(raw.trim().replace('\\', "/")))
}

/// Keep the first occurrence of every path, preserving order.
pub(crate) fn dedup(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = std::collections::HashSet::new();
    paths
        .into_iter()
        .map(|p| normalize(&p))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
