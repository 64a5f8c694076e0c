use std::path::PathBuf;

/// A single child produced by a [`Scanner`](crate::traits::Scanner) listing one directory.
///
/// Intentionally minimal. Classification into solutions, filters and projects
/// happens later in [`scan_dir`](crate::engine::scan_dir), so a custom scanner
/// only has to report what it sees.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry.
    pub path: PathBuf,

    /// The entry's file name.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,
}

impl Entry {
    /// Build an entry from a path, taking the name from its last component.
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, kind }
    }
}

/// The kind of a listed entry.
///
/// Symbolic links are reported as the kind of their target; the broad search
/// relies on its visited set rather than on link detection to stay finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}
