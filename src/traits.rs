use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::error::DiscoveryError;

/// Lists the immediate children of one directory.
///
/// Implement this to run discovery over something other than the local
/// filesystem (an in-memory tree in tests, a remote workspace, a VFS).
/// The default is [`FsScanner`](crate::FsScanner).
///
/// # Thread Safety
///
/// `Send + Sync` are required so a host can move a configured discovery
/// request onto a worker thread.
///
/// # Error Handling
///
/// Return `Err` only when the directory itself cannot be listed. The caller
/// records the error and treats the directory as empty; one unreadable
/// directory never aborts a broad search. Problems with individual children
/// should be skipped by the scanner.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use slnroot::{DiscoveryError, Entry, EntryKind, Scanner};
///
/// struct OneSolution;
///
/// impl Scanner for OneSolution {
///     fn scan(&self, dir: &Path) -> Result<Vec<Entry>, DiscoveryError> {
///         Ok(vec![Entry::new(dir.join("App.sln"), EntryKind::File)])
///     }
/// }
///
/// let entries = OneSolution.scan(Path::new("/repo")).unwrap();
/// assert_eq!(entries[0].name, "App.sln");
/// ```
pub trait Scanner: Send + Sync {
    /// List `dir` without recursing.
    fn scan(&self, dir: &Path) -> Result<Vec<Entry>, DiscoveryError>;
}

/// Answers whether a solution or solution filter includes a project.
///
/// The default is [`SolutionMembership`](crate::SolutionMembership), which
/// reads project references out of `.sln`, `.slnx` and `.slnf` files. Hosts
/// with a real project-graph loader can plug it in here.
///
/// An `Err` is treated as "not a member" and reported through
/// [`Discovery::errors`](crate::Discovery::errors).
pub trait MembershipTester: Send + Sync {
    /// `true` if `target`'s project graph includes `project`.
    fn contains_project(&self, target: &Path, project: &Path) -> Result<bool, DiscoveryError>;

    /// `true` if `target`'s project graph includes any of `projects`.
    ///
    /// The default asks [`contains_project`](Self::contains_project) once per
    /// project and stops at the first hit or error. Override it when loading
    /// a target is expensive.
    fn contains_any_project(
        &self,
        target: &Path,
        projects: &[PathBuf],
    ) -> Result<bool, DiscoveryError> {
        for project in projects {
            if self.contains_project(target, project)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
