use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DiscoveryError;
use crate::resolver::ResolutionOutcome;

/// What the upward walk (and, when enabled, the broad search) found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Deepest ancestor of the buffer holding a project file.
    pub project_dir: Option<PathBuf>,

    /// First ancestor of the buffer holding a solution file.
    pub solution_dir: Option<PathBuf>,

    /// Deepest ancestor of the buffer holding a solution filter.
    pub solution_filter_dir: Option<PathBuf>,

    /// Solutions in the solution directory, or everything the broad search found.
    pub solutions: Vec<PathBuf>,

    /// The solution filter seen on the way up, plus any the broad search found.
    pub solution_filters: Vec<PathBuf>,

    /// Projects in the project directory, or everything the broad search found.
    pub projects: Vec<PathBuf>,
}

/// Files collected by a broad search, in breadth-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explored {
    pub solutions: Vec<PathBuf>,
    pub solution_filters: Vec<PathBuf>,
    pub projects: Vec<PathBuf>,
}

/// The output of a completed discovery request.
#[derive(Debug)]
pub struct Discovery {
    /// Raw walk and search results.
    pub result: DiscoveryResult,

    /// Project files the candidates were filtered against.
    pub known_projects: Vec<PathBuf>,

    /// Targets that entered resolution, deduplicated.
    pub candidates: Vec<PathBuf>,

    /// The chosen target, the remaining ambiguity, or nothing.
    pub outcome: ResolutionOutcome,

    /// Non-fatal errors: unreadable directories and targets whose membership
    /// could not be checked. Use [`DiscoveryError::path`] for reporting.
    pub errors: Vec<DiscoveryError>,

    /// Scan statistics.
    pub stats: ScanStats,
}

impl Discovery {
    /// Directory a language server should be rooted at.
    ///
    /// The resolved target's directory, falling back to the project
    /// directory when no target was resolved.
    pub fn root_dir(&self) -> Option<&Path> {
        self.outcome
            .target()
            .and_then(Path::parent)
            .or(self.result.project_dir.as_deref())
    }
}

/// Statistics for a completed discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Directories successfully listed, across the upward walk and broad search.
    pub dirs_scanned: usize,

    /// Files seen in those directories, classified or not.
    pub files_seen: usize,

    /// Wall-clock time from start to resolution.
    pub duration: Duration,
}
