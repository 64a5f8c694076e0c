use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::WalkBuilder;

use crate::classify::{classify, starts_with_symbol, ExclusionSet, FileKind};
use crate::entry::{Entry, EntryKind};
use crate::error::DiscoveryError;
use crate::path::normalize;
use crate::results::{DiscoveryResult, Explored};
use crate::traits::Scanner;

/// Emit a `debug` event only when verbose tracing was requested.
macro_rules! verbose {
    ($on:expr, $($arg:tt)+) => {
        if $on {
            tracing::debug!($($arg)+);
        }
    };
}
pub(crate) use verbose;

// ---------------------------------------------------------------------------
// FsScanner
// ---------------------------------------------------------------------------

/// Lists local directories one level deep.
///
/// Standard ignore filters are off: a `.gitignore`d `obj/` should still be
/// pruned by name, not by git rules, and a gitignored solution is still a
/// solution. Links are followed and children come back sorted by file name,
/// so repeated runs see the same order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsScanner;

impl Scanner for FsScanner {
    fn scan(&self, dir: &Path) -> Result<Vec<Entry>, DiscoveryError> {
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(true)
            .same_file_system(false)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut entries = Vec::new();
        for res in builder.build() {
            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    // Depth 0 is the directory itself: nothing to list.
                    let listing_failed = e.depth().map_or(true, |depth| depth == 0);
                    let err = map_ignore_error(e, dir);
                    if listing_failed {
                        return Err(err);
                    }
                    tracing::debug!(error = %err, path = ?err.path(), "skipping unreadable entry");
                    continue;
                }
            };

            // Skip the directory itself
            if entry.depth() == 0 {
                continue;
            }

            let kind = match entry.file_type() {
                Some(ft) if ft.is_dir() => EntryKind::Dir,
                Some(ft) if ft.is_file() => EntryKind::File,
                _ => EntryKind::Other,
            };

            entries.push(Entry {
                path: entry.path().to_path_buf(),
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }
}

/// Flatten `ignore`'s nested error into a [`DiscoveryError`], keeping the
/// innermost path. Errors that carry no path are attributed to `dir`.
fn map_ignore_error(e: ignore::Error, dir: &Path) -> DiscoveryError {
    match e {
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            map_ignore_error(*err, dir)
        }
        ignore::Error::WithPath { path, err } => map_ignore_error(*err, &path),
        ignore::Error::Loop { child, .. } => DiscoveryError::SymlinkLoop(child),
        ignore::Error::Io(source) => map_io_error(dir.to_path_buf(), source),
        other => DiscoveryError::Scan(other.to_string()),
    }
}

fn map_io_error(path: PathBuf, source: std::io::Error) -> DiscoveryError {
    match source.kind() {
        std::io::ErrorKind::PermissionDenied => DiscoveryError::PermissionDenied(path),
        std::io::ErrorKind::NotFound => DiscoveryError::NotFound(path),
        _ => DiscoveryError::Io { path, source },
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One directory's children, classified.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
    pub solutions: Vec<PathBuf>,
    pub solution_filters: Vec<PathBuf>,
    pub projects: Vec<PathBuf>,
    /// Subdirectories worth descending into: not excluded, not symbol-prefixed.
    pub subdirs: Vec<PathBuf>,
    /// Number of files seen, classified or not.
    pub files: usize,
}

/// Scan `dir` and sort its children into solutions, filters, projects and
/// traversable subdirectories. All paths are normalized.
pub fn scan_dir(
    scanner: &dyn Scanner,
    dir: &Path,
    exclusions: &ExclusionSet,
) -> Result<Listing, DiscoveryError> {
    let mut listing = Listing::default();
    for entry in scanner.scan(dir)? {
        match entry.kind {
            EntryKind::File => {
                listing.files += 1;
                let path = normalize(&entry.path);
                match classify(&entry.name) {
                    FileKind::Solution => listing.solutions.push(path),
                    FileKind::SolutionFilter => listing.solution_filters.push(path),
                    FileKind::Project => listing.projects.push(path),
                    FileKind::Ordinary => {}
                }
            }
            EntryKind::Dir => {
                if !is_pruned(&entry, exclusions) {
                    listing.subdirs.push(normalize(&entry.path));
                }
            }
            EntryKind::Other => {}
        }
    }
    Ok(listing)
}

/// A directory is pruned by its own name or, when it is a link, by the name
/// of the directory it resolves to. Only the final component is checked, so
/// a link into a subdirectory of `bin/` still gets through.
fn is_pruned(entry: &Entry, exclusions: &ExclusionSet) -> bool {
    let pruned = |name: &str| starts_with_symbol(name) || exclusions.is_excluded(name);
    if pruned(&entry.name) {
        return true;
    }
    match std::fs::canonicalize(&entry.path) {
        Ok(real) => real
            .file_name()
            .is_some_and(|name| pruned(&name.to_string_lossy())),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// CancelFlag
// ---------------------------------------------------------------------------

/// Cooperative cancellation shared between a host and a running discovery.
///
/// Checked before every directory scan. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Runs the upward walk and the broad search for one discovery request.
///
/// Owns the request's bookkeeping: recoverable errors and scan counters
/// accumulate across both phases and are handed back by
/// [`into_parts`](Walker::into_parts).
pub struct Walker<'a> {
    scanner:      &'a dyn Scanner,
    exclusions:   &'a ExclusionSet,
    cancel:       Option<CancelFlag>,
    verbose:      bool,
    errors:       Vec<DiscoveryError>,
    dirs_scanned: usize,
    files_seen:   usize,
}

impl<'a> Walker<'a> {
    pub fn new(scanner: &'a dyn Scanner, exclusions: &'a ExclusionSet) -> Self {
        Self {
            scanner,
            exclusions,
            cancel: None,
            verbose: false,
            errors: Vec::new(),
            dirs_scanned: 0,
            files_seen: 0,
        }
    }

    /// Emit a `debug` event for every directory scanned.
    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Recoverable errors recorded so far.
    pub fn errors(&self) -> &[DiscoveryError] {
        &self.errors
    }

    /// `(errors, dirs_scanned, files_seen)`
    pub fn into_parts(self) -> (Vec<DiscoveryError>, usize, usize) {
        (self.errors, self.dirs_scanned, self.files_seen)
    }

    // ── Upward walk ───────────────────────────────────────────────────────

    /// Walk from the directory containing `start_file` toward the filesystem
    /// root, one level at a time.
    ///
    /// The deepest directory holding a project file becomes the project
    /// directory and the deepest solution filter is recorded; neither is
    /// overwritten by a shallower level. The walk stops at the first
    /// directory containing a solution, at `stop_at` if given, or at the
    /// filesystem root.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::InvalidStart`] if the starting directory cannot be
    /// listed, [`DiscoveryError::Cancelled`] if cancelled. Unreadable
    /// ancestors are recorded and skipped.
    pub fn walk_upward(
        &mut self,
        start_file: &Path,
        stop_at: Option<&Path>,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let start_file = normalize(start_file);
        let stop_at = stop_at.map(normalize);
        let mut dir = match start_file.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(DiscoveryError::InvalidStart {
                    source: Box::new(DiscoveryError::NotFound(start_file.clone())),
                    path: start_file,
                })
            }
        };

        let mut result = DiscoveryResult::default();
        let mut first = true;

        loop {
            self.check_cancelled()?;
            let listing = match self.scan(&dir) {
                Ok(listing) => listing,
                Err(err) if first => {
                    return Err(DiscoveryError::InvalidStart {
                        path: dir,
                        source: Box::new(err),
                    })
                }
                Err(err) => {
                    self.record(err);
                    Listing::default()
                }
            };
            first = false;

            if result.project_dir.is_none() && !listing.projects.is_empty() {
                verbose!(self.verbose, dir = %dir.display(), projects = listing.projects.len(), "project directory");
                result.project_dir = Some(dir.clone());
                result.projects = listing.projects;
            }

            if result.solution_filter_dir.is_none() {
                if let Some(filter) = listing.solution_filters.into_iter().next() {
                    verbose!(self.verbose, filter = %filter.display(), "solution filter");
                    result.solution_filter_dir = Some(dir.clone());
                    result.solution_filters.push(filter);
                }
            }

            if !listing.solutions.is_empty() {
                verbose!(self.verbose, dir = %dir.display(), solutions = listing.solutions.len(), "solution directory");
                result.solution_dir = Some(dir);
                result.solutions = listing.solutions;
                break;
            }

            if stop_at.as_deref() == Some(dir.as_path()) {
                verbose!(self.verbose, dir = %dir.display(), "reached version-control root");
                break;
            }

            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(result)
    }

    // ── Broad search ──────────────────────────────────────────────────────

    /// Breadth-first search of everything under `root` for solutions,
    /// solution filters and projects.
    ///
    /// Excluded and symbol-prefixed directories are never entered. Each
    /// directory is visited once, keyed by its canonical path, which keeps
    /// the search finite when symbolic links loop back to an ancestor.
    /// Output lists are deduplicated and in breadth-first order.
    ///
    /// # Errors
    ///
    /// Only [`DiscoveryError::Cancelled`]. Unreadable directories are
    /// recorded and treated as empty.
    pub fn explore(&mut self, root: &Path) -> Result<Explored, DiscoveryError> {
        let mut queue = VecDeque::from([normalize(root)]);
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut found = Explored::default();

        while let Some(dir) = queue.pop_front() {
            self.check_cancelled()?;

            if !visited.insert(visit_key(&dir)) {
                verbose!(self.verbose, dir = %dir.display(), "already visited");
                continue;
            }

            let listing = match self.scan(&dir) {
                Ok(listing) => listing,
                Err(err) => {
                    self.record(err);
                    continue;
                }
            };

            let mut keep = |paths: Vec<PathBuf>, out: &mut Vec<PathBuf>| {
                out.extend(paths.into_iter().filter(|p| seen.insert(p.clone())));
            };
            keep(listing.solutions, &mut found.solutions);
            keep(listing.solution_filters, &mut found.solution_filters);
            keep(listing.projects, &mut found.projects);

            queue.extend(listing.subdirs);
        }

        verbose!(
            self.verbose,
            root = %root.display(),
            solutions = found.solutions.len(),
            solution_filters = found.solution_filters.len(),
            projects = found.projects.len(),
            "broad search finished"
        );
        Ok(found)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn scan(&mut self, dir: &Path) -> Result<Listing, DiscoveryError> {
        verbose!(self.verbose, dir = %dir.display(), "scanning");
        let listing = scan_dir(self.scanner, dir, self.exclusions)?;
        self.dirs_scanned += 1;
        self.files_seen += listing.files;
        Ok(listing)
    }

    fn record(&mut self, err: DiscoveryError) {
        tracing::warn!(error = %err, path = ?err.path(), "directory skipped");
        self.errors.push(err);
    }

    fn check_cancelled(&self) -> Result<(), DiscoveryError> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(DiscoveryError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Canonical form of `dir` for the visited set. Falls back to the lexical
/// path for directories the OS cannot resolve (custom scanners).
fn visit_key(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Pick the directory the broad search starts from.
///
/// A solution directory inside the version-control root widens to the
/// version-control root; a solution directory elsewhere is used as is.
/// Without a solution directory the version-control root is used. `None`
/// when neither exists.
pub fn explore_root(solution_dir: Option<&Path>, vcs_root: Option<&Path>) -> Option<PathBuf> {
    match (solution_dir, vcs_root) {
        (Some(sln), Some(vcs)) if sln.starts_with(vcs) => Some(vcs.to_path_buf()),
        (Some(sln), _) => Some(sln.to_path_buf()),
        (None, Some(vcs)) => Some(vcs.to_path_buf()),
        (None, None) => None,
    }
}
