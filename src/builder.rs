use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::classify::ExclusionSet;
use crate::engine::{explore_root, verbose, CancelFlag, FsScanner, Walker};
use crate::error::DiscoveryError;
use crate::membership::SolutionMembership;
use crate::path::{dedup, normalize};
use crate::resolver::{ChooseFn, Resolver, TargetPredicate};
use crate::results::{Discovery, ScanStats};
use crate::traits::{MembershipTester, Scanner};
use crate::vcs::{find_git_root, VcsBoundary};

// ---------------------------------------------------------------------------
// DiscoveryBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a discovery request.
///
/// Created via [`slnroot::discover()`](crate::discover). Configure with
/// chained builder methods, then call [`run()`](DiscoveryBuilder::run).
///
/// # Example
///
/// ```rust,ignore
/// let discovery = slnroot::discover()
///     .buffer("/repo/src/Foo.cs")
///     .broad_search(true)
///     .ignore_target(|target| target.ends_with("Legacy.sln"))
///     .choose_target(|targets| targets.first().cloned())
///     .run()?;
///
/// if let Some(root) = discovery.root_dir() {
///     start_language_server(root);
/// }
/// ```
pub struct DiscoveryBuilder {
    buffer:           Option<PathBuf>,
    broad_search:     bool,
    ignore_target:    Option<Box<TargetPredicate>>,
    choose_target:    Option<Box<ChooseFn>>,
    previous_target:  Option<PathBuf>,
    debug_logging:    bool,
    exclusions:       ExclusionSet,
    scanner:          Option<Box<dyn Scanner>>,
    membership:       Option<Box<dyn MembershipTester>>,
    vcs_boundary:     Option<Box<VcsBoundary>>,
    stop_at_vcs_root: bool,
    cancel:           Option<CancelFlag>,
}

impl Default for DiscoveryBuilder {
    fn default() -> Self {
        Self {
            buffer:           None,
            broad_search:     false,
            ignore_target:    None,
            choose_target:    None,
            previous_target:  None,
            debug_logging:    false,
            exclusions:       ExclusionSet::default(),
            scanner:          None,
            membership:       None,
            vcs_boundary:     None,
            stop_at_vcs_root: false,
            cancel:           None,
        }
    }
}

impl DiscoveryBuilder {
    // ── Input ─────────────────────────────────────────────────────────────

    /// The file whose context is being resolved. Required.
    ///
    /// The file itself does not need to exist; its directory does.
    pub fn buffer(mut self, path: impl Into<PathBuf>) -> Self {
        self.buffer = Some(path.into());
        self
    }

    /// A target the user picked in an earlier session.
    ///
    /// Used only when filtering leaves no target, and only if it is still
    /// among the candidates.
    pub fn previous_target(mut self, path: impl Into<PathBuf>) -> Self {
        self.previous_target = Some(path.into());
        self
    }

    // ── Policy ────────────────────────────────────────────────────────────

    /// Search the whole solution or repository subtree instead of listing
    /// the solution directory alone. Off by default.
    pub fn broad_search(mut self, yes: bool) -> Self {
        self.broad_search = yes;
        self
    }

    /// Drop targets for which `predicate` returns `true`. By default no
    /// target is dropped.
    pub fn ignore_target(mut self, predicate: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.ignore_target = Some(Box::new(predicate));
        self
    }

    /// Pick between targets that are still ambiguous after filtering.
    ///
    /// Returning `None` defers, leaving [`ResolutionOutcome::Ambiguous`](crate::ResolutionOutcome::Ambiguous).
    /// By default every ambiguity is deferred.
    pub fn choose_target(
        mut self,
        choose: impl Fn(&[PathBuf]) -> Option<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        self.choose_target = Some(Box::new(choose));
        self
    }

    /// Directory-name tokens pruned from the broad search.
    /// Defaults to [`DEFAULT_EXCLUSIONS`](crate::DEFAULT_EXCLUSIONS).
    pub fn exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Stop the upward walk at the version-control root even if no solution
    /// was found there. Off by default: the walk continues to the filesystem root.
    pub fn stop_at_vcs_root(mut self, yes: bool) -> Self {
        self.stop_at_vcs_root = yes;
        self
    }

    /// Emit a `tracing` debug event for every directory scanned and every
    /// filtering decision. Off by default; errors are always logged at `warn`.
    pub fn debug_logging(mut self, yes: bool) -> Self {
        self.debug_logging = yes;
        self
    }

    // ── Collaborators ─────────────────────────────────────────────────────

    /// Replace the filesystem scanner. Defaults to [`FsScanner`].
    pub fn scanner(mut self, s: impl Scanner + 'static) -> Self {
        self.scanner = Some(Box::new(s));
        self
    }

    /// Replace the project-membership test. Defaults to [`SolutionMembership`].
    pub fn membership(mut self, m: impl MembershipTester + 'static) -> Self {
        self.membership = Some(Box::new(m));
        self
    }

    /// Replace version-control root detection. Defaults to [`find_git_root`].
    pub fn vcs_boundary(mut self, f: impl Fn(&Path) -> Option<PathBuf> + Send + Sync + 'static) -> Self {
        self.vcs_boundary = Some(Box::new(f));
        self
    }

    /// Check `flag` between directory scans and stop with
    /// [`DiscoveryError::Cancelled`] once it is set.
    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Run discovery and resolution.
    ///
    /// Blocks until done. Hosts that must stay responsive should call this
    /// off their main thread and pair it with [`cancel_flag`](Self::cancel_flag).
    ///
    /// # Errors
    ///
    /// Fatal errors only: no buffer, an unreadable starting directory, or
    /// cancellation. Unreadable directories elsewhere and unparseable targets
    /// are collected into [`Discovery::errors`]. "Nothing found" and "pick
    /// one" are outcomes, not errors; see [`ResolutionOutcome::require`](crate::ResolutionOutcome::require).
    pub fn run(self) -> Result<Discovery, DiscoveryError> {
        let buffer = normalize(&self.buffer.ok_or(DiscoveryError::MissingBuffer)?);
        let scanner: Box<dyn Scanner> = self.scanner.unwrap_or_else(|| Box::new(FsScanner));
        let membership: Box<dyn MembershipTester> =
            self.membership.unwrap_or_else(|| Box::new(SolutionMembership));
        let verbose = self.debug_logging;

        let start = Instant::now();

        let vcs_root = match &self.vcs_boundary {
            Some(boundary) => boundary(buffer.as_path()),
            None => find_git_root(&buffer),
        }
        .map(|root| normalize(&root));
        verbose!(verbose, buffer = %buffer.display(), vcs_root = ?vcs_root, "discovery started");

        let mut walker = Walker::new(scanner.as_ref(), &self.exclusions).verbose(verbose);
        if let Some(flag) = self.cancel {
            walker = walker.cancel_flag(flag);
        }

        let stop_at = if self.stop_at_vcs_root { vcs_root.as_deref() } else { None };
        let mut result = walker.walk_upward(&buffer, stop_at)?;
        let known_projects = result.projects.clone();

        let broad_root = if self.broad_search {
            explore_root(result.solution_dir.as_deref(), vcs_root.as_deref())
        } else {
            None
        };

        if let Some(root) = broad_root {
            verbose!(verbose, root = %root.display(), "broad search");
            let found = walker.explore(&root)?;
            result.solutions = found.solutions;
            let upward_filters = std::mem::take(&mut result.solution_filters);
            result.solution_filters = dedup(upward_filters.into_iter().chain(found.solution_filters));
            result.projects = found.projects;
        }

        let candidates = dedup(
            result
                .solutions
                .iter()
                .chain(&result.solution_filters)
                .cloned(),
        );
        verbose!(verbose, candidates = ?candidates, known_projects = ?known_projects, "resolving");

        let mut resolver = Resolver::new(membership.as_ref()).verbose(verbose);
        if let Some(exclude) = self.ignore_target.as_deref() {
            resolver = resolver.exclude(exclude);
        }
        if let Some(choose) = self.choose_target.as_deref() {
            resolver = resolver.choose(choose);
        }
        if let Some(previous) = self.previous_target.as_deref() {
            resolver = resolver.previous(previous);
        }
        let resolution = resolver.resolve(&candidates, &known_projects);

        let (mut errors, dirs_scanned, files_seen) = walker.into_parts();
        errors.extend(resolution.errors);

        verbose!(verbose, outcome = ?resolution.outcome, errors = errors.len(), "discovery finished");

        Ok(Discovery {
            result,
            known_projects,
            candidates,
            outcome: resolution.outcome,
            errors,
            stats: ScanStats {
                dirs_scanned,
                files_seen,
                duration: start.elapsed(),
            },
        })
    }
}
