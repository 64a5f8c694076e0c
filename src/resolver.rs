use std::path::{Path, PathBuf};

use crate::engine::verbose;
use crate::error::DiscoveryError;
use crate::path::{dedup, normalize};
use crate::traits::MembershipTester;

/// Caller policy: `true` drops the target before membership filtering.
pub type TargetPredicate = dyn Fn(&Path) -> bool + Send + Sync;

/// Caller policy: pick one of several viable targets, or `None` to defer.
pub type ChooseFn = dyn Fn(&[PathBuf]) -> Option<PathBuf> + Send + Sync;

/// Result of narrowing candidate targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Exactly one target applies.
    Resolved(PathBuf),

    /// Several targets survived filtering and nothing chose between them.
    /// The host should ask the user.
    Ambiguous(Vec<PathBuf>),

    /// No target applies.
    NoTargets,
}

impl ResolutionOutcome {
    /// The resolved target, if any.
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::Resolved(path) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Convert into a `Result` for callers that treat "nothing found" and
    /// "pick one" as errors.
    pub fn require(self) -> Result<PathBuf, DiscoveryError> {
        match self {
            Self::Resolved(path) => Ok(path),
            Self::Ambiguous(candidates) => Err(DiscoveryError::AmbiguousTargets(candidates)),
            Self::NoTargets => Err(DiscoveryError::NoTargetsFound),
        }
    }
}

/// A [`ResolutionOutcome`] plus the membership errors hit along the way.
#[derive(Debug)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    pub errors: Vec<DiscoveryError>,
}

/// Narrows candidate targets to one.
///
/// Filtering runs first: excluded targets are dropped, and when project files
/// are known only targets whose project graph includes one of them are kept.
/// The choose function is consulted only if more than one target survives.
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use slnroot::{DiscoveryError, MembershipTester, ResolutionOutcome, Resolver};
///
/// struct OnlyApp;
///
/// impl MembershipTester for OnlyApp {
///     fn contains_project(&self, target: &Path, _project: &Path) -> Result<bool, DiscoveryError> {
///         Ok(target.ends_with("App.sln"))
///     }
/// }
///
/// let candidates = vec![PathBuf::from("/repo/App.sln"), PathBuf::from("/repo/Tools.sln")];
/// let known = vec![PathBuf::from("/repo/src/App.csproj")];
///
/// let resolution = Resolver::new(&OnlyApp).resolve(&candidates, &known);
/// assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(PathBuf::from("/repo/App.sln")));
/// ```
pub struct Resolver<'a> {
    membership: &'a dyn MembershipTester,
    exclude:    Option<&'a TargetPredicate>,
    choose:     Option<&'a ChooseFn>,
    previous:   Option<&'a Path>,
    verbose:    bool,
}

impl<'a> Resolver<'a> {
    pub fn new(membership: &'a dyn MembershipTester) -> Self {
        Self {
            membership,
            exclude: None,
            choose: None,
            previous: None,
            verbose: false,
        }
    }

    /// Drop targets for which `predicate` returns `true`. Default: keep all.
    pub fn exclude(mut self, predicate: &'a TargetPredicate) -> Self {
        self.exclude = Some(predicate);
        self
    }

    /// Break ties between surviving targets. Default: defer to the caller.
    pub fn choose(mut self, choose: &'a ChooseFn) -> Self {
        self.choose = Some(choose);
        self
    }

    /// A target chosen earlier. Used when filtering leaves nothing, as long
    /// as it is still among the candidates.
    pub fn previous(mut self, target: &'a Path) -> Self {
        self.previous = Some(target);
        self
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    /// Resolve `candidates` against the project files known to own the buffer.
    ///
    /// An empty `known_projects` accepts every non-excluded candidate.
    pub fn resolve(&self, candidates: &[PathBuf], known_projects: &[PathBuf]) -> Resolution {
        let candidates = dedup(candidates.iter().cloned());
        let known_projects = dedup(known_projects.iter().cloned());
        let mut errors = Vec::new();

        let mut filtered = Vec::new();
        for candidate in &candidates {
            if self.exclude.is_some_and(|exclude| exclude(candidate.as_path())) {
                verbose!(self.verbose, target = %candidate.display(), "target excluded");
                continue;
            }
            if known_projects.is_empty() || self.contains_any(candidate, &known_projects, &mut errors) {
                filtered.push(candidate.clone());
            } else {
                verbose!(self.verbose, target = %candidate.display(), "target does not contain a known project");
            }
        }

        let outcome = match filtered.len() {
            0 => match self.previous.map(normalize) {
                Some(previous) if candidates.contains(&previous) => {
                    verbose!(self.verbose, target = %previous.display(), "falling back to previous target");
                    ResolutionOutcome::Resolved(previous)
                }
                _ => ResolutionOutcome::NoTargets,
            },
            1 => ResolutionOutcome::Resolved(filtered.remove(0)),
            _ => match self.choose.and_then(|choose| choose(filtered.as_slice())) {
                Some(choice) => {
                    verbose!(self.verbose, target = %choice.display(), "target chosen");
                    ResolutionOutcome::Resolved(normalize(&choice))
                }
                None => ResolutionOutcome::Ambiguous(filtered),
            },
        };

        Resolution { outcome, errors }
    }

    fn contains_any(
        &self,
        target: &Path,
        projects: &[PathBuf],
        errors: &mut Vec<DiscoveryError>,
    ) -> bool {
        match self.membership.contains_any_project(target, projects) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, target = %target.display(), "membership check failed");
                errors.push(err);
                false
            }
        }
    }
}
