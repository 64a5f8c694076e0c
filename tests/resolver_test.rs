use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use slnroot::{DiscoveryError, MembershipTester, ResolutionOutcome, Resolver};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Membership from a fixed table; targets listed in `broken` fail to parse.
#[derive(Default)]
struct TableMembership {
    members: Vec<(PathBuf, PathBuf)>,
    broken: Vec<PathBuf>,
}

impl TableMembership {
    fn with(mut self, target: &str, project: &str) -> Self {
        self.members.push((p(target), p(project)));
        self
    }

    fn broken(mut self, target: &str) -> Self {
        self.broken.push(p(target));
        self
    }
}

impl MembershipTester for TableMembership {
    fn contains_project(&self, target: &Path, project: &Path) -> Result<bool, DiscoveryError> {
        if self.broken.iter().any(|b| b == target) {
            return Err(DiscoveryError::Membership {
                target: target.to_path_buf(),
                reason: "unparseable".into(),
            });
        }
        Ok(self.members.iter().any(|(t, pr)| t == target && pr == project))
    }
}

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

const A: &str = "/repo/A.sln";
const B: &str = "/repo/B.sln";
const P: &str = "/repo/src/P.csproj";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn membership_narrows_to_one() {
    let membership = TableMembership::default().with(A, P);
    let resolution = Resolver::new(&membership).resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
    assert!(resolution.errors.is_empty());
}

#[test]
fn both_containing_project_is_ambiguous() {
    let membership = TableMembership::default().with(A, P).with(B, P);
    let resolution = Resolver::new(&membership).resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Ambiguous(vec![p(A), p(B)]));
}

#[test]
fn choose_function_overrides_ambiguity() {
    let membership = TableMembership::default().with(A, P).with(B, P);
    let choose = |targets: &[PathBuf]| targets.iter().find(|t| t.ends_with("B.sln")).cloned();
    let resolution = Resolver::new(&membership)
        .choose(&choose)
        .resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(B)));
}

#[test]
fn choose_function_may_defer() {
    let membership = TableMembership::default().with(A, P).with(B, P);
    let defer = |_: &[PathBuf]| -> Option<PathBuf> { None };
    let resolution = Resolver::new(&membership)
        .choose(&defer)
        .resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Ambiguous(vec![p(A), p(B)]));
}

#[test]
fn choose_function_not_called_for_single_survivor() {
    let membership = TableMembership::default().with(A, P);
    let never = |_: &[PathBuf]| -> Option<PathBuf> { panic!("choose called without ambiguity") };
    let resolution = Resolver::new(&membership)
        .choose(&never)
        .resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
}

#[test]
fn no_known_projects_accepts_all() {
    let membership = TableMembership::default();

    let one = Resolver::new(&membership).resolve(&[p(A)], &[]);
    assert_eq!(one.outcome, ResolutionOutcome::Resolved(p(A)));

    let two = Resolver::new(&membership).resolve(&[p(A), p(B)], &[]);
    assert_eq!(two.outcome, ResolutionOutcome::Ambiguous(vec![p(A), p(B)]));
}

#[test]
fn exclude_predicate_runs_before_membership() {
    let membership = TableMembership::default().with(A, P).with(B, P);
    let exclude = |target: &Path| target.ends_with("A.sln");
    let resolution = Resolver::new(&membership)
        .exclude(&exclude)
        .resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(B)));
}

#[test]
fn empty_candidates_resolve_to_nothing() {
    let membership = TableMembership::default();
    let resolution = Resolver::new(&membership).resolve(&[], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::NoTargets);
}

#[test]
fn previous_target_is_the_fallback() {
    let membership = TableMembership::default();
    let previous = p(B);

    let resolution = Resolver::new(&membership)
        .previous(&previous)
        .resolve(&[p(A), p(B)], &[p(P)]);
    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(B)));

    let gone = p("/repo/Gone.sln");
    let resolution = Resolver::new(&membership)
        .previous(&gone)
        .resolve(&[p(A), p(B)], &[p(P)]);
    assert_eq!(resolution.outcome, ResolutionOutcome::NoTargets);
}

#[test]
fn previous_target_does_not_override_a_match() {
    let membership = TableMembership::default().with(A, P);
    let previous = p(B);
    let resolution = Resolver::new(&membership)
        .previous(&previous)
        .resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
}

#[test]
fn membership_failure_is_fail_closed() {
    let membership = TableMembership::default().with(B, P).broken(A);
    let resolution = Resolver::new(&membership).resolve(&[p(A), p(B)], &[p(P)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(B)));
    assert_eq!(resolution.errors.len(), 1);
    assert!(resolution.errors[0].is_recoverable());
    assert_eq!(resolution.errors[0].path(), Some(&p(A)));
}

#[test]
fn any_known_project_is_enough() {
    let other = "/repo/src/Other.csproj";
    let membership = TableMembership::default().with(A, other);
    let resolution = Resolver::new(&membership).resolve(&[p(A), p(B)], &[p(P), p(other)]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
}

#[test]
fn duplicate_candidates_collapse() {
    let membership = TableMembership::default();
    let resolution =
        Resolver::new(&membership).resolve(&[p(A), p("/repo/./src/../A.sln")], &[]);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
}

#[test]
fn require_turns_outcomes_into_errors() {
    assert_eq!(ResolutionOutcome::Resolved(p(A)).require().unwrap(), p(A));
    assert!(matches!(
        ResolutionOutcome::NoTargets.require(),
        Err(DiscoveryError::NoTargetsFound)
    ));
    match ResolutionOutcome::Ambiguous(vec![p(A), p(B)]).require() {
        Err(DiscoveryError::AmbiguousTargets(targets)) => assert_eq!(targets, vec![p(A), p(B)]),
        other => panic!("expected AmbiguousTargets, got {other:?}"),
    }
}

/// Loads each target once per call and refuses per-project lookups.
#[derive(Default)]
struct CountingMembership {
    loads: AtomicUsize,
}

impl MembershipTester for CountingMembership {
    fn contains_project(&self, _target: &Path, _project: &Path) -> Result<bool, DiscoveryError> {
        panic!("per-project lookup instead of one load per target")
    }

    fn contains_any_project(
        &self,
        target: &Path,
        projects: &[PathBuf],
    ) -> Result<bool, DiscoveryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(target.ends_with("A.sln") && projects.iter().any(|pr| pr.ends_with("Other.csproj")))
    }
}

#[test]
fn each_target_is_loaded_once() {
    let membership = CountingMembership::default();
    let known = [p(P), p("/repo/src/Other.csproj"), p("/repo/src/Third.csproj")];
    let resolution = Resolver::new(&membership).resolve(&[p(A), p(B)], &known);

    assert_eq!(resolution.outcome, ResolutionOutcome::Resolved(p(A)));
    assert_eq!(membership.loads.load(Ordering::SeqCst), 2);
}
