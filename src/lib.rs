//! # slnroot
//!
//! Find the solution a source file belongs to.
//!
//! Large .NET trees hold many `.sln`, `.slnx` and `.slnf` files. Given the
//! path of an open buffer, slnroot walks up to the nearest solution, optionally
//! searches the surrounding repository for every solution and solution filter,
//! keeps the ones whose project graph includes the buffer's project, and
//! either picks one or says it cannot.
//!
//! slnroot owns the traversal and the narrowing. It does **not** own the
//! editor integration, the language server lifecycle, persisted choices or
//! prompting. Those belong to the caller and plug in through
//! [`DiscoveryBuilder`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use slnroot::ResolutionOutcome;
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let repo = tmp.path();
//! fs::create_dir_all(repo.join("src")).unwrap();
//! fs::write(repo.join("src/App.csproj"), "<Project />").unwrap();
//! fs::write(
//!     repo.join("App.sln"),
//!     "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"src\\App.csproj\", \"{1}\"\nEndProject\n",
//! )
//! .unwrap();
//!
//! let discovery = slnroot::discover()
//!     .buffer(repo.join("src/Foo.cs"))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(discovery.outcome, ResolutionOutcome::Resolved(repo.join("App.sln")));
//! assert_eq!(discovery.root_dir(), Some(repo));
//! ```
//!
//! # Ambiguity
//!
//! When several targets contain the buffer's project and no
//! [`choose_target`](DiscoveryBuilder::choose_target) function settles it,
//! the outcome is [`ResolutionOutcome::Ambiguous`] with the survivors. The
//! host asks the user, remembers the answer, and passes it back through
//! [`previous_target`](DiscoveryBuilder::previous_target) or a choose
//! function next time.
//!
//! # Custom Collaborators
//!
//! Implement [`Scanner`] to discover over something other than the local
//! filesystem, and [`MembershipTester`] to answer "does this solution include
//! this project" with a real project-graph loader.

#![forbid(unsafe_code)]

pub mod engine;

mod builder;
mod classify;
mod entry;
mod error;
mod membership;
mod path;
mod resolver;
mod results;
mod traits;
mod vcs;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::DiscoveryBuilder;
pub use classify::{
    classify, is_excluded_directory, starts_with_symbol, ExclusionSet, FileKind,
    DEFAULT_EXCLUSIONS,
};
pub use engine::{explore_root, scan_dir, CancelFlag, FsScanner, Listing, Walker};
pub use entry::{Entry, EntryKind};
pub use error::DiscoveryError;
pub use membership::{project_paths, SolutionMembership};
pub use path::normalize;
pub use resolver::{ChooseFn, Resolution, ResolutionOutcome, Resolver, TargetPredicate};
pub use results::{Discovery, DiscoveryResult, Explored, ScanStats};
pub use traits::{MembershipTester, Scanner};
pub use vcs::{find_git_root, VcsBoundary};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`DiscoveryBuilder`] to configure and run a discovery request.
///
/// # Example
///
/// ```rust
/// let err = slnroot::discover().run().unwrap_err();
/// assert!(matches!(err, slnroot::DiscoveryError::MissingBuffer));
/// ```
pub fn discover() -> DiscoveryBuilder {
    DiscoveryBuilder::default()
}
