use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    // Scanning
    #[error("permission denied")]
    PermissionDenied(PathBuf),

    #[error("path not found")]
    NotFound(PathBuf),

    #[error("symlink loop")]
    SymlinkLoop(PathBuf),

    #[error("IO error")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a custom [`Scanner`](crate::Scanner) that has no better fit.
    #[error("scan error: {0}")]
    Scan(String),

    // Membership
    #[error("cannot read project membership: {reason}")]
    Membership { target: PathBuf, reason: String },

    // Fatal
    #[error("no buffer path provided")]
    MissingBuffer,

    #[error("cannot read starting directory")]
    InvalidStart {
        path: PathBuf,
        #[source]
        source: Box<DiscoveryError>,
    },

    #[error("discovery cancelled")]
    Cancelled,

    // Outcomes, for callers that want them as errors
    #[error("no solution or project files found")]
    NoTargetsFound,

    #[error("{} candidate targets remain, pick one", .0.len())]
    AmbiguousTargets(Vec<PathBuf>),
}

impl DiscoveryError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::Io { path: p, .. }
            | Self::InvalidStart { path: p, .. }
            | Self::Membership { target: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether discovery can continue after this error.
    ///
    /// Recoverable errors (an unreadable directory, a solution that cannot be
    /// parsed) are collected into [`Discovery::errors`](crate::Discovery::errors)
    /// and the walk keeps going. An unreadable directory counts as empty; an
    /// unparseable target counts as "does not contain the project".
    ///
    /// Fatal errors (unreadable start directory, cancellation) end the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::NotFound(_)
                | Self::SymlinkLoop(_)
                | Self::Io { .. }
                | Self::Scan(_)
                | Self::Membership { .. }
        )
    }
}
