/// What a file name means to discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.sln` or `.slnx`
    Solution,
    /// `.slnf`
    SolutionFilter,
    /// `.csproj`
    Project,
    Ordinary,
}

impl FileKind {
    /// Solutions and solution filters are the things a buffer can be rooted at.
    pub fn is_target(self) -> bool {
        matches!(self, Self::Solution | Self::SolutionFilter)
    }
}

/// Classify a file name by suffix. Case-sensitive.
///
/// Names starting with anything other than an alphanumeric or `_` are always
/// [`FileKind::Ordinary`].
///
/// ```rust
/// use slnroot::{classify, FileKind};
///
/// assert_eq!(classify("App.sln"), FileKind::Solution);
/// assert_eq!(classify("App.slnx"), FileKind::Solution);
/// assert_eq!(classify("Core.slnf"), FileKind::SolutionFilter);
/// assert_eq!(classify("App.csproj"), FileKind::Project);
/// assert_eq!(classify("App.SLN"), FileKind::Ordinary);
/// assert_eq!(classify("~App.sln"), FileKind::Ordinary);
/// ```
pub fn classify(name: &str) -> FileKind {
    if starts_with_symbol(name) {
        return FileKind::Ordinary;
    }
    if name.ends_with(".sln") || name.ends_with(".slnx") {
        FileKind::Solution
    } else if name.ends_with(".slnf") {
        FileKind::SolutionFilter
    } else if name.ends_with(".csproj") {
        FileKind::Project
    } else {
        FileKind::Ordinary
    }
}

/// `true` when the name does not start with an alphanumeric character or `_`.
/// Empty names count as symbol-prefixed.
pub fn starts_with_symbol(name: &str) -> bool {
    match name.chars().next() {
        Some(c) => !(c.is_alphanumeric() || c == '_'),
        None => true,
    }
}

/// Directory name tokens pruned from the broad search by default.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "bin",
    "obj",
    ".git",
    "node_modules",
    "wwwroot",
    "dist",
    "build",
    "debug",
    "properties",
];

/// Directory-name tokens that prune traversal.
///
/// A directory is excluded when its lower-cased name *contains* any token.
/// This is a substring match, so `"binaries"` and `"rebuild"` are excluded
/// by the default set along with `"bin"` and `"build"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    tokens: Vec<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

impl ExclusionSet {
    /// Build a set from arbitrary tokens. Tokens are lower-cased; empty
    /// tokens are dropped since they would match every name.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// A set that excludes nothing.
    pub fn empty() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        let lower = dir_name.to_lowercase();
        self.tokens.iter().any(|t| lower.contains(t.as_str()))
    }
}

/// Check a directory name against [`DEFAULT_EXCLUSIONS`].
pub fn is_excluded_directory(name: &str) -> bool {
    ExclusionSet::default().is_excluded(name)
}
