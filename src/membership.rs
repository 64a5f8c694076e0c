use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::classify::{classify, FileKind};
use crate::error::DiscoveryError;
use crate::path::{join_relative, normalize};
use crate::traits::MembershipTester;

/// Reads project references straight out of solution files.
///
/// Understands `.sln` `Project(...)` lines, `.slnx` `<Project Path=".."/>`
/// elements and `.slnf` JSON. Nothing else in the files is interpreted, so a
/// project pulled in only through a `ProjectReference` is not a member.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolutionMembership;

impl MembershipTester for SolutionMembership {
    fn contains_project(&self, target: &Path, project: &Path) -> Result<bool, DiscoveryError> {
        let project = normalize(project);
        Ok(project_paths(target)?.contains(&project))
    }

    fn contains_any_project(
        &self,
        target: &Path,
        projects: &[PathBuf],
    ) -> Result<bool, DiscoveryError> {
        let members = project_paths(target)?;
        Ok(projects.iter().any(|p| members.contains(&normalize(p))))
    }
}

/// Every project path `target` lists, normalized.
pub fn project_paths(target: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = classify(&name);
    if !kind.is_target() {
        return Err(membership_error(target, "not a solution or solution filter"));
    }

    let text = std::fs::read_to_string(target).map_err(|e| membership_error(target, e))?;
    let base = normalize(target.parent().unwrap_or(Path::new("")));

    match kind {
        FileKind::Solution if name.ends_with(".slnx") => Ok(capture(slnx_project(), &text, &base)),
        FileKind::Solution => Ok(capture(sln_project(), &text, &base)),
        _ => filter_projects(target, &text, &base),
    }
}

fn capture(re: &Regex, text: &str, base: &Path) -> Vec<PathBuf> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| join_relative(base, m.as_str()))
        .collect()
}

/// `Project("{type-guid}") = "Name", "relative\path.csproj", "{guid}"`
fn sln_project() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*Project\("[^"]*"\)\s*=\s*"[^"]*"\s*,\s*"([^"]+)""#)
            .expect("sln project pattern is valid")
    })
}

/// `<Project Path="relative/path.csproj" />`
fn slnx_project() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<Project\b[^>]*?\bPath\s*=\s*"([^"]+)""#)
            .expect("slnx project pattern is valid")
    })
}

#[derive(Deserialize)]
struct FilterFile {
    solution: FilterSolution,
}

#[derive(Deserialize)]
struct FilterSolution {
    path: String,
    #[serde(default)]
    projects: Vec<String>,
}

/// Filter files name their solution relative to themselves and their
/// projects relative to that solution.
fn filter_projects(target: &Path, text: &str, base: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let filter: FilterFile = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .map_err(|e| membership_error(target, e))?;
    let solution = join_relative(base, &filter.solution.path);
    let solution_dir = solution.parent().unwrap_or(base);
    Ok(filter
        .solution
        .projects
        .iter()
        .map(|p| join_relative(solution_dir, p))
        .collect())
}

fn membership_error(target: &Path, reason: impl ToString) -> DiscoveryError {
    DiscoveryError::Membership {
        target: target.to_path_buf(),
        reason: reason.to_string(),
    }
}
