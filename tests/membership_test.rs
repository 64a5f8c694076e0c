use std::fs;
use std::path::{Path, PathBuf};

use slnroot::{project_paths, DiscoveryError, MembershipTester, SolutionMembership};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const SLN: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "src", "src", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "App", "src\App\App.csproj", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "App.Tests", "test\App.Tests\App.Tests.csproj", "{33333333-3333-3333-3333-333333333333}"
EndProject
Global
EndGlobal
"#;

#[test]
fn sln_project_lines_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("App.sln"), SLN);

    let projects = project_paths(&root.join("App.sln")).unwrap();

    assert!(projects.contains(&root.join("src/App/App.csproj")));
    assert!(projects.contains(&root.join("test/App.Tests/App.Tests.csproj")));
    assert!(SolutionMembership
        .contains_project(&root.join("App.sln"), &root.join("src/App/App.csproj"))
        .unwrap());
    assert!(!SolutionMembership
        .contains_project(&root.join("App.sln"), &root.join("src/Other/Other.csproj"))
        .unwrap());
}

#[test]
fn sln_paths_may_climb_out_of_the_solution_dir() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("build/All.sln"),
        "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Lib\", \"..\\lib\\Lib.csproj\", \"{1}\"\nEndProject\n",
    );

    assert!(SolutionMembership
        .contains_project(&root.join("build/All.sln"), &root.join("lib/Lib.csproj"))
        .unwrap());
}

#[test]
fn slnx_project_elements_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("App.slnx"),
        r#"<Solution>
  <Folder Name="/src/">
    <Project Path="src/App/App.csproj" />
    <Project Type="Classic C#" Path="src\Legacy\Legacy.csproj" />
  </Folder>
</Solution>
"#,
    );

    let projects = project_paths(&root.join("App.slnx")).unwrap();

    assert_eq!(
        projects,
        vec![root.join("src/App/App.csproj"), root.join("src/Legacy/Legacy.csproj")]
    );
}

#[test]
fn slnf_projects_are_relative_to_the_solution() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("App.sln"), SLN);
    write(
        &root.join("filters/Core.slnf"),
        "\u{feff}{\n  \"solution\": {\n    \"path\": \"..\\\\App.sln\",\n    \"projects\": [\n      \"src\\\\App\\\\App.csproj\"\n    ]\n  }\n}\n",
    );

    let filter = root.join("filters/Core.slnf");

    assert_eq!(project_paths(&filter).unwrap(), vec![root.join("src/App/App.csproj")]);
    assert!(!SolutionMembership
        .contains_project(&filter, &root.join("test/App.Tests/App.Tests.csproj"))
        .unwrap());
}

#[test]
fn malformed_filter_is_a_membership_error() {
    let dir = tempfile::tempdir().unwrap();
    let filter = dir.path().join("Broken.slnf");
    write(&filter, "{ \"solution\": ");

    let err = SolutionMembership
        .contains_project(&filter, &dir.path().join("App.csproj"))
        .unwrap_err();

    assert!(err.is_recoverable());
    assert!(matches!(err, DiscoveryError::Membership { ref target, .. } if target == &filter));
}

#[test]
fn missing_target_is_a_membership_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = project_paths(&dir.path().join("Gone.sln")).unwrap_err();

    assert!(matches!(err, DiscoveryError::Membership { .. }));
}

#[test]
fn non_target_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("App.csproj");
    write(&project, "<Project />");

    assert!(matches!(
        project_paths(&project),
        Err(DiscoveryError::Membership { .. })
    ));
}

#[test]
fn any_listed_project_is_enough() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("App.sln"), SLN);

    let projects: Vec<PathBuf> = vec![
        root.join("src/Other/Other.csproj"),
        root.join("test/App.Tests/./App.Tests.csproj"),
    ];

    assert!(SolutionMembership
        .contains_any_project(&root.join("App.sln"), &projects)
        .unwrap());
    assert!(!SolutionMembership
        .contains_any_project(&root.join("App.sln"), &projects[..1])
        .unwrap());
    assert!(SolutionMembership
        .contains_any_project(&root.join("Gone.sln"), &projects)
        .is_err());
}
