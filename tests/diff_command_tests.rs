//! Integration tests for `pinledger diff`

mod common;

use common::{TestWorkspace, manifest_with};
use predicates::prelude::*;

#[test]
fn test_diff_two_files() {
    let workspace = TestWorkspace::new();
    workspace.write_file("old.py", &manifest_with(&["assimp/5.0.1", "glfw/3.3.4"]));
    workspace.write_file("new.py", &manifest_with(&["glfw/3.3.5", "spdlog/1.8.5"]));

    workspace
        .cmd()
        .args(["diff", "old.py", "new.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("~ upgraded glfw 3.3.4 -> 3.3.5"))
        .stdout(predicate::str::contains("+ added spdlog/1.8.5"))
        .stdout(predicate::str::contains("- removed assimp/5.0.1"));
}

#[test]
fn test_diff_identical_files() {
    let workspace = TestWorkspace::new();
    let manifest = manifest_with(&["glfw/3.3.4"]);
    workspace.write_file("old.py", &manifest);
    workspace.write_file("new.py", &format!("# touched\n{manifest}"));

    workspace
        .cmd()
        .args(["diff", "old.py", "new.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes"));
}

#[test]
fn test_diff_downgrade_with_check() {
    let workspace = TestWorkspace::new();
    workspace.write_file("old.py", &manifest_with(&["entt/3.7.1"]));
    workspace.write_file("new.py", &manifest_with(&["entt/3.6.0"]));

    workspace
        .cmd()
        .args(["diff", "old.py", "new.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("! downgraded entt 3.7.1 -> 3.6.0"));

    workspace
        .cmd()
        .args(["diff", "old.py", "new.py", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 pin(s) moved backwards"));
}

#[test]
fn test_diff_json() {
    let workspace = TestWorkspace::new();
    workspace.write_file("old.py", &manifest_with(&["glad/0.1.34"]));
    workspace.write_file("new.py", &manifest_with(&["glad/0.1.34@snv/stable"]));

    let output = workspace
        .cmd()
        .args(["diff", "old.py", "new.py", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["changes"][0]["kind"], "requalified");
    assert_eq!(json["changes"][0]["name"], "glad");
}

#[test]
fn test_diff_git_revisions() {
    let workspace = TestWorkspace::new();
    workspace.init_git();
    workspace.commit_manifest(&manifest_with(&["glfw/3.3.4"]), "initial pins");
    workspace.commit_manifest(&manifest_with(&["glfw/3.3.5"]), "bump glfw");

    workspace
        .cmd()
        .args(["diff", "--git", "HEAD~1", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upgraded glfw 3.3.4 -> 3.3.5"));
}

#[test]
fn test_diff_git_against_working_tree() {
    let workspace = TestWorkspace::new();
    workspace.init_git();
    workspace.commit_manifest(&manifest_with(&["glfw/3.3.4"]), "initial pins");
    workspace.write_file("conanfile.py", &manifest_with(&["glfw/3.3.4", "glm/0.9.9.8"]));

    workspace
        .cmd()
        .args(["diff", "--git", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ added glm/0.9.9.8"));
}

#[test]
fn test_diff_git_unknown_revision() {
    let workspace = TestWorkspace::new();
    workspace.init_git();
    workspace.commit_manifest(&manifest_with(&["glfw/3.3.4"]), "initial pins");

    workspace
        .cmd()
        .args(["diff", "--git", "v9.9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to resolve revision 'v9.9.9'"));
}

#[test]
fn test_diff_git_outside_repository() {
    let workspace = TestWorkspace::with_manifest(&manifest_with(&["glfw/3.3.4"]));
    workspace
        .cmd()
        .args(["diff", "--git", "HEAD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open repository"));
}

#[test]
fn test_diff_missing_file() {
    let workspace = TestWorkspace::new();
    workspace.write_file("old.py", &manifest_with(&["glfw/3.3.4"]));
    workspace
        .cmd()
        .args(["diff", "old.py", "nope.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest not found: nope.py"));
}
