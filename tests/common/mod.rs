//! Common test utilities for pinledger integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// The manifest used across integration tests
#[allow(dead_code)]
pub const ENGINE_MANIFEST: &str = r#"from conans import ConanFile

class SuperNovaEngine(ConanFile):
    name = 'SuperNova-Engine'
    version = '0.1.0'
    settings = "os", "arch", "compiler", "build_type"

    generators = "cmake_find_package_multi"

    requires = [
        'assimp/5.0.1',
        'entt/3.7.1',
        'glad/0.1.34@snv/stable',
        'glfw/3.3.4',
        'glm/0.9.9.8',
        'imgui/18311@snv/docking',
        'spdlog/1.8.5',
        'stb/20200203'
    ]

    default_options = {
        "glad:gl_version": "4.6",
        "glad:gl_profile": "core",
    }
"#;

/// Build a manifest with the given `requires` entries
#[allow(dead_code)]
pub fn manifest_with(requires: &[&str]) -> String {
    let entries: Vec<String> = requires.iter().map(|r| format!("        '{r}',")).collect();
    format!(
        "from conans import ConanFile\n\nclass Engine(ConanFile):\n    name = 'engine'\n    version = '0.1.0'\n    requires = [\n{}\n    ]\n",
        entries.join("\n")
    )
}

/// A test workspace for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create a workspace with `conanfile.py` at its root
    pub fn with_manifest(content: &str) -> Self {
        let workspace = Self::new();
        workspace.write_file("conanfile.py", content);
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Command running the real binary inside the workspace
    ///
    /// Environment that could leak the developer's own setup is cleared and the
    /// user configuration directory points inside the workspace.
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pinledger").expect("Failed to find pinledger binary");
        cmd.current_dir(&self.path)
            .env_remove("PINLEDGER_MANIFEST")
            .env_remove("PINLEDGER_CONFIG")
            .env_remove("PINLEDGER_LOG")
            .env("XDG_CONFIG_HOME", self.path.join(".xdg"))
            .env("NO_COLOR", "1");
        cmd
    }

    /// Initialize a git repository in the workspace
    pub fn init_git(&self) -> git2::Repository {
        git2::Repository::init(&self.path).expect("Failed to init git repository")
    }

    /// Write `conanfile.py` and commit it, returning the commit id
    pub fn commit_manifest(&self, content: &str, message: &str) -> String {
        self.write_file("conanfile.py", content);
        self.commit_paths(&["conanfile.py"], message)
    }

    /// Stage `paths` and commit them on HEAD
    pub fn commit_paths(&self, paths: &[&str], message: &str) -> String {
        let repo = git2::Repository::open(&self.path).expect("Failed to open repository");
        let mut index = repo.index().expect("Failed to get index");
        for path in paths {
            index
                .add_path(Path::new(path))
                .expect("Failed to stage file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = git2::Signature::now("Test", "test@example.com").expect("Failed to sign");
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
            .to_string()
    }
}
