//! [`CatalogFixture`] builder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary repository with an `agents/` catalog plus a separate
/// temporary home directory, so global-scope outputs never touch the real
/// user profile.
///
/// # Example
///
/// ```rust,no_run
/// use agentctl_test_utils::CatalogFixture;
///
/// let fixture = CatalogFixture::new();
/// fixture.command("deploy", "Deploy the app.\n");
/// fixture.assert_file_exists("agents/commands/deploy.md");
/// ```
pub struct CatalogFixture {
    repo: TempDir,
    home: TempDir,
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFixture {
    /// Create a repository containing an empty `agents/` directory.
    pub fn new() -> Self {
        let fixture = Self::bare();
        fs::create_dir_all(fixture.root().join("agents")).unwrap();
        fixture
    }

    /// Create a repository without a catalog.
    pub fn bare() -> Self {
        Self {
            repo: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    /// Return the repository root.
    pub fn root(&self) -> &Path {
        self.repo.path()
    }

    /// Return the fake home directory.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Write `content` to `rel` under the repository root, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `content` to `rel` under the home directory.
    pub fn write_home(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.home().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// `agents/commands/<name>.md`
    pub fn command(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("agents/commands/{name}.md"), content)
    }

    /// `agents/skills/<name>/SKILL.md`
    pub fn skill(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("agents/skills/{name}/SKILL.md"), content)
    }

    /// A support file inside a skill directory.
    pub fn skill_file(&self, skill: &str, rel: &str, content: &str) -> PathBuf {
        self.write(&format!("agents/skills/{skill}/{rel}"), content)
    }

    /// `agents/subagents/<name>.md`
    pub fn subagent(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("agents/subagents/{name}.md"), content)
    }

    /// `agents/instructions/<name>.md`
    pub fn instruction(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("agents/instructions/{name}.md"), content)
    }

    /// `agents/agentctl.toml`
    pub fn config(&self, content: &str) -> PathBuf {
        self.write("agents/agentctl.toml", content)
    }

    /// Remove a file relative to the repository root.
    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.root().join(rel)).unwrap();
    }

    /// Read a file relative to the repository root.
    pub fn read(&self, rel: &str) -> String {
        let path = self.root().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Read a file relative to the home directory.
    pub fn read_home(&self, rel: &str) -> String {
        let path = self.home().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the repo root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }

    /// Assert that the file at `path` (relative to root) holds exactly `expected`.
    pub fn assert_file_content(&self, path: &str, expected: &str) {
        assert_eq!(self.read(path), expected, "unexpected content in {path}");
    }
}
