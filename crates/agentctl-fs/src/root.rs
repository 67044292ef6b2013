//! Repository root discovery

use std::path::{Path, PathBuf};

/// Directory, relative to the repository root, holding the canonical catalog.
pub const CATALOG_DIR: &str = "agents";

/// Walk upward from `start` looking for the repository root.
///
/// The first ancestor containing an `agents/` directory wins; failing
/// that, the first ancestor containing `.git`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let by_catalog = start
        .ancestors()
        .find(|dir| dir.join(CATALOG_DIR).is_dir())
        .map(Path::to_path_buf);
    by_catalog.or_else(|| {
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(Path::to_path_buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_catalog_in_ancestor() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("agents/commands")).unwrap();
        let nested = temp.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let root = find_repo_root(&nested).unwrap();
        assert_eq!(root, dunce::canonicalize(temp.path()).unwrap());
    }

    #[test]
    fn falls_back_to_git_marker() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        let nested = temp.path().join("pkg");
        fs::create_dir_all(&nested).unwrap();

        let root = find_repo_root(&nested).unwrap();
        assert_eq!(root, dunce::canonicalize(temp.path()).unwrap());
    }
}
