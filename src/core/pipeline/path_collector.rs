//! Recursive listing of every file below a directory.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::core::errors::{InlineError, Result};

/// List every non-directory entry below `root`, depth first.
///
/// Entries are stat'ed without following symbolic links, so links are
/// returned as entries and never descended into. Siblings come back sorted
/// by file name. Any entry that cannot be read fails the whole collection.
pub async fn collect_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || collect_paths_blocking(&root)).await?
}

fn collect_paths_blocking(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory cycle detected"));
            InlineError::directory_read(path, source)
        })?;

        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }

    debug!("Collected {} files below {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_flattens_nested_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("top.js"), "").unwrap();
        fs::write(root.join("a/one.ts"), "").unwrap();
        fs::write(root.join("a/b/c/deep.mjs"), "").unwrap();
        fs::write(root.join("a/b/notes.txt"), "").unwrap();

        let files = collect_paths(root).await.unwrap();

        assert_eq!(
            files,
            vec![
                root.join("a/b/c/deep.mjs"),
                root.join("a/b/notes.txt"),
                root.join("a/one.ts"),
                root.join("top.js"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        assert!(collect_paths(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_a_directory_read_error() {
        let dir = tempdir().unwrap();
        let err = collect_paths(&dir.path().join("missing")).await.unwrap_err();

        assert!(matches!(err, InlineError::DirectoryRead { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_entries_not_traversed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/a.js"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let files = collect_paths(root).await.unwrap();

        assert_eq!(files, vec![root.join("link"), root.join("real/a.js")]);
    }
}
