use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Recursively collect every file under `root` whose name ends with `suffix`.
///
/// Entries are visited depth-first, in file-name order within each directory.
/// Symlinks are not descended into; a link to a directory is never a source,
/// a link to a file is. The root must be readable; unreadable entries below it
/// are logged and skipped.
pub fn find_source_files(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    // Fail fast on the root itself
    fs::read_dir(root)?;

    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry during discovery");
                continue;
            }
        };
        // file_type() describes the link itself; path().is_dir() resolves it
        if entry.file_type().is_dir() || entry.path().is_dir() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            debug!(path = %entry.path().display(), "Discovered source file");
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_finds_nested_files_and_ignores_others() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top.db"), b"").unwrap();
        fs::write(nested.join("deep.db"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("archive.db.bak"), b"").unwrap();

        let mut found = find_source_files(dir.path(), ".db").unwrap();
        found.sort();

        let mut expected = vec![dir.path().join("top.db"), nested.join("deep.db")];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_empty_tree_yields_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("only").join("dirs")).unwrap();
        assert!(find_source_files(dir.path(), ".db").unwrap().is_empty());
    }

    #[test]
    fn test_directory_named_like_source_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("folder.db")).unwrap();
        fs::write(dir.path().join("folder.db").join("inner.db"), b"").unwrap();

        let found = find_source_files(dir.path(), ".db").unwrap();
        assert_eq!(found, vec![dir.path().join("folder.db").join("inner.db")]);
    }

    #[test]
    fn test_order_is_by_name_within_each_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("d.db"), b"").unwrap();
        fs::write(dir.path().join("b.db"), b"").unwrap();
        fs::create_dir_all(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c").join("x.db"), b"").unwrap();
        fs::write(dir.path().join("a.db"), b"").unwrap();

        let found = find_source_files(dir.path(), ".db").unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a.db"),
                dir.path().join("b.db"),
                dir.path().join("c").join("x.db"),
                dir.path().join("d.db"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_a_source() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(dir.path().join("plain.db"), b"").unwrap();
        symlink(&real, dir.path().join("linked.db")).unwrap();
        symlink(dir.path().join("plain.db"), dir.path().join("alias.db")).unwrap();

        let found = find_source_files(dir.path(), ".db").unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("alias.db"), dir.path().join("plain.db")]
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(find_source_files(&dir.path().join("nope"), ".db").is_err());
    }
}
