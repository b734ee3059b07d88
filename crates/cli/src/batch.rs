//! Recursive walk over a folder.

use crate::FileDispatcher;
use std::path::Path;
use transfont_core::{BatchReport, RewriteContext};
use walkdir::{DirEntry, WalkDir};

/// Dispatch every regular file below `root`, one at a time, in file-name
/// order. A symlink to a regular file is processed through its target;
/// symlinked directories are not descended into. Entries that cannot be
/// read are logged and left out of the report.
pub fn run_batch(root: &Path, dispatcher: &FileDispatcher, ctx: &RewriteContext<'_>) -> BatchReport {
    let mut report = BatchReport::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !is_regular_file(&entry) {
            continue;
        }
        report.push(dispatcher.dispatch(entry.path(), ctx));
    }

    report
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_followed_but_not_symlinked_dir() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("target.txt"), "x").unwrap();
        fs::create_dir(outside.path().join("folder")).unwrap();
        fs::write(outside.path().join("folder").join("hidden.txt"), "x").unwrap();

        symlink(outside.path().join("target.txt"), dir.path().join("link.txt")).unwrap();
        symlink(outside.path().join("folder"), dir.path().join("linked")).unwrap();
        symlink(outside.path().join("missing.txt"), dir.path().join("dangling.txt")).unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let entries: Vec<_> = WalkDir::new(dir.path())
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(is_regular_file)
            .map(|e| e.file_name().to_os_string())
            .collect();
        assert_eq!(entries, vec!["link.txt", "plain.txt"]);
    }
}
