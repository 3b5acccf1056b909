use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Extensions of pipeline files picked up from directories.
pub const PIPELINE_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Expands file patterns into pipeline files.
///
/// Each pattern is a glob. A pattern or match naming a directory is walked
/// recursively for `*.yml` and `*.yaml` files. Files keep the order they
/// were found in; duplicates are removed.
///
/// # Errors
///
/// [`Error::Pattern`](crate::error::Error::Pattern) for a malformed glob.
pub fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(pattern = %pattern, "skipping unreadable path: {e}");
                    continue;
                }
            };
            matched = true;
            if path.is_dir() {
                walk_dir(&path).into_iter().for_each(&mut push);
            } else {
                push(path);
            }
        }
        if !matched {
            warn!(pattern = %pattern, "pattern matched no files");
        }
    }

    debug!(files = files.len(), "collected pipeline files");
    Ok(files)
}

fn walk_dir(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| PIPELINE_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    files.sort();
    files
}
