use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SOURCE_SUFFIX: &str = ".java";

/// Every `.java` file under `root`, in name-sorted visitation order.
///
/// Symbolic links are followed; link cycles are logged and skipped.
/// Entries whose file name is in `ignore` are skipped; for directories this
/// prunes the whole subtree. Matching is on the exact final path component.
pub fn scan_sources(root: &Path, ignore: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let ignore = Arc::new(ignore.clone());

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore.contains(name))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if files.is_empty() && is_root_error(&err) => {
                return Err(err).with_context(|| format!("Failed to read {}", root.display()));
            }
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && is_source_name(entry.file_name().to_str().unwrap_or("")) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_root_error(err: &ignore::Error) -> bool {
    err.depth().is_none_or(|d| d == 0)
}

pub fn is_source_name(name: &str) -> bool {
    name.ends_with(SOURCE_SUFFIX)
}
