use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::{DirEntry, Walk};
use tracing::warn;

use crate::attrs::AttributeStore;
use crate::classify::summarize;

/// Directories and regular files found under a root, in traversal order.
#[derive(Debug, Default)]
pub struct Tree {
    /// Every directory, the root included.
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Walk everything under `root`, sorted by file name so the order is stable.
///
/// Unlike an indexing walk, nothing is filtered: hidden files and `.gitignore`d paths
/// are part of the watched tree too.
fn walk(root: &Path) -> Walk {
    ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

fn entries(root: &Path) -> impl Iterator<Item = DirEntry> {
    walk(root).filter_map(|result| match result {
        Ok(entry) => Some(entry),
        Err(err) => {
            // Entries vanishing mid-walk are routine in a live tree.
            warn!(error = %err, "skipping unreadable entry");
            None
        }
    })
}

/// Collect the directories and regular files under `root`.
pub fn list_tree(root: &Path) -> Tree {
    let mut tree = Tree::default();
    for entry in entries(root) {
        match entry.file_type() {
            Some(ft) if ft.is_dir() => tree.directories.push(entry.into_path()),
            Some(ft) if ft.is_file() => tree.files.push(entry.into_path()),
            _ => {}
        }
    }
    tree
}

/// The most recently modified qualifying file under `root`.
///
/// Only a strictly later modification time replaces the current pick, so among files
/// with equal times the first one in traversal order wins.
pub fn find_latest_qualifying(root: &Path, attrs: &dyn AttributeStore) -> Option<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries(root) {
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if summarize(path, attrs).is_none() {
            continue;
        }
        let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
            latest = Some((modified, path.to_path_buf()));
        }
    }

    latest.map(|(_, path)| path)
}
