//! Recursive directory listing
//!
//! Two traversals over the same rules:
//!
//! - [`scan_recursive`] builds a nested [`DirTree`] keyed by entry name
//! - [`glob_recursive`] collects a [`FlatMap`] of full path to full path
//!
//! Depth counting starts at 1 for the root's immediate children. A directory
//! at depth `d` is descended into only when `d <= max_depth`; otherwise it is
//! recorded as a leaf path. Entries are visited in file-name order, symlinks
//! are never followed, and an unreadable directory aborts the whole walk with
//! [`UtilError::Io`].

use crate::error::{Result, UtilError};
use crate::helpers::paths::cleanpath;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Full path to full path, in traversal order.
pub type FlatMap = IndexMap<String, String>;

/// Entry name to node, in traversal order.
pub type DirTree = IndexMap<String, DirNode>;

/// One entry of a recursive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DirNode {
    /// A file, or a directory past the depth limit: its full path.
    File(String),
    /// A directory that was descended into.
    Dir(DirTree),
}

/// Build a nested tree of `dir`'s contents.
pub fn scan_recursive(dir: impl AsRef<Path>, max_depth: usize) -> Result<DirTree> {
    scan_level(dir.as_ref(), max_depth, 1)
}

fn scan_level(dir: &Path, max_depth: usize, depth: usize) -> Result<DirTree> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| UtilError::io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| UtilError::io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut tree = DirTree::new();
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type().map_err(|e| UtilError::io(&path, e))?;

        let node = if file_type.is_dir() && depth <= max_depth {
            DirNode::Dir(scan_level(&path, max_depth, depth + 1)?)
        } else {
            DirNode::File(path.to_string_lossy().into_owned())
        };
        tree.insert(name, node);
    }
    Ok(tree)
}

/// Collect every leaf under `dir` into a flat path map in one pass.
pub fn glob_recursive(dir: impl AsRef<Path>, max_depth: usize) -> Result<FlatMap> {
    let dir = dir.as_ref();
    let meta = std::fs::metadata(dir).map_err(|e| UtilError::io(dir, e))?;
    if !meta.is_dir() {
        return Err(UtilError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    let mut glob = FlatMap::new();

    // walkdir depth: root = 0, root children = 1. A directory at depth d is
    // descended iff d <= max_depth, so entries can appear down to max_depth + 1.
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth.saturating_add(1))
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            UtilError::io(path, source)
        })?;

        if entry.file_type().is_dir() && entry.depth() <= max_depth {
            continue;
        }
        let path = entry.path().to_string_lossy().into_owned();
        glob.insert(path.clone(), path);
    }
    Ok(glob)
}

/// Collapse a tree from [`scan_recursive`] into a flat path map.
pub fn flatten(tree: &DirTree) -> FlatMap {
    let mut flat = FlatMap::new();
    flatten_into(tree, None, &mut flat);
    flat
}

/// Like [`flatten`], but keys have `prefix` removed.
///
/// The prefix is compared after [`cleanpath`] on both sides, so `"/srv/app/"`
/// strips `"/srv/app"` from `"/srv/app/src/main.rs"`, leaving
/// `"src/main.rs"`. Values keep the full path.
pub fn flatten_stripped(tree: &DirTree, prefix: &str) -> FlatMap {
    let mut flat = FlatMap::new();
    let prefix = cleanpath(prefix);
    flatten_into(tree, Some(&prefix), &mut flat);
    flat
}

fn flatten_into(tree: &DirTree, prefix: Option<&str>, flat: &mut FlatMap) {
    for node in tree.values() {
        match node {
            DirNode::Dir(sub) => flatten_into(sub, prefix, flat),
            DirNode::File(path) => {
                let key = match prefix {
                    Some(pre) if !pre.is_empty() => {
                        let clean = cleanpath(path);
                        match clean.strip_prefix(pre) {
                            Some(rest) => rest.trim_start_matches('/').to_string(),
                            None => path.clone(),
                        }
                    }
                    _ => path.clone(),
                };
                flat.insert(key, path.clone());
            }
        }
    }
}

/// List files matching a glob pattern
pub fn glob_list(pattern: &str) -> Result<Vec<String>> {
    let paths = glob::glob(pattern)
        .map_err(|e| UtilError::invalid_argument("pattern", format!("'{pattern}': {e}")))?;
    Ok(paths
        .filter_map(|r| r.ok())
        .map(|p| p.to_string_lossy().to_string())
        .collect())
}
