//! Nested project tree for display.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::relative_posix;
use crate::error::{AnalysisError, Result};

/// Whether a tree node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
}

/// One node of a project tree. Directories carry their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTree {
    pub name: String,
    /// Root-relative path, `.` for the root itself.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ProjectTree>>,
}

impl ProjectTree {
    /// Number of file nodes in this subtree.
    pub fn file_count(&self) -> usize {
        match &self.children {
            None => usize::from(self.kind == NodeKind::File),
            Some(children) => children.iter().map(ProjectTree::file_count).sum(),
        }
    }
}

/// Build a nested tree of `root`, skipping entries named in `ignored`.
///
/// Directories sort before files, then by case-insensitive name. Symbolic
/// links are followed; a link back to one of its ancestors is dropped by
/// walkdir's loop detection, as in [`TreeWalker`](super::TreeWalker).
pub fn build_project_tree<P, I, S>(root: P, ignored: I) -> Result<ProjectTree>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let root = root.as_ref();
    if !root.exists() {
        return Err(AnalysisError::RootNotFound(root.to_path_buf()));
    }
    let ignored: HashSet<String> = ignored.into_iter().map(Into::into).collect();

    let entries = WalkDir::new(root)
        .follow_links(true)
        .sort_by(dirs_first)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || e.file_name().to_str().map_or(true, |n| !ignored.contains(n))
        });

    // Pre-order entries; `open` holds the current chain of ancestors.
    let mut open: Vec<ProjectTree> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        while open.len() > entry.depth() {
            close_last(&mut open);
        }
        open.push(node_for(root, &entry));
    }
    while open.len() > 1 {
        close_last(&mut open);
    }
    open.pop()
        .ok_or_else(|| AnalysisError::RootNotFound(root.to_path_buf()))
}

fn dirs_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let key = |e: &DirEntry| (!e.file_type().is_dir(), e.file_name().to_string_lossy().to_lowercase());
    key(a).cmp(&key(b))
}

/// Attach the innermost open node to its parent.
fn close_last(open: &mut Vec<ProjectTree>) {
    let Some(node) = open.pop() else {
        return;
    };
    if let Some(children) = open.last_mut().and_then(|parent| parent.children.as_mut()) {
        children.push(node);
    }
}

fn node_for(root: &Path, entry: &DirEntry) -> ProjectTree {
    let path = match relative_posix(root, entry.path()) {
        p if p.is_empty() => ".".to_string(),
        p => p,
    };
    let is_dir = entry.file_type().is_dir();
    ProjectTree {
        name: entry.file_name().to_string_lossy().into_owned(),
        path,
        kind: if is_dir { NodeKind::Dir } else { NodeKind::File },
        children: is_dir.then(Vec::new),
    }
}
