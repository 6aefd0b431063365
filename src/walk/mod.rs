//! Filesystem traversal with ignored-name pruning.
//!
//! The walker follows symbolic links but relies on walkdir's loop detection,
//! so a link pointing back at one of its ancestors is reported as an error
//! entry and skipped instead of recursing forever. Errors are never surfaced
//! to the caller: anything that cannot be read is logged and dropped.

mod tree;

pub use tree::{build_project_tree, NodeKind, ProjectTree};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Cooperative cancellation shared between a caller and a running walk.
///
/// Cloning yields a handle to the same flag. A token may also carry a
/// deadline, after which it reports itself as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A token that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Recursive enumerator of files and directories under a root.
///
/// Each `scan_*` call starts a fresh traversal, so a walker can be reused
/// any number of times.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    ignored: BTreeSet<String>,
    cancel: CancelToken,
}

impl TreeWalker {
    /// Create a walker over `root` that skips any path with a segment equal
    /// to one of `ignored` (exact, case-sensitive match).
    pub fn new<P, I, S>(root: P, ignored: I) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.as_ref().to_path_buf(),
            ignored: ignored.into_iter().map(Into::into).collect(),
            cancel: CancelToken::default(),
        }
    }

    /// Attach a cancellation token; iteration stops once it fires.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether a single path segment is on the ignore list.
    pub fn is_ignored_name(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// Lazily yield every regular file under the root.
    pub fn scan_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.entries()
            .filter(|e| e.file_type().is_file())
            .map(DirEntry::into_path)
    }

    /// Lazily yield every directory under the root (the root excluded).
    pub fn scan_directories(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.entries()
            .filter(|e| e.file_type().is_dir())
            .map(DirEntry::into_path)
    }

    /// Root-relative path with forward slashes.
    pub fn relative_posix(&self, path: &Path) -> String {
        relative_posix(&self.root, path)
    }

    fn entries(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .follow_links(true)
            .min_depth(1)
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !self.is_ignored_entry(e))
            .take_while(move |_| !self.cancel.is_cancelled())
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
    }

    fn is_ignored_entry(&self, entry: &DirEntry) -> bool {
        let ignored = entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.is_ignored_name(name));
        if ignored {
            debug!(path = %entry.path().display(), "skipping ignored path");
        }
        ignored
    }
}

/// Express `path` relative to `root` using `/` separators.
///
/// Paths outside `root` are returned whole.
pub fn relative_posix(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
