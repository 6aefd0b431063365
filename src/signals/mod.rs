//! Signal collection from a project tree.
//!
//! A signal is an atomic, categorized fact observed on disk: an extension, a
//! file name, an import token, a declared dependency. Collection runs per
//! file and folds the per-file bundles with a commutative union, so the order
//! in which files are visited never changes the result.

pub mod imports;
pub mod manifest;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::walk::{relative_posix, TreeWalker};

pub use imports::ImportFamily;
pub use manifest::{DeclaredDependency, ManifestKind};

/// Categories of signals a rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Extension,
    File,
    Directory,
    Glob,
    PythonDependency,
    NodeDependency,
    JavaDependency,
    Import,
    ConfigFile,
}

impl SignalType {
    pub const ALL: [SignalType; 9] = [
        SignalType::Extension,
        SignalType::File,
        SignalType::Directory,
        SignalType::Glob,
        SignalType::PythonDependency,
        SignalType::NodeDependency,
        SignalType::JavaDependency,
        SignalType::Import,
        SignalType::ConfigFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Extension => "extension",
            SignalType::File => "file",
            SignalType::Directory => "directory",
            SignalType::Glob => "glob",
            SignalType::PythonDependency => "python_dependency",
            SignalType::NodeDependency => "node_dependency",
            SignalType::JavaDependency => "java_dependency",
            SignalType::Import => "import",
            SignalType::ConfigFile => "config_file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// True for families that need file content rather than paths.
    pub fn is_content_derived(&self) -> bool {
        matches!(
            self,
            SignalType::PythonDependency
                | SignalType::NodeDependency
                | SignalType::JavaDependency
                | SignalType::Import
        )
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.trim().to_lowercase()).ok_or_else(|| format!("unknown signal type: {}", s))
    }
}

/// Lower-cased signal values grouped by type, plus per-extension file counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalBundle {
    sets: BTreeMap<SignalType, BTreeSet<String>>,
    extension_counts: BTreeMap<String, u64>,
}

impl SignalBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; it is trimmed and lower-cased. Empty values are dropped.
    pub fn insert(&mut self, signal_type: SignalType, value: &str) {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return;
        }
        self.sets.entry(signal_type).or_default().insert(value);
    }

    pub fn contains(&self, signal_type: SignalType, value: &str) -> bool {
        self.sets
            .get(&signal_type)
            .is_some_and(|set| set.contains(value))
    }

    /// All values recorded for `signal_type`, in sorted order.
    pub fn values(&self, signal_type: SignalType) -> impl Iterator<Item = &str> {
        self.sets
            .get(&signal_type)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Count one file with the given extension (also recorded as a signal).
    pub fn record_extension(&mut self, ext: &str) {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            return;
        }
        self.insert(SignalType::Extension, &ext);
        *self.extension_counts.entry(ext).or_default() += 1;
    }

    /// Number of files seen per extension.
    pub fn extension_counts(&self) -> &BTreeMap<String, u64> {
        &self.extension_counts
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(BTreeSet::is_empty) && self.extension_counts.is_empty()
    }

    /// Copy holding only the families [`CollectMode::PathsOnly`] gathers.
    pub fn paths_only(&self) -> SignalBundle {
        let sets = self
            .sets
            .iter()
            .filter(|(signal_type, _)| !signal_type.is_content_derived())
            .map(|(signal_type, values)| (*signal_type, values.clone()))
            .collect();
        SignalBundle {
            sets,
            extension_counts: self.extension_counts.clone(),
        }
    }

    /// Union `other` into this bundle. Commutative and associative.
    pub fn merge(&mut self, other: SignalBundle) {
        for (signal_type, values) in other.sets {
            self.sets.entry(signal_type).or_default().extend(values);
        }
        for (ext, count) in other.extension_counts {
            *self.extension_counts.entry(ext).or_default() += count;
        }
    }

    fn merged(mut self, other: SignalBundle) -> SignalBundle {
        self.merge(other);
        self
    }
}

/// Which signal families to gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Names, extensions and paths only; no file is opened.
    PathsOnly,
    /// Paths plus manifest and import signals read from file content.
    Full,
}

/// Read a file as text, replacing invalid UTF-8. `None` if it cannot be read.
pub fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read file");
            None
        }
    }
}

/// Signals contributed by a single file.
pub fn file_signals(root: &Path, path: &Path, mode: CollectMode) -> SignalBundle {
    let mut bundle = SignalBundle::new();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    bundle.insert(SignalType::File, &name);
    bundle.insert(SignalType::ConfigFile, &name);
    bundle.insert(SignalType::Glob, &relative_posix(root, path));
    bundle.insert(SignalType::Glob, &name);
    bundle.record_extension(&ext);

    if mode == CollectMode::PathsOnly {
        return bundle;
    }

    let manifest = ManifestKind::from_file_name(&name);
    let family = ImportFamily::from_extension(&ext);
    if manifest.is_none() && family.is_none() {
        return bundle;
    }

    let Some(content) = read_lossy(path) else {
        return bundle;
    };

    if let Some(kind) = manifest {
        for dep in kind.parse(&content) {
            bundle.insert(kind.signal_type(), &dep.name);
        }
    }
    if let Some(family) = family {
        for token in family.tokenize(&content) {
            bundle.insert(SignalType::Import, &token);
        }
    }

    bundle
}

/// Signals contributed by a directory.
pub fn directory_signals(root: &Path, path: &Path) -> SignalBundle {
    let mut bundle = SignalBundle::new();
    bundle.insert(SignalType::Directory, &relative_posix(root, path));
    bundle
}

/// Fold the signals of the given files and directories.
///
/// Per-file work runs on the rayon pool; the result does not depend on the
/// order of `files` or `directories`.
pub fn collect_from_paths<F, D>(
    root: &Path,
    files: &[F],
    directories: &[D],
    mode: CollectMode,
) -> SignalBundle
where
    F: AsRef<Path> + Sync,
    D: AsRef<Path> + Sync,
{
    let from_files = files
        .par_iter()
        .map(|f| file_signals(root, f.as_ref(), mode))
        .reduce(SignalBundle::new, SignalBundle::merged);
    let from_dirs = directories
        .par_iter()
        .map(|d| directory_signals(root, d.as_ref()))
        .reduce(SignalBundle::new, SignalBundle::merged);
    from_files.merged(from_dirs)
}

/// Walk the tree and collect every signal in one pass.
pub fn collect_signals(walker: &TreeWalker, mode: CollectMode) -> SignalBundle {
    let files: Vec<_> = walker.scan_files().collect();
    let directories: Vec<_> = walker.scan_directories().collect();
    let bundle = collect_from_paths(walker.root(), &files, &directories, mode);
    debug!(
        files = files.len(),
        directories = directories.len(),
        "collected signals"
    );
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_signal_type_round_trip_names() {
        for t in SignalType::ALL {
            assert_eq!(SignalType::parse(t.as_str()), Some(t));
        }
        assert_eq!("Config_File".parse::<SignalType>(), Ok(SignalType::ConfigFile));
        assert!("bogus".parse::<SignalType>().is_err());
    }

    #[test]
    fn test_bundle_insert_normalizes() {
        let mut bundle = SignalBundle::new();
        bundle.insert(SignalType::File, "  Dockerfile ");
        bundle.insert(SignalType::File, "");
        assert!(bundle.contains(SignalType::File, "dockerfile"));
        assert_eq!(bundle.values(SignalType::File).count(), 1);
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut a = SignalBundle::new();
        a.insert(SignalType::Import, "flask");
        a.record_extension("py");
        let mut b = SignalBundle::new();
        b.insert(SignalType::Import, "django");
        b.record_extension(".PY");
        b.record_extension("js");

        let ab = a.clone().merged(b.clone());
        let ba = b.merged(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.extension_counts().get("py"), Some(&2));
    }

    #[test]
    fn test_collect_signals_full() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("deploy/k8s")).unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("requirements.txt"), "Django==4.2\n").unwrap();
        fs::write(root.join("package.json"), r#"{"dependencies":{"express":"^4"}}"#).unwrap();
        fs::write(root.join("app/main.py"), "from fastapi import FastAPI\n").unwrap();
        fs::write(root.join("deploy/k8s/Service.YAML"), "kind: Service\n").unwrap();

        let walker = TreeWalker::new(root, Vec::<String>::new());
        let bundle = collect_signals(&walker, CollectMode::Full);

        assert!(bundle.contains(SignalType::PythonDependency, "django"));
        assert!(bundle.contains(SignalType::NodeDependency, "express"));
        assert!(bundle.contains(SignalType::Import, "fastapi"));
        assert!(bundle.contains(SignalType::ConfigFile, "package.json"));
        assert!(bundle.contains(SignalType::File, "service.yaml"));
        assert!(bundle.contains(SignalType::Glob, "deploy/k8s/service.yaml"));
        assert!(bundle.contains(SignalType::Directory, "deploy/k8s"));
        assert!(bundle.contains(SignalType::Extension, "yaml"));
        assert_eq!(bundle.extension_counts().get("py"), Some(&1));
    }

    #[test]
    fn test_paths_only_reads_no_content() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "flask\n").unwrap();

        let walker = TreeWalker::new(temp.path(), Vec::<String>::new());
        let bundle = collect_signals(&walker, CollectMode::PathsOnly);
        assert!(bundle.contains(SignalType::File, "requirements.txt"));
        assert_eq!(bundle.values(SignalType::PythonDependency).count(), 0);

        let full = collect_signals(&walker, CollectMode::Full);
        assert!(full.contains(SignalType::PythonDependency, "flask"));
        assert_eq!(full.paths_only(), bundle);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("requirements.txt"),
            b"requests>=2.0\n\xff\xfe\nflask\n".as_slice(),
        )
        .unwrap();

        let walker = TreeWalker::new(temp.path(), Vec::<String>::new());
        let bundle = collect_signals(&walker, CollectMode::Full);
        assert!(bundle.contains(SignalType::PythonDependency, "requests"));
        assert!(bundle.contains(SignalType::PythonDependency, "flask"));
    }
}
