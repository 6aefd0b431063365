//! Extraction of declared dependencies from package manifests.
//!
//! Each manifest format is handled by a [`ManifestParser`] selected by exact
//! file name. Parsers are stateless and shared across the rayon pool.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ensure_root, Result};
use crate::signals::manifest::{
    parse_package_json, parse_pyproject, parse_requirements, DeclaredDependency,
};
use crate::signals::read_lossy;
use crate::walk::{relative_posix, TreeWalker};

use super::DependencyCandidate;

/// A strategy that turns one manifest file into dependency candidates.
pub trait ManifestParser: Send + Sync {
    /// Exact base name of the manifest this parser handles.
    fn file_name(&self) -> &'static str;

    /// Ecosystem tag attached to every candidate.
    fn ecosystem(&self) -> &'static str;

    /// Parse manifest text. Malformed content yields an empty list.
    fn parse(&self, content: &str) -> Vec<DeclaredDependency>;

    /// Parse and attach ecosystem and source file.
    fn extract(&self, content: &str, source_file: &str) -> Vec<DependencyCandidate> {
        self.parse(content)
            .into_iter()
            .map(|dep| DependencyCandidate {
                name: dep.name,
                version: dep.version,
                ecosystem: self.ecosystem().to_string(),
                scope: dep.scope.to_string(),
                source_file: source_file.to_string(),
            })
            .collect()
    }
}

/// `requirements.txt`
pub struct RequirementsParser;

impl ManifestParser for RequirementsParser {
    fn file_name(&self) -> &'static str {
        "requirements.txt"
    }

    fn ecosystem(&self) -> &'static str {
        "python"
    }

    fn parse(&self, content: &str) -> Vec<DeclaredDependency> {
        parse_requirements(content)
    }
}

/// `package.json`
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn file_name(&self) -> &'static str {
        "package.json"
    }

    fn ecosystem(&self) -> &'static str {
        "node"
    }

    fn parse(&self, content: &str) -> Vec<DeclaredDependency> {
        parse_package_json(content)
    }
}

/// `pyproject.toml`, PEP 621 and Poetry layouts.
pub struct PyprojectParser;

impl ManifestParser for PyprojectParser {
    fn file_name(&self) -> &'static str {
        "pyproject.toml"
    }

    fn ecosystem(&self) -> &'static str {
        "python"
    }

    fn parse(&self, content: &str) -> Vec<DeclaredDependency> {
        parse_pyproject(content)
    }
}

static PARSERS: &[&dyn ManifestParser] = &[&RequirementsParser, &PackageJsonParser, &PyprojectParser];

/// The parser registered for a file base name, if any.
pub fn parser_for(file_name: &str) -> Option<&'static dyn ManifestParser> {
    PARSERS.iter().copied().find(|p| p.file_name() == file_name)
}

/// Candidates declared by one file; empty when it is not a known manifest.
pub fn extract_file_dependencies(root: &Path, path: &Path) -> Vec<DependencyCandidate> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let Some(parser) = parser_for(name) else {
        return Vec::new();
    };
    let Some(content) = read_lossy(path) else {
        return Vec::new();
    };

    let source_file = relative_posix(root, path);
    let found = parser.extract(&content, &source_file);
    debug!(file = %source_file, count = found.len(), "parsed manifest");
    found
}

/// Candidates from the given files, sorted by source file.
///
/// The sort is stable so entries keep their in-file order.
pub fn extract_from_paths<F>(root: &Path, files: &[F]) -> Vec<DependencyCandidate>
where
    F: AsRef<Path> + Sync,
{
    let mut found: Vec<DependencyCandidate> = files
        .par_iter()
        .flat_map_iter(|f| extract_file_dependencies(root, f.as_ref()))
        .collect();
    found.sort_by(|a, b| a.source_file.cmp(&b.source_file));
    found
}

/// Extract declared dependencies under `root`.
pub fn extract_dependencies<P, I, S>(root: P, ignored: I) -> Result<Vec<DependencyCandidate>>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let root = root.as_ref();
    ensure_root(root)?;

    let walker = TreeWalker::new(root, ignored);
    let files: Vec<_> = walker.scan_files().collect();
    let found = extract_from_paths(root, &files);

    info!(dependencies = found.len(), "dependency extraction complete");
    Ok(found)
}
