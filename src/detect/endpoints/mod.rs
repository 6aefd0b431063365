//! HTTP endpoint discovery from route-registration idioms.
//!
//! Extraction is line oriented: each [`EndpointExtractor`] recognises the
//! decorator or call forms of one language family with regexes and never
//! builds a syntax tree. Only direct literal paths are found; routes built
//! from variables, nested router mounts and include chains are not resolved.

mod javascript;
mod python;

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ensure_root, Result};
use crate::signals::read_lossy;
use crate::walk::{relative_posix, TreeWalker};

use super::EndpointCandidate;

pub use javascript::JsRouteExtractor;
pub use python::PythonRouteExtractor;

/// Route-registration method names recognised on `app` and `router`.
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

/// A strategy that finds endpoints in one language family.
pub trait EndpointExtractor: Send + Sync {
    /// Lower-cased extensions (without the dot) this extractor handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Framework tag for a whole file.
    fn framework(&self, content: &str) -> &'static str;

    /// Endpoints declared in `content`, in source order.
    fn extract(&self, content: &str, source_file: &str) -> Vec<EndpointCandidate>;
}

static EXTRACTORS: &[&dyn EndpointExtractor] = &[&PythonRouteExtractor, &JsRouteExtractor];

/// The extractor registered for a file extension, if any.
pub fn extractor_for(extension: &str) -> Option<&'static dyn EndpointExtractor> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    EXTRACTORS
        .iter()
        .copied()
        .find(|e| e.extensions().contains(&extension.as_str()))
}

/// Join a router prefix and a route path with exactly one `/` at the seam.
///
/// - `("", "/x")` → `/x`
/// - `("/items", "")` → `/items`
/// - `("/items/", "/{id}")` → `/items/{id}`
pub fn apply_prefix(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Endpoints declared by one file; empty when no extractor applies.
pub fn extract_file_endpoints(root: &Path, path: &Path) -> Vec<EndpointCandidate> {
    let Some(extractor) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(extractor_for)
    else {
        return Vec::new();
    };
    let Some(content) = read_lossy(path) else {
        return Vec::new();
    };

    let source_file = relative_posix(root, path);
    let found = extractor.extract(&content, &source_file);
    if !found.is_empty() {
        debug!(file = %source_file, count = found.len(), "found endpoints");
    }
    found
}

/// Endpoints from the given files, sorted by source file.
///
/// The sort is stable so entries keep their in-file order.
pub fn extract_from_paths<F>(root: &Path, files: &[F]) -> Vec<EndpointCandidate>
where
    F: AsRef<Path> + Sync,
{
    let mut found: Vec<EndpointCandidate> = files
        .par_iter()
        .flat_map_iter(|f| extract_file_endpoints(root, f.as_ref()))
        .collect();
    found.sort_by(|a, b| a.source_file.cmp(&b.source_file));
    found
}

/// Extract HTTP endpoints under `root`.
pub fn extract_endpoints<P, I, S>(root: P, ignored: I) -> Result<Vec<EndpointCandidate>>
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

    info!(endpoints = found.len(), "endpoint extraction complete");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_apply_prefix() {
        assert_eq!(apply_prefix("", "/x"), "/x");
        assert_eq!(apply_prefix("/items", ""), "/items");
        assert_eq!(apply_prefix("/items", "/{id}"), "/items/{id}");
        assert_eq!(apply_prefix("/items/", "{id}"), "/items/{id}");
        assert_eq!(apply_prefix("/items//", "//{id}"), "/items/{id}");
    }

    #[test]
    fn test_extractor_for() {
        assert!(extractor_for("py").is_some());
        assert!(extractor_for(".TSX").is_some());
        assert!(extractor_for("mjs").is_none());
        assert!(extractor_for("rs").is_none());
    }

    #[test]
    fn test_extract_endpoints_mixed_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(
            root.join("api/items.py"),
            "from fastapi import APIRouter\n\nrouter = APIRouter(prefix=\"/items\")\n\n@router.get(\"/{id}\")\nasync def get_item(id: int):\n    return id\n",
        )
        .unwrap();
        fs::write(
            root.join("web/server.ts"),
            "import express from 'express';\nconst app = express();\napp.post('/login', login);\n",
        )
        .unwrap();
        fs::write(root.join("README.md"), "@app.get(\"/not-code\")\n").unwrap();

        let endpoints = extract_endpoints(root, Vec::<String>::new()).unwrap();
        assert_eq!(endpoints.len(), 2);

        assert_eq!(endpoints[0].source_file, "api/items.py");
        assert_eq!(endpoints[0].http_method, "GET");
        assert_eq!(endpoints[0].path, "/items/{id}");
        assert_eq!(endpoints[0].source_symbol.as_deref(), Some("get_item"));

        assert_eq!(endpoints[1].source_file, "web/server.ts");
        assert_eq!(endpoints[1].language, "typescript");
        assert_eq!(endpoints[1].framework, "express");
        assert_eq!(endpoints[1].source_symbol.as_deref(), Some("login"));
        assert!(endpoints.iter().all(|e| e.confidence == 1.0));
    }

    #[test]
    fn test_no_endpoints_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("util.py"), "def helper():\n    pass\n").unwrap();
        assert!(extract_endpoints(temp.path(), Vec::<String>::new())
            .unwrap()
            .is_empty());
    }
}
