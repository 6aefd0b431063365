//! Analysis runner that orchestrates all detectors.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::RuleCatalog;
use crate::error::{ensure_root, AnalysisError, Result};
use crate::signals::{collect_from_paths, CollectMode};
use crate::walk::{CancelToken, TreeWalker};

use super::{
    dependencies, endpoints, score_frameworks, score_infrastructure, score_languages,
    AnalysisReport,
};

/// Runs every detector over one root with one rule catalog.
///
/// The tree is walked once and signals are collected once; each detector
/// then reads the shared bundle or file list.
pub struct Analyzer {
    root: PathBuf,
    ignored: BTreeSet<String>,
    cancel: CancelToken,
}

impl Analyzer {
    /// Create a new analyzer for `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignored: BTreeSet::new(),
            cancel: CancelToken::default(),
        }
    }

    /// Extra ignored names, on top of the catalog's `ignored_directories`.
    pub fn ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Stop early, with [`AnalysisError::Cancelled`], once `token` fires.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run all analyses defined by the catalog.
    pub fn run(&self, catalog: &RuleCatalog) -> Result<AnalysisReport> {
        ensure_root(&self.root)?;
        self.check_cancelled()?;

        let ignored = self
            .ignored
            .iter()
            .chain(catalog.ignored_directories.iter())
            .cloned();
        let walker = TreeWalker::new(&self.root, ignored).with_cancel_token(self.cancel.clone());
        let files: Vec<PathBuf> = walker.scan_files().collect();
        let directories: Vec<PathBuf> = walker.scan_directories().collect();
        self.check_cancelled()?;
        info!(
            root = %self.root.display(),
            files = files.len(),
            directories = directories.len(),
            "walked project tree"
        );

        let signals = collect_from_paths(&self.root, &files, &directories, CollectMode::Full);
        let path_signals = signals.paths_only();
        self.check_cancelled()?;

        let languages = score_languages(&catalog.language_rules, &path_signals);
        let frameworks = score_frameworks(&catalog.framework_rules, &signals);
        let infrastructure = score_infrastructure(&catalog.infra_rules, &path_signals);

        let dependencies = dependencies::extract_from_paths(&self.root, &files);
        self.check_cancelled()?;
        let endpoints = endpoints::extract_from_paths(&self.root, &files);
        self.check_cancelled()?;

        info!(
            languages = languages.len(),
            frameworks = frameworks.len(),
            infrastructure = infrastructure.len(),
            dependencies = dependencies.len(),
            endpoints = endpoints.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            root: self.root.display().to_string(),
            files_scanned: files.len(),
            languages,
            frameworks,
            infrastructure,
            dependencies,
            endpoints,
        })
    }
}
