//! stacklens - signal detection and confidence scoring for project trees.
//!
//! stacklens inspects a project's file tree and classifies it: programming
//! languages present, frameworks in use, infrastructure components
//! referenced, declared dependencies, and HTTP endpoints exposed. Every
//! classification comes from weighted rules, so a score can always be traced
//! back to the signals that produced it.
//!
//! # Architecture
//!
//! - `walk`: filesystem traversal with ignored-name pruning and cancellation
//! - `signals`: per-file signal collection (names, paths, manifests, imports)
//! - `rules`: the weighted rule engine shared by every classifier
//! - `detect`: language, framework and infrastructure detectors, plus the
//!   dependency and endpoint extractors and the [`Analyzer`] that runs them all
//! - `catalog`: YAML rule catalog schema
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use stacklens::{Analyzer, RuleCatalog};
//!
//! let catalog = RuleCatalog::default_catalog()?;
//! let report = Analyzer::new("path/to/project").run(&catalog)?;
//! for (framework, confidence) in report.ranked_frameworks() {
//!     println!("{framework}: {confidence:.2}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod detect;
pub mod error;
pub mod report;
pub mod rules;
pub mod signals;
pub mod walk;

pub use catalog::RuleCatalog;
pub use detect::{
    detect_frameworks, detect_infrastructure, detect_languages, extract_dependencies,
    extract_endpoints, AnalysisReport, Analyzer, DependencyCandidate, EndpointCandidate,
    FrameworkConfidences, LanguageWeights,
};
pub use error::{AnalysisError, CatalogError};
pub use rules::{Rule, RuleEngine, Scores};
pub use signals::{SignalBundle, SignalType};
pub use walk::{build_project_tree, CancelToken, ProjectTree, TreeWalker};
