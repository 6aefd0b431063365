//! Detectors built on the rule engine and the source extractors.

pub mod dependencies;
pub mod endpoints;
mod framework;
mod infra;
mod language;
mod runner;
mod types;

pub use dependencies::{
    extract_dependencies, parser_for, ManifestParser, PackageJsonParser, PyprojectParser,
    RequirementsParser,
};
pub use endpoints::{
    apply_prefix, extract_endpoints, extractor_for, EndpointExtractor, JsRouteExtractor,
    PythonRouteExtractor, HTTP_METHODS,
};
pub use framework::{detect_frameworks, normalize_confidences, ranked_confidences, score_frameworks};
pub use infra::{detect_infrastructure, rank_components, score_infrastructure};
pub use language::{detect_languages, extension_rules, score_languages};
pub use runner::Analyzer;
pub use types::{
    AnalysisReport, DependencyCandidate, EndpointCandidate, FrameworkConfidences, LanguageWeights,
};
