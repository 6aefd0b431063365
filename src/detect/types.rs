//! Result shapes produced by the detectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weighted file count per language.
pub type LanguageWeights = BTreeMap<String, u64>;

/// Confidence per framework; sums to 1.0 when non-empty.
pub type FrameworkConfidences = BTreeMap<String, f64>;

fn default_confidence() -> f64 {
    1.0
}

/// An HTTP endpoint found in source, pending storage by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub http_method: String,
    /// Route path with any router prefix already applied
    pub path: String,
    pub framework: String,
    pub language: String,
    /// Root-relative path with forward slashes
    pub source_file: String,
    /// Handler function name, when one could be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_symbol: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

/// A declared dependency, pending storage by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCandidate {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub ecosystem: String,
    pub scope: String,
    pub source_file: String,
}

/// Everything one analysis run found under a root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub root: String,
    /// Number of files visited by the walk
    pub files_scanned: usize,
    pub languages: LanguageWeights,
    pub frameworks: FrameworkConfidences,
    /// Components ranked by descending score
    pub infrastructure: Vec<String>,
    pub dependencies: Vec<DependencyCandidate>,
    pub endpoints: Vec<EndpointCandidate>,
}

impl AnalysisReport {
    /// True when no detector produced anything.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
            && self.frameworks.is_empty()
            && self.infrastructure.is_empty()
            && self.dependencies.is_empty()
            && self.endpoints.is_empty()
    }

    /// Frameworks in display order.
    pub fn ranked_frameworks(&self) -> Vec<(String, f64)> {
        super::framework::ranked_confidences(&self.frameworks)
    }
}
