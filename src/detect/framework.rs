//! Framework detection from dependency, import and config-file signals.

use std::cmp::Ordering;
use std::path::Path;

use tracing::info;

use crate::error::{ensure_root, Result};
use crate::rules::{Rule, RuleEngine, Scores};
use crate::signals::{collect_signals, CollectMode, SignalBundle};
use crate::walk::TreeWalker;

use super::FrameworkConfidences;

/// Turn raw scores into a distribution. Empty when the total is zero.
pub fn normalize_confidences(scores: &Scores) -> FrameworkConfidences {
    let total: u64 = scores.values().sum();
    if total == 0 {
        return FrameworkConfidences::new();
    }
    scores
        .iter()
        .map(|(label, score)| (label.clone(), *score as f64 / total as f64))
        .collect()
}

/// Framework confidences for an already collected bundle.
pub fn score_frameworks(rules: &[Rule], signals: &SignalBundle) -> FrameworkConfidences {
    let scores = RuleEngine::new(rules).evaluate(signals);
    normalize_confidences(&scores)
}

/// Display order: descending confidence, ties by case-insensitive label.
pub fn ranked_confidences(confidences: &FrameworkConfidences) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = confidences
        .iter()
        .map(|(label, confidence)| (label.clone(), *confidence))
        .collect();
    ranked.sort_by(|(la, ca), (lb, cb)| {
        cb.partial_cmp(ca)
            .unwrap_or(Ordering::Equal)
            .then_with(|| la.to_lowercase().cmp(&lb.to_lowercase()))
            .then_with(|| la.cmp(lb))
    });
    ranked
}

/// Detect frameworks under `root`.
pub fn detect_frameworks<P, I, S>(
    root: P,
    ignored: I,
    rules: &[Rule],
) -> Result<FrameworkConfidences>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let root = root.as_ref();
    ensure_root(root)?;
    info!(rules = rules.len(), "detecting frameworks");

    let walker = TreeWalker::new(root, ignored);
    let signals = collect_signals(&walker, CollectMode::Full);
    let confidences = score_frameworks(rules, &signals);

    info!(frameworks = confidences.len(), "framework detection complete");
    Ok(confidences)
}
