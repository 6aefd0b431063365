//! Infrastructure detection from file, directory and glob signals.

use std::path::Path;

use tracing::info;

use crate::error::{ensure_root, Result};
use crate::rules::{Rule, RuleEngine, Scores};
use crate::signals::{collect_signals, CollectMode, SignalBundle};
use crate::walk::TreeWalker;

/// Labels by descending score, ties by case-insensitive label.
pub fn rank_components(scores: &Scores) -> Vec<String> {
    let mut ranked: Vec<(&String, &u64)> = scores.iter().collect();
    ranked.sort_by(|(la, sa), (lb, sb)| {
        sb.cmp(sa)
            .then_with(|| la.to_lowercase().cmp(&lb.to_lowercase()))
            .then_with(|| la.cmp(lb))
    });
    ranked.into_iter().map(|(label, _)| label.clone()).collect()
}

/// Ranked components for an already collected bundle.
pub fn score_infrastructure(rules: &[Rule], signals: &SignalBundle) -> Vec<String> {
    rank_components(&RuleEngine::new(rules).evaluate(signals))
}

/// Detect infrastructure components under `root`.
pub fn detect_infrastructure<P, I, S>(root: P, ignored: I, rules: &[Rule]) -> Result<Vec<String>>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let root = root.as_ref();
    ensure_root(root)?;
    info!(rules = rules.len(), "detecting infrastructure");

    let walker = TreeWalker::new(root, ignored);
    let signals = collect_signals(&walker, CollectMode::PathsOnly);
    let components = score_infrastructure(rules, &signals);

    info!(components = components.len(), "infrastructure detection complete");
    Ok(components)
}
