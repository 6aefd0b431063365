//! Language detection from file extensions.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::{ensure_root, Result};
use crate::rules::{Rule, RuleEngine};
use crate::signals::{collect_signals, CollectMode, SignalBundle, SignalType};
use crate::walk::TreeWalker;

use super::LanguageWeights;

/// Active extension rules, one per extension, values normalized.
///
/// Extensions are lower-cased with leading dots stripped. When several
/// active rules target the same extension the first one registered wins.
pub fn extension_rules(rules: &[Rule]) -> Vec<Rule> {
    let mut seen = HashSet::new();
    rules
        .iter()
        .filter(|r| r.is_active && r.signal_type == SignalType::Extension)
        .filter_map(|r| {
            let ext = r.normalized_value().trim_start_matches('.').to_string();
            if ext.is_empty() || !seen.insert(ext.clone()) {
                return None;
            }
            Some(Rule {
                signal_value: ext,
                ..r.clone()
            })
        })
        .collect()
}

/// Weighted file count per language for an already collected bundle.
///
/// Each distinct extension is scored once through the rule engine and the
/// result is scaled by the number of files carrying that extension.
pub fn score_languages(rules: &[Rule], signals: &SignalBundle) -> LanguageWeights {
    let engine = RuleEngine::new(&extension_rules(rules));
    let mut weights = LanguageWeights::new();
    if engine.is_empty() {
        return weights;
    }

    for (ext, count) in signals.extension_counts() {
        let mut probe = SignalBundle::new();
        probe.insert(SignalType::Extension, ext);
        for (language, score) in engine.evaluate(&probe) {
            *weights.entry(language).or_default() += score * count;
        }
    }
    weights
}

/// Detect languages under `root`.
pub fn detect_languages<P, I, S>(root: P, ignored: I, rules: &[Rule]) -> Result<LanguageWeights>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let root = root.as_ref();
    ensure_root(root)?;
    info!(rules = rules.len(), "detecting languages");

    let walker = TreeWalker::new(root, ignored);
    let signals = collect_signals(&walker, CollectMode::PathsOnly);
    let weights = score_languages(rules, &signals);

    info!(languages = weights.len(), "language detection complete");
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn python_rule(weight: u32) -> Rule {
        Rule::new("python", SignalType::Extension, "py", weight)
    }

    #[test]
    fn test_counts_weighted_files() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            fs::write(temp.path().join(format!("m{}.py", i)), "").unwrap();
        }
        fs::write(temp.path().join("index.ts"), "").unwrap();
        fs::write(temp.path().join("notes"), "").unwrap();

        let rules = vec![
            python_rule(1),
            Rule::new("typescript", SignalType::Extension, ".TS", 3),
        ];
        let weights = detect_languages(temp.path(), Vec::<String>::new(), &rules).unwrap();
        assert_eq!(weights.get("python"), Some(&10));
        assert_eq!(weights.get("typescript"), Some(&3));
        assert_eq!(weights.len(), 2);
    }

    #[test]
    fn test_first_registered_extension_rule_wins() {
        let rules = vec![
            Rule::new("c", SignalType::Extension, "h", 1),
            Rule::new("cpp", SignalType::Extension, ".h", 2),
            Rule::new("objc", SignalType::Extension, "h", 5).inactive(),
        ];
        let kept = extension_rules(&rules);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "c");

        let mut signals = SignalBundle::new();
        signals.record_extension("h");
        signals.record_extension("h");
        let weights = score_languages(&rules, &signals);
        assert_eq!(weights.get("c"), Some(&2));
        assert!(!weights.contains_key("cpp"));
    }

    #[test]
    fn test_inactive_rule_does_not_shadow() {
        let rules = vec![
            Rule::new("objc", SignalType::Extension, "m", 1).inactive(),
            Rule::new("matlab", SignalType::Extension, "m", 1),
        ];
        assert_eq!(extension_rules(&rules)[0].label, "matlab");
    }

    #[test]
    fn test_non_extension_rules_are_ignored() {
        let mut signals = SignalBundle::new();
        signals.record_extension("py");
        signals.insert(SignalType::File, "setup.py");
        let rules = vec![Rule::new("python", SignalType::File, "setup.py", 4)];
        assert!(score_languages(&rules, &signals).is_empty());
    }

    #[test]
    fn test_empty_tree() {
        let temp = TempDir::new().unwrap();
        let weights = detect_languages(temp.path(), Vec::<String>::new(), &[python_rule(1)]).unwrap();
        assert!(weights.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = detect_languages(temp.path().join("nope"), Vec::<String>::new(), &[]);
        assert!(result.is_err());
    }
}
