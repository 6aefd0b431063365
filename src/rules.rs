//! Weighted rule evaluation.
//!
//! A rule maps one signal to a labeled score contribution. The engine sums
//! the weights of every active rule whose signal is present in a
//! [`SignalBundle`]. Labels without a matching rule are absent from the
//! result rather than reported with a zero score.

use std::collections::BTreeMap;

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::signals::{SignalBundle, SignalType};

/// Raw score per label.
pub type Scores = BTreeMap<String, u64>;

fn default_weight() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// A mapping from one signal to a labeled, weighted score contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Language, framework or component name being scored
    pub label: String,
    pub signal_type: SignalType,
    /// Matched case-insensitively after trimming
    pub signal_value: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Rule {
    pub fn new(
        label: impl Into<String>,
        signal_type: SignalType,
        signal_value: impl Into<String>,
        weight: u32,
    ) -> Self {
        Self {
            label: label.into(),
            signal_type,
            signal_value: signal_value.into(),
            weight,
            is_active: true,
        }
    }

    /// Same rule, switched off.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The signal value as it is compared: trimmed and lower-cased.
    pub fn normalized_value(&self) -> String {
        self.signal_value.trim().to_lowercase()
    }
}

/// Compile a shell-style glob (`*`, `?`, `[...]`, `**`).
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

enum Matcher {
    Exact(String),
    Glob(GlobMatcher),
}

struct CompiledRule {
    label: String,
    signal_type: SignalType,
    matcher: Matcher,
    weight: u64,
}

impl CompiledRule {
    fn matches(&self, signals: &SignalBundle) -> bool {
        match &self.matcher {
            Matcher::Exact(value) => signals.contains(self.signal_type, value),
            Matcher::Glob(glob) => signals
                .values(SignalType::Glob)
                .any(|target| glob.is_match(target)),
        }
    }
}

/// A compiled, immutable rule set.
///
/// Inactive rules, rules with an empty value or zero weight, and glob rules
/// that fail to compile are dropped at construction.
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
}

impl RuleEngine {
    pub fn new(rules: &[Rule]) -> Self {
        let compiled = rules.iter().filter_map(compile_rule).collect();
        Self { rules: compiled }
    }

    /// Number of rules that survived compilation.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sum rule weights per label for every rule whose signal is present.
    pub fn evaluate(&self, signals: &SignalBundle) -> Scores {
        let mut scores = Scores::new();
        for rule in &self.rules {
            if rule.matches(signals) {
                *scores.entry(rule.label.clone()).or_default() += rule.weight;
            }
        }
        scores
    }
}

fn compile_rule(rule: &Rule) -> Option<CompiledRule> {
    if !rule.is_active || rule.weight == 0 {
        return None;
    }
    let value = rule.normalized_value();
    if value.is_empty() {
        debug!(label = %rule.label, "skipping rule with empty signal value");
        return None;
    }

    let matcher = if rule.signal_type == SignalType::Glob {
        match compile_glob(&value) {
            Ok(glob) => Matcher::Glob(glob),
            Err(e) => {
                warn!(label = %rule.label, pattern = %value, error = %e, "skipping invalid glob rule");
                return None;
            }
        }
    } else {
        Matcher::Exact(value)
    };

    Some(CompiledRule {
        label: rule.label.clone(),
        signal_type: rule.signal_type,
        matcher,
        weight: u64::from(rule.weight),
    })
}

/// One-shot form of [`RuleEngine::evaluate`].
pub fn evaluate(rules: &[Rule], signals: &SignalBundle) -> Scores {
    RuleEngine::new(rules).evaluate(signals)
}
