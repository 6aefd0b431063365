//! Import statement tokenizing.
//!
//! One regex per source family, applied line by line. Only the module root
//! (first path segment) is kept, lower-cased.

use std::collections::BTreeSet;

use regex::Regex;

/// Source families with an import tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportFamily {
    Python,
    JavaScript,
    Java,
}

impl ImportFamily {
    /// Select a family from a lower-cased extension without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(ImportFamily::Python),
            "js" | "jsx" | "ts" | "tsx" => Some(ImportFamily::JavaScript),
            "java" => Some(ImportFamily::Java),
            _ => None,
        }
    }

    /// Collect the module roots imported by `content`.
    pub fn tokenize(&self, content: &str) -> BTreeSet<String> {
        let mut tokens = BTreeSet::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self {
                ImportFamily::Python => python_tokens(line, &mut tokens),
                ImportFamily::JavaScript => js_tokens(line, &mut tokens),
                ImportFamily::Java => java_tokens(line, &mut tokens),
            }
        }
        tokens
    }
}

lazy_static::lazy_static! {
    static ref PY_IMPORT_RE: Regex = Regex::new(r"^import\s+([A-Za-z0-9_.]+)").unwrap();
    static ref PY_FROM_RE: Regex = Regex::new(r"^from\s+([A-Za-z0-9_.]+)\s+import\b").unwrap();
    static ref JS_FROM_RE: Regex = Regex::new(r#"from\s+['"]([^'"]+)['"]"#).unwrap();
    static ref JS_REQUIRE_RE: Regex = Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    static ref JAVA_IMPORT_RE: Regex = Regex::new(r"^import\s+(?:static\s+)?([A-Za-z0-9_.]+)\s*;").unwrap();
}

fn push_root(tokens: &mut BTreeSet<String>, module: &str, separator: char) {
    // Relative imports name no external module.
    if module.starts_with('.') {
        return;
    }
    let root = module.split(separator).next().unwrap_or("").trim();
    if !root.is_empty() {
        tokens.insert(root.to_lowercase());
    }
}

fn python_tokens(line: &str, tokens: &mut BTreeSet<String>) {
    if let Some(caps) = PY_IMPORT_RE.captures(line) {
        push_root(tokens, &caps[1], '.');
    }
    if let Some(caps) = PY_FROM_RE.captures(line) {
        push_root(tokens, &caps[1], '.');
    }
}

fn js_tokens(line: &str, tokens: &mut BTreeSet<String>) {
    if let Some(caps) = JS_FROM_RE.captures(line) {
        push_root(tokens, &caps[1], '/');
    }
    if let Some(caps) = JS_REQUIRE_RE.captures(line) {
        push_root(tokens, &caps[1], '/');
    }
}

fn java_tokens(line: &str, tokens: &mut BTreeSet<String>) {
    if let Some(caps) = JAVA_IMPORT_RE.captures(line) {
        push_root(tokens, &caps[1], '.');
    }
}
