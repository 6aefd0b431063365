//! FastAPI and Flask style route decorators.

use regex::Regex;

use super::{apply_prefix, EndpointCandidate, EndpointExtractor, HTTP_METHODS};

lazy_static::lazy_static! {
    /// `@app.get("/path")`, `@router.delete('/path')`
    static ref DECORATOR_RE: Regex = Regex::new(&format!(
        r#"@(app|router)\.({})\s*\(\s*["']([^"']*)["']"#,
        HTTP_METHODS.join("|")
    ))
    .unwrap();

    /// `@app.route("/path", methods=["GET", "POST"])`, `@router.api_route(...)`.
    /// A route without an explicit `methods=` list is not recognised.
    static ref ROUTE_RE: Regex = Regex::new(
        r#"@(app|router)\.(?:route|api_route)\s*\(\s*["']([^"']*)["']\s*,\s*methods\s*=\s*\[([^\]]*)\]"#
    )
    .unwrap();

    /// `APIRouter(prefix="/items")`, possibly spanning lines or with nested
    /// calls before `prefix=`
    static ref ROUTER_PREFIX_RE: Regex =
        Regex::new(r#"(?s)APIRouter\(.*?prefix\s*=\s*["']([^"']+)["']"#).unwrap();

    static ref METHOD_WORD_RE: Regex = Regex::new(r#"["']([A-Za-z]+)["']"#).unwrap();

    static ref DEF_RE: Regex =
        Regex::new(r"^(?:async\s+def|def)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// Route decorators in `.py` files.
pub struct PythonRouteExtractor;

impl EndpointExtractor for PythonRouteExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn framework(&self, content: &str) -> &'static str {
        let lowered = content.to_lowercase();
        if lowered.contains("fastapi") || lowered.contains("apirouter") {
            "fastapi"
        } else if lowered.contains("flask") {
            "flask"
        } else {
            "unknown"
        }
    }

    fn extract(&self, content: &str, source_file: &str) -> Vec<EndpointCandidate> {
        let prefix = router_prefix(content);
        let framework = self.framework(content);
        let lines: Vec<&str> = content.lines().collect();

        let mut found = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let (target, path, methods) = if let Some(caps) = DECORATOR_RE.captures(line) {
                (
                    caps[1].to_string(),
                    caps[3].to_string(),
                    vec![caps[2].to_uppercase()],
                )
            } else if let Some(caps) = ROUTE_RE.captures(line) {
                let methods = parse_methods(&caps[3]);
                (caps[1].to_string(), caps[2].to_string(), methods)
            } else {
                continue;
            };

            let path = if target == "router" {
                apply_prefix(prefix, &path)
            } else {
                path
            };
            let symbol = owning_function(&lines, index);

            for method in methods {
                found.push(EndpointCandidate {
                    http_method: method,
                    path: path.clone(),
                    framework: framework.to_string(),
                    language: "python".to_string(),
                    source_file: source_file.to_string(),
                    source_symbol: symbol.clone(),
                    confidence: 1.0,
                });
            }
        }
        found
    }
}

/// First `APIRouter(... prefix=...)` in the file, or empty.
fn router_prefix(content: &str) -> &str {
    ROUTER_PREFIX_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Quoted method names, upper-cased. `["GET"]` when none parse.
fn parse_methods(raw: &str) -> Vec<String> {
    let methods: Vec<String> = METHOD_WORD_RE
        .captures_iter(raw)
        .map(|caps| caps[1].to_uppercase())
        .collect();
    if methods.is_empty() {
        vec!["GET".to_string()]
    } else {
        methods
    }
}

/// Name of the function a decorator at `start` applies to.
///
/// Blank lines and further decorators are skipped; any other line that is
/// not a `def` ends the search.
fn owning_function(lines: &[&str], start: usize) -> Option<String> {
    for line in lines.iter().skip(start + 1) {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('@') {
            continue;
        }
        return DEF_RE.captures(stripped).map(|caps| caps[1].to_string());
    }
    None
}
