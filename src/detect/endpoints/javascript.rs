//! Express and Fastify style route calls in JavaScript and TypeScript.

use std::path::Path;

use regex::Regex;

use super::{EndpointCandidate, EndpointExtractor, HTTP_METHODS};

lazy_static::lazy_static! {
    /// `app.get("/path", handler)` with `"`, `'` or backtick quotes.
    static ref ROUTE_RE: Regex = Regex::new(&format!(
        r#"\b(?:app|router)\.({})\s*\(\s*(?:"([^"]+)"|'([^']+)'|`([^`]+)`)(?:\s*,\s*([A-Za-z_$][A-Za-z0-9_$]*))?"#,
        HTTP_METHODS.join("|")
    ))
    .unwrap();
}

/// Keywords that can follow the path but never name a handler.
const NOT_HANDLERS: [&str; 2] = ["async", "function"];

/// Route calls in `.js`, `.jsx`, `.ts` and `.tsx` files.
pub struct JsRouteExtractor;

impl EndpointExtractor for JsRouteExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "ts", "tsx"]
    }

    fn framework(&self, content: &str) -> &'static str {
        let lowered = content.to_lowercase();
        if lowered.contains("express") {
            "express"
        } else if lowered.contains("fastify") {
            "fastify"
        } else {
            "unknown"
        }
    }

    fn extract(&self, content: &str, source_file: &str) -> Vec<EndpointCandidate> {
        let framework = self.framework(content);
        let language = language_for(source_file);

        content
            .lines()
            .filter_map(|line| ROUTE_RE.captures(line))
            .filter_map(|caps| {
                let path = caps.get(2).or(caps.get(3)).or(caps.get(4))?.as_str();
                let handler = caps
                    .get(5)
                    .map(|m| m.as_str())
                    .filter(|name| !NOT_HANDLERS.contains(name))
                    .map(str::to_string);
                Some(EndpointCandidate {
                    http_method: caps[1].to_uppercase(),
                    path: path.to_string(),
                    framework: framework.to_string(),
                    language: language.to_string(),
                    source_file: source_file.to_string(),
                    source_symbol: handler,
                    confidence: 1.0,
                })
            })
            .collect()
    }
}

fn language_for(source_file: &str) -> &'static str {
    let ext = Path::new(source_file)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("ts") | Some("tsx") => "typescript",
        _ => "javascript",
    }
}
