//! Dependency manifest parsers.
//!
//! Recognises manifests by exact file name:
//! - requirements.txt
//! - pyproject.toml (PEP 621 and Poetry tables)
//! - package.json
//! - pom.xml
//! - build.gradle / build.gradle.kts
//!
//! Every parser is tolerant: malformed content yields an empty list.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::SignalType;

/// A dependency as declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Normalized name: extras stripped, trimmed, lower-cased
    pub name: String,
    /// Version constraint as written, e.g. `==4.2` or `^4.18.0`
    pub version: Option<String>,
    /// `runtime`, `dev`, `peer` or `optional`
    pub scope: &'static str,
}

impl DeclaredDependency {
    fn new(name: String, version: Option<String>, scope: &'static str) -> Self {
        Self {
            name,
            version,
            scope,
        }
    }
}

/// Manifest formats recognised by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Requirements,
    Pyproject,
    PackageJson,
    Pom,
    Gradle,
}

impl ManifestKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "requirements.txt" => Some(ManifestKind::Requirements),
            "pyproject.toml" => Some(ManifestKind::Pyproject),
            "package.json" => Some(ManifestKind::PackageJson),
            "pom.xml" => Some(ManifestKind::Pom),
            "build.gradle" | "build.gradle.kts" => Some(ManifestKind::Gradle),
            _ => None,
        }
    }

    /// The signal set this manifest feeds.
    pub fn signal_type(&self) -> SignalType {
        match self {
            ManifestKind::Requirements | ManifestKind::Pyproject => SignalType::PythonDependency,
            ManifestKind::PackageJson => SignalType::NodeDependency,
            ManifestKind::Pom | ManifestKind::Gradle => SignalType::JavaDependency,
        }
    }

    /// Parse every declared dependency from manifest content.
    pub fn parse(&self, content: &str) -> Vec<DeclaredDependency> {
        match self {
            ManifestKind::Requirements => parse_requirements(content),
            ManifestKind::Pyproject => parse_pyproject(content),
            ManifestKind::PackageJson => parse_package_json(content),
            ManifestKind::Pom => parse_pom(content),
            ManifestKind::Gradle => parse_gradle(content),
        }
    }
}

lazy_static::lazy_static! {
    // The name ends at the first operator, environment marker or URL reference.
    static ref NAME_END_RE: Regex = Regex::new(r"[<=>!~;@]").unwrap();
    static ref VERSION_RE: Regex = Regex::new(r"(==|>=|<=|~=|!=|>|<)\s*([^;\s#]+)").unwrap();
    static ref ARTIFACT_ID_RE: Regex = Regex::new(r"<artifactId>([^<]+)</artifactId>").unwrap();
    static ref QUOTED_RE: Regex = Regex::new(r#"['"]([^'"]+)['"]"#).unwrap();
}

/// Strip an `[extras]` suffix and surrounding whitespace, then lower-case.
///
/// - `package[extra]` → `package`
/// - ` Django ` → `django`
pub fn normalize_name(raw: &str) -> String {
    raw.split('[').next().unwrap_or("").trim().to_lowercase()
}

/// Parse one requirement specifier line.
///
/// Returns `None` for blank lines, comments, option lines (`-r`, `-e`,
/// `--index-url`) and lines whose name normalizes to nothing.
pub fn parse_requirement(line: &str) -> Option<DeclaredDependency> {
    let line = line.replace('\0', "");
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
        return None;
    }

    let requirement = trimmed.split('#').next().unwrap_or("").trim();
    let requirement = requirement.split(';').next().unwrap_or("").trim();
    if requirement.is_empty() {
        return None;
    }

    let name_part = NAME_END_RE.split(requirement).next().unwrap_or("");
    let name = normalize_name(name_part);
    if name.is_empty() {
        return None;
    }

    let version = VERSION_RE
        .captures(requirement)
        .map(|caps| format!("{}{}", &caps[1], &caps[2]));

    Some(DeclaredDependency::new(name, version, "runtime"))
}

/// Parse a requirements.txt body.
pub fn parse_requirements(content: &str) -> Vec<DeclaredDependency> {
    content.lines().filter_map(parse_requirement).collect()
}

#[derive(Debug, Default, Deserialize)]
struct Pyproject {
    #[serde(default)]
    project: Option<ProjectTable>,
    #[serde(default)]
    tool: Option<ToolTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectTable {
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    poetry: Option<PoetryTable>,
}

#[derive(Debug, Default, Deserialize)]
struct PoetryTable {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: BTreeMap<String, toml::Value>,
    #[serde(default)]
    group: BTreeMap<String, PoetryGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct PoetryGroup {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

/// Parse pyproject.toml: `[project]` PEP 508 strings and Poetry tables.
pub fn parse_pyproject(content: &str) -> Vec<DeclaredDependency> {
    let doc: Pyproject = match toml::from_str(content) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "malformed pyproject.toml");
            return Vec::new();
        }
    };

    let mut deps = Vec::new();

    if let Some(project) = &doc.project {
        deps.extend(project.dependencies.iter().filter_map(|d| parse_requirement(d)));
        for specs in project.optional_dependencies.values() {
            deps.extend(specs.iter().filter_map(|d| parse_requirement(d)).map(|mut d| {
                d.scope = "optional";
                d
            }));
        }
    }

    if let Some(poetry) = doc.tool.as_ref().and_then(|t| t.poetry.as_ref()) {
        deps.extend(poetry_entries(&poetry.dependencies, "runtime"));
        deps.extend(poetry_entries(&poetry.dev_dependencies, "dev"));
        for group in poetry.group.values() {
            deps.extend(poetry_entries(&group.dependencies, "dev"));
        }
    }

    deps
}

fn poetry_entries<'a>(
    table: &'a BTreeMap<String, toml::Value>,
    scope: &'static str,
) -> impl Iterator<Item = DeclaredDependency> + 'a {
    table.iter().filter_map(move |(name, value)| {
        let name = normalize_name(name);
        if name.is_empty() || name == "python" {
            return None;
        }
        let version = match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Table(t) => t
                .get("version")
                .and_then(toml::Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        Some(DeclaredDependency::new(name, version, scope))
    })
}

const PACKAGE_JSON_SECTIONS: &[(&str, &str)] = &[
    ("dependencies", "runtime"),
    ("devDependencies", "dev"),
    ("peerDependencies", "peer"),
    ("optionalDependencies", "optional"),
];

/// Parse package.json dependency sections. Non-object sections are ignored.
pub fn parse_package_json(content: &str) -> Vec<DeclaredDependency> {
    let doc: serde_json::Value = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "malformed package.json");
            return Vec::new();
        }
    };

    let mut deps = Vec::new();
    for (section, scope) in PACKAGE_JSON_SECTIONS {
        let Some(items) = doc.get(section).and_then(serde_json::Value::as_object) else {
            continue;
        };
        for (name, version) in items {
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                continue;
            }
            let version = version.as_str().map(str::to_string);
            deps.push(DeclaredDependency::new(name, version, scope));
        }
    }
    deps
}

/// Every `<artifactId>` in a pom.xml.
pub fn parse_pom(content: &str) -> Vec<DeclaredDependency> {
    ARTIFACT_ID_RE
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .map(|name| DeclaredDependency::new(name, None, "runtime"))
        .collect()
}

/// Every quoted string in a Gradle build script.
///
/// `group:artifact:version` coordinates contribute the artifact segment;
/// other strings (plugin ids, bare names) contribute themselves.
pub fn parse_gradle(content: &str) -> Vec<DeclaredDependency> {
    QUOTED_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let token = caps[1].trim();
            let mut parts = token.split(':');
            let first = parts.next().unwrap_or("");
            let name = parts.next().unwrap_or(first).trim().to_lowercase();
            if name.is_empty() {
                None
            } else {
                Some(DeclaredDependency::new(name, None, "runtime"))
            }
        })
        .collect()
}
