//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{AnalysisReport, DependencyCandidate, EndpointCandidate};
use crate::walk::{NodeKind, ProjectTree};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
///
/// Maps from the analysis become ordered lists so consumers see the same
/// ranking as the pretty output.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub catalog: String,
    pub files_scanned: usize,
    pub languages: Vec<JsonLanguage>,
    pub frameworks: Vec<JsonFramework>,
    pub infrastructure: Vec<String>,
    pub dependencies: Vec<DependencyCandidate>,
    pub endpoints: Vec<EndpointCandidate>,
}

/// One language and its weighted file count.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLanguage {
    pub language: String,
    pub weight: u64,
}

/// One framework and its normalized confidence.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFramework {
    pub framework: String,
    pub confidence: f64,
}

/// Languages by descending weight, ties by name.
fn ranked_languages(report: &AnalysisReport) -> Vec<(&String, u64)> {
    let mut languages: Vec<(&String, u64)> =
        report.languages.iter().map(|(l, w)| (l, *w)).collect();
    languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    languages
}

/// Build the JSON structure for a report.
pub fn build_json_report(report: &AnalysisReport, catalog: &str) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: report.root.clone(),
        catalog: catalog.to_string(),
        files_scanned: report.files_scanned,
        languages: ranked_languages(report)
            .into_iter()
            .map(|(language, weight)| JsonLanguage {
                language: language.clone(),
                weight,
            })
            .collect(),
        frameworks: report
            .ranked_frameworks()
            .into_iter()
            .map(|(framework, confidence)| JsonFramework {
                framework,
                confidence,
            })
            .collect(),
        infrastructure: report.infrastructure.clone(),
        dependencies: report.dependencies.clone(),
        endpoints: report.endpoints.clone(),
    }
}

/// Write results in JSON format.
pub fn write_json(report: &AnalysisReport, catalog: &str) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_report(report, catalog))?;
    println!("{}", json);
    Ok(())
}

/// Write a project tree in JSON format.
pub fn write_tree_json(tree: &ProjectTree) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(tree)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(report: &AnalysisReport, catalog: &str) {
    // Header
    println!();
    print!("  ");
    print!("{}", "stacklens".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Scan info
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", report.root);
    print!("  {}", "Catalog:  ".dimmed());
    println!("{}", catalog);
    print!("  {}", "Files:    ".dimmed());
    println!("{}", report.files_scanned);
    println!();

    if report.is_empty() {
        println!("  {}", "Nothing detected.".dimmed());
        println!();
        return;
    }

    write_languages(report);
    write_frameworks(report);
    write_infrastructure(&report.infrastructure);
    write_dependencies(&report.dependencies);
    write_endpoints(&report.endpoints);
}

fn write_section_header(title: &str, count: usize) {
    println!("  {} ({}):", title.bold(), count);
}

fn write_languages(report: &AnalysisReport) {
    if report.languages.is_empty() {
        return;
    }
    write_section_header("Languages", report.languages.len());

    let total: u64 = report.languages.values().sum();
    for (language, weight) in ranked_languages(report) {
        let share = if total > 0 {
            weight as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        println!(
            "    {:<20} {:>6}  {}",
            language,
            weight,
            format!("{:5.1}%", share).dimmed()
        );
    }
    println!();
}

fn write_frameworks(report: &AnalysisReport) {
    if report.frameworks.is_empty() {
        return;
    }
    write_section_header("Frameworks", report.frameworks.len());

    for (framework, confidence) in report.ranked_frameworks() {
        print!("    {:<20} ", framework);
        write_colored_confidence(confidence);
        println!();
    }
    println!();
}

fn write_colored_confidence(confidence: f64) {
    let text = format!("{:5.1}%", confidence * 100.0);
    match confidence {
        c if c >= 0.75 => print!("{}", text.green().bold()),
        c if c >= 0.5 => print!("{}", text.green()),
        c if c >= 0.25 => print!("{}", text.yellow()),
        _ => print!("{}", text.dimmed()),
    }
}

fn write_infrastructure(components: &[String]) {
    if components.is_empty() {
        return;
    }
    write_section_header("Infrastructure", components.len());

    for (rank, component) in components.iter().enumerate() {
        println!("    {} {}", format!("{:>2}.", rank + 1).dimmed(), component);
    }
    println!();
}

fn write_dependencies(dependencies: &[DependencyCandidate]) {
    if dependencies.is_empty() {
        return;
    }
    write_section_header("Dependencies", dependencies.len());

    let mut current_source: Option<&str> = None;
    for dep in dependencies {
        if current_source != Some(dep.source_file.as_str()) {
            println!("    {} {}", dep.source_file.blue(), format!("[{}]", dep.ecosystem).dimmed());
            current_source = Some(dep.source_file.as_str());
        }
        let version = dep.version.as_deref().unwrap_or("*");
        print!("      {:<28} {:<14}", dep.name, version);
        if dep.scope != "runtime" {
            print!(" {}", dep.scope.dimmed());
        }
        println!();
    }
    println!();
}

fn write_method_tag(method: &str) {
    let tag = format!("{:<7}", method);
    match method {
        "GET" | "HEAD" | "OPTIONS" => print!("{}", tag.green()),
        "POST" => print!("{}", tag.yellow()),
        "PUT" | "PATCH" => print!("{}", tag.blue()),
        "DELETE" => print!("{}", tag.red()),
        _ => print!("{}", tag),
    }
}

fn write_endpoints(endpoints: &[EndpointCandidate]) {
    if endpoints.is_empty() {
        return;
    }
    write_section_header("Endpoints", endpoints.len());

    for ep in endpoints {
        print!("    ");
        write_method_tag(&ep.http_method);
        print!(" {:<32}", ep.path);
        print!("{}", ep.source_file.blue());
        if let Some(symbol) = &ep.source_symbol {
            print!("{}", format!(" ({})", symbol).dimmed());
        }
        println!("  {}", format!("[{}]", ep.framework).dimmed());
    }
    println!();
}

/// Write a project tree as an indented listing.
pub fn write_tree_pretty(tree: &ProjectTree) {
    println!("{}", tree.name.cyan().bold());
    if let Some(children) = &tree.children {
        write_tree_children(children, "");
    }
    println!();
    println!(
        "  {}",
        format!("{} files", tree.file_count()).dimmed()
    );
}

fn write_tree_children(children: &[ProjectTree], indent: &str) {
    let last_index = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        let is_last = i == last_index;
        let branch = if is_last { "└── " } else { "├── " };
        match child.kind {
            NodeKind::Dir => println!("{}{}{}", indent, branch, child.name.blue().bold()),
            NodeKind::File => println!("{}{}{}", indent, branch, child.name),
        }
        if let Some(grandchildren) = &child.children {
            let next = format!("{}{}", indent, if is_last { "    " } else { "│   " });
            write_tree_children(grandchildren, &next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> AnalysisReport {
        let mut languages = BTreeMap::new();
        languages.insert("Python".to_string(), 3);
        languages.insert("Go".to_string(), 3);
        languages.insert("Rust".to_string(), 10);

        let mut frameworks = BTreeMap::new();
        frameworks.insert("Flask".to_string(), 0.25);
        frameworks.insert("FastAPI".to_string(), 0.75);

        AnalysisReport {
            root: "/srv/app".to_string(),
            files_scanned: 16,
            languages,
            frameworks,
            infrastructure: vec!["Docker".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_json_report_orders_entries() {
        let json = build_json_report(&sample(), "default");

        let languages: Vec<&str> = json.languages.iter().map(|l| l.language.as_str()).collect();
        assert_eq!(languages, vec!["Rust", "Go", "Python"]);

        let frameworks: Vec<&str> = json.frameworks.iter().map(|f| f.framework.as_str()).collect();
        assert_eq!(frameworks, vec!["FastAPI", "Flask"]);

        assert_eq!(json.catalog, "default");
        assert_eq!(json.files_scanned, 16);
        assert_eq!(json.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_json_report_serializes() {
        let json = serde_json::to_value(build_json_report(&sample(), "default")).unwrap();
        assert_eq!(json["path"], "/srv/app");
        assert_eq!(json["languages"][0]["weight"], 10);
        assert_eq!(json["frameworks"][0]["confidence"], 0.75);
        assert!(json["endpoints"].as_array().unwrap().is_empty());
    }
}
