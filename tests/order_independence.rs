//! Property tests: visitation order never changes results.

use std::fs;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::TempDir;

use stacklens::detect::{
    dependencies, endpoints, score_frameworks, score_infrastructure, score_languages,
};
use stacklens::signals::{collect_from_paths, CollectMode};
use stacklens::{Rule, SignalType};

const FIXTURE: &[(&str, &str)] = &[
    ("requirements.txt", "flask==3.0\nredis>=5\n"),
    ("svc/requirements.txt", "django==4.2\n"),
    ("web/package.json", r#"{"dependencies":{"express":"4"},"devDependencies":{"jest":"29"}}"#),
    ("app.py", "from flask import Flask\n@app.get(\"/a\")\ndef a():\n    pass\n"),
    ("svc/views.py", "import django\n@app.post('/b')\ndef b():\n    pass\n"),
    ("web/server.js", "const express = require('express');\napp.get('/c', c);\napp.put('/d', d);\n"),
    ("web/client.tsx", "import React from 'react';\n"),
    ("README.md", "# sample\n"),
];

fn build_fixture() -> (TempDir, Vec<PathBuf>, Vec<PathBuf>) {
    let temp = TempDir::new().unwrap();
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for (rel, content) in FIXTURE {
        let path = temp.path().join(rel);
        if let Some(parent) = path.parent() {
            if parent != temp.path() && !dirs.contains(&parent.to_path_buf()) {
                fs::create_dir_all(parent).unwrap();
                dirs.push(parent.to_path_buf());
            }
        }
        fs::write(&path, content).unwrap();
        files.push(path);
    }
    (temp, files, dirs)
}

fn rules() -> (Vec<Rule>, Vec<Rule>, Vec<Rule>) {
    let languages = vec![
        Rule::new("python", SignalType::Extension, "py", 1),
        Rule::new("javascript", SignalType::Extension, "js", 1),
        Rule::new("typescript", SignalType::Extension, "tsx", 2),
    ];
    let frameworks = vec![
        Rule::new("flask", SignalType::PythonDependency, "flask", 5),
        Rule::new("flask", SignalType::Import, "flask", 1),
        Rule::new("django", SignalType::PythonDependency, "django", 5),
        Rule::new("express", SignalType::NodeDependency, "express", 5),
        Rule::new("react", SignalType::Import, "react", 1),
    ];
    let infra = vec![
        Rule::new("Python", SignalType::Glob, "**/requirements.txt", 4),
        Rule::new("Web", SignalType::Directory, "web", 3),
        Rule::new("Services", SignalType::Directory, "svc", 2),
        Rule::new("Docs", SignalType::File, "README.md", 2),
        Rule::new("Ruby", SignalType::Glob, "*.rb", 1),
    ];
    (languages, frameworks, infra)
}

fn shuffled<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| items[i].clone()).collect()
}

fn snapshot(root: &Path, files: &[PathBuf], dirs: &[PathBuf]) -> String {
    let (language_rules, framework_rules, infra_rules) = rules();
    let signals = collect_from_paths(root, files, dirs, CollectMode::Full);
    format!(
        "{:?}|{:?}|{:?}|{:?}|{:?}",
        score_languages(&language_rules, &signals),
        score_frameworks(&framework_rules, &signals),
        score_infrastructure(&infra_rules, &signals.paths_only()),
        dependencies::extract_from_paths(root, files),
        endpoints::extract_from_paths(root, files),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn results_do_not_depend_on_file_order(
        order in Just((0..FIXTURE.len()).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let (temp, files, dirs) = build_fixture();
        let baseline = snapshot(temp.path(), &files, &dirs);

        let reordered_files = shuffled(&files, &order);
        let mut reordered_dirs = dirs.clone();
        reordered_dirs.reverse();
        prop_assert_eq!(baseline, snapshot(temp.path(), &reordered_files, &reordered_dirs));
    }
}

#[test]
fn fixture_produces_expected_counts() {
    let (temp, files, dirs) = build_fixture();
    let (language_rules, framework_rules, infra_rules) = rules();
    let signals = collect_from_paths(temp.path(), &files, &dirs, CollectMode::Full);

    let languages = score_languages(&language_rules, &signals);
    assert_eq!(languages.get("python"), Some(&2));
    assert_eq!(languages.get("javascript"), Some(&1));
    assert_eq!(languages.get("typescript"), Some(&2));

    let frameworks = score_frameworks(&framework_rules, &signals);
    let total: f64 = frameworks.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(frameworks.len(), 4);

    assert_eq!(
        score_infrastructure(&infra_rules, &signals.paths_only()),
        vec!["Python", "Web", "Docs", "Services"]
    );

    let deps = dependencies::extract_from_paths(temp.path(), &files);
    let sources: Vec<&str> = deps.iter().map(|d| d.source_file.as_str()).collect();
    assert_eq!(
        sources,
        vec![
            "requirements.txt",
            "requirements.txt",
            "svc/requirements.txt",
            "web/package.json",
            "web/package.json",
        ]
    );

    let found = endpoints::extract_from_paths(temp.path(), &files);
    let paths: Vec<&str> = found.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/a", "/b", "/c", "/d"]);
}
