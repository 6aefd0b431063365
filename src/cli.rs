//! Command-line interface for stacklens.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::catalog::{RuleCatalog, DEFAULT_CATALOG_YAML};
use crate::detect::Analyzer;
use crate::report;
use crate::walk::{build_project_tree, CancelToken};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Default catalog file names to search for.
const DEFAULT_CATALOG_NAMES: &[&str] = &["stacklens.yaml", ".stacklens.yaml"];

/// Label shown when no catalog file was found.
const EMBEDDED_CATALOG_LABEL: &str = "(built-in)";

/// Detect the languages, frameworks, infrastructure, dependencies and HTTP
/// endpoints of a project from its file tree.
///
/// Every classification is produced by weighted rules from a YAML catalog,
/// so each score can be traced back to the signals that produced it.
#[derive(Parser)]
#[command(name = "stacklens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project directory
    #[command(visible_alias = "scan")]
    Analyze(AnalyzeArgs),
    /// Print the project tree
    Tree(TreeArgs),
    /// Write the default rule catalog to a file
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Project directory to analyze
    pub path: PathBuf,

    /// Path to catalog YAML file (default: auto-discover, then built-in)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Additional directory name to skip (repeatable)
    #[arg(short, long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Abort the analysis after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the tree command.
#[derive(Parser)]
pub struct TreeArgs {
    /// Project directory
    pub path: PathBuf,

    /// Path to catalog YAML file; only its ignored directories are used
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "stacklens.yaml")]
    pub output: PathBuf,
}

/// Discover a catalog file in `dir`, then in the current directory.
fn discover_catalog(dir: &Path) -> Option<PathBuf> {
    let search = [dir.to_path_buf(), PathBuf::from(".")];
    for base in &search {
        for name in DEFAULT_CATALOG_NAMES {
            let path = base.join(name);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Load the explicit, discovered or built-in catalog.
///
/// Returns the catalog and a label describing where it came from.
fn load_catalog(explicit: Option<&Path>, project: &Path) -> anyhow::Result<(RuleCatalog, String)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_catalog(project),
    };

    let (catalog, label) = match path {
        Some(path) => {
            debug!(catalog = %path.display(), "loading catalog");
            let catalog = RuleCatalog::parse_file(&path)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
            (catalog, path.to_string_lossy().to_string())
        }
        None => (
            RuleCatalog::default_catalog()?,
            EMBEDDED_CATALOG_LABEL.to_string(),
        ),
    };

    catalog.validate()?;
    Ok((catalog, label))
}

fn validate_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            format
        );
        return false;
    }
    true
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let (catalog, catalog_label) = match load_catalog(args.catalog.as_deref(), &args.path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'stacklens init' to create a catalog file");
            return Ok(EXIT_ERROR);
        }
    };

    let token = match args.timeout {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    let analyzer = Analyzer::new(&args.path)
        .ignored(args.ignore.iter().cloned())
        .cancel_token(token);
    let result = match analyzer.run(&catalog) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&result, &catalog_label)?,
        _ => report::write_pretty(&result, &catalog_label),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the tree command.
pub fn run_tree(args: &TreeArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let (catalog, _) = match load_catalog(args.catalog.as_deref(), &args.path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let tree = match build_project_tree(&args.path, catalog.ignored_directories.iter().cloned()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_tree_json(&tree)?,
        _ => report::write_tree_pretty(&tree),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CATALOG_YAML) {
        eprintln!("Error: failed to write catalog: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from the built-in catalog", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to add rules for your stack", args.output.display());
    println!("  2. Run: stacklens analyze . --catalog {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "stacklens", "analyze", "proj", "--format", "json", "-i", "tmp", "-i", "out",
            "--timeout", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.path, PathBuf::from("proj"));
                assert_eq!(args.format, "json");
                assert_eq!(args.ignore, vec!["tmp", "out"]);
                assert_eq!(args.timeout, Some(30));
                assert!(args.catalog.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_catalog_discovered_in_project() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("stacklens.yaml"),
            "name: local\nlanguage_rules:\n  - { label: go, signal_type: extension, signal_value: go }\n",
        )
        .unwrap();

        let (catalog, label) = load_catalog(None, temp.path()).unwrap();
        assert_eq!(catalog.name, "local");
        assert!(label.ends_with("stacklens.yaml"));
    }

    #[test]
    fn test_invalid_catalog_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(
            &path,
            "language_rules:\n  - { label: go, signal_type: file, signal_value: go.mod }\n",
        )
        .unwrap();
        assert!(load_catalog(Some(&path), temp.path()).is_err());
    }

    #[test]
    fn test_init_writes_default_catalog() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf/stacklens.yaml");
        let args = InitArgs {
            output: output.clone(),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let written = RuleCatalog::parse_file(&output).unwrap();
        assert_eq!(written.name, "default");

        // second run refuses to overwrite
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
