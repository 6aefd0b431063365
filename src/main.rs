//! stacklens CLI entry point.

use clap::Parser;
use stacklens::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

/// Log filter from `RUST_LOG`, then `STACKLENS_LOG`, defaulting to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("STACKLENS_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => cli::run_analyze(&args),
        Commands::Tree(args) => cli::run_tree(&args),
        Commands::Init(args) => cli::run_init(&args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
