//! depscan CLI - source-dependency scanning for build graphs.
//!
//! Usage:
//!   depscan scan <file>          # Dependencies of one module
//!   depscan scan <file> --json   # Same, as JSON edges
//!   depscan stats                # Project-wide graph statistics
//!   depscan dependents <file>    # What must rebuild if <file> changes

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depscan::cli::{Cli, Commands};
use depscan::{scan_project, DependencyScanner, ScanConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli.root.canonicalize().unwrap_or(cli.root);
    let config = ScanConfig::load(&root)?;
    let scanner = DependencyScanner::new(config);

    match cli.command {
        Commands::Scan { file, json } => {
            let edges = match scanner.scan(&file) {
                Ok(edges) => edges,
                Err(e) => {
                    if e.is_tool_failure() {
                        eprintln!(
                            "warning: dependencies of {} are unknown; treat it as changed",
                            file.display()
                        );
                    }
                    return Err(e.into());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&edges)?);
            } else if edges.is_empty() {
                println!("{}: no dependencies", file.display());
            } else {
                for edge in &edges {
                    println!("{}\t{}", edge.path.display(), edge.origin);
                }
            }
        }

        Commands::Stats => {
            let scan = scan_project(&scanner);
            println!("{}", scan.graph.stats());
            if !scan.failures.is_empty() {
                println!();
                println!(
                    "{} file(s) could not be scanned (assume changed):",
                    scan.failures.len()
                );
                for (path, err) in &scan.failures {
                    println!("  {}: {}", path.display(), err);
                }
            }
        }

        Commands::Dependents { file, json } => {
            let scan = scan_project(&scanner);
            let dependents = scan.graph.dependents(&file);
            if json {
                println!("{}", serde_json::to_string_pretty(&dependents)?);
            } else if dependents.is_empty() {
                println!("{}: nothing depends on it", file.display());
            } else {
                for path in &dependents {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}
