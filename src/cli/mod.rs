//! CLI module for depscan.
//!
//! Commands:
//! - scan: dependency edges for one module file
//! - stats: whole-project scan + graph statistics
//! - dependents: rebuild impact of a changed file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depscan")]
#[command(about = "Source-dependency scanner for incremental builds")]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one module file and print its dependency edges
    Scan {
        /// Module file, relative to the project root
        file: PathBuf,

        /// Emit JSON instead of tab-separated paths
        #[arg(long)]
        json: bool,
    },

    /// Scan the whole project and print graph statistics
    Stats,

    /// Show which modules must rebuild when a file changes
    Dependents {
        /// File path, relative to the project root
        file: PathBuf,

        /// Emit JSON instead of one path per line
        #[arg(long)]
        json: bool,
    },
}
