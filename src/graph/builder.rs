//! Project scan — walks the tree and scans every module file in parallel.
//!
//! Walks the project root respecting .gitignore, runs one independent
//! `scan()` per module file on the rayon pool, and assembles the results
//! into a [`DepGraph`]. Per-file tool failures are collected, not
//! swallowed: each listed file's dependency set is unknown and the build
//! graph must treat it as changed.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

use super::engine::DepGraph;
use crate::error::ScanError;
use crate::scanner::{DependencyEdge, DependencyScanner, MODULE_SUFFIX};

/// Result of scanning a whole project.
pub struct ProjectScan {
    /// The assembled dependency graph.
    pub graph: DepGraph,
    /// Files whose scan failed, with the error. Forced-rebuild candidates.
    pub failures: Vec<(PathBuf, ScanError)>,
    /// How many modules scanned cleanly.
    pub scanned: usize,
}

/// Scan every module file under the scanner's project root.
pub fn scan_project(scanner: &DependencyScanner) -> ProjectScan {
    let root = scanner.config().project_root.clone();
    let files: Vec<PathBuf> = WalkBuilder::new(&root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .ends_with(MODULE_SUFFIX)
        })
        .filter_map(|entry| {
            entry
                .into_path()
                .strip_prefix(&root)
                .ok()
                .map(|rel| rel.to_path_buf())
        })
        .collect();

    type Outcome = (PathBuf, Result<Vec<DependencyEdge>, ScanError>);
    let outcomes: Mutex<Vec<Outcome>> = Mutex::new(Vec::with_capacity(files.len()));

    files.par_iter().for_each(|rel| {
        let outcome = scanner.scan(rel);
        if let Ok(mut collected) = outcomes.lock() {
            collected.push((rel.clone(), outcome));
        }
    });

    let mut outcomes = outcomes.into_inner().unwrap_or_default();
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut graph = DepGraph::new();
    let mut failures = Vec::new();
    let mut scanned = 0;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(edges) => {
                scanned += 1;
                graph.insert_scan(&path, &edges);
            }
            Err(err) => {
                warn!(module = %path.display(), error = %err, "scan failed; assume changed");
                failures.push((path, err));
            }
        }
    }

    info!(
        modules = scanned,
        failures = failures.len(),
        "project scan complete"
    );
    ProjectScan {
        graph,
        failures,
        scanned,
    }
}
