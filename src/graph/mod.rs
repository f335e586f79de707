//! Dependency graph module — the project-wide view over scan results.
//!
//! Provides the graph data model over per-module scans, rebuild-impact
//! queries, and the parallel project walk that populates it.

pub mod builder;
pub mod engine;

pub use builder::{scan_project, ProjectScan};
pub use engine::{DepGraph, GraphStats};
