//! The dependency graph over scan results.
//!
//! Uses petgraph to store file-to-file dependency edges and answers the
//! build graph's question in reverse: given a changed file, which modules
//! must rebuild?

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::scanner::{DependencyEdge, EdgeOrigin};

/// Data stored in a graph node: one file under the project root.
#[derive(Debug, Clone)]
struct FileNode {
    path: PathBuf,
    /// True when the file was scanned as a module, not merely discovered as
    /// a dependency of one.
    module: bool,
}

/// The project-wide dependency graph assembled from per-module scans.
pub struct DepGraph {
    /// Directed edges point from a module to what it depends on.
    graph: DiGraph<FileNode, EdgeOrigin>,
    /// Index: file path -> node index.
    path_index: HashMap<PathBuf, NodeIndex>,
}

impl DepGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_index: HashMap::new(),
        }
    }

    /// Upsert a node for `path`. A node discovered first as a dependency is
    /// promoted to a module if later scanned as one.
    fn add_node(&mut self, path: &Path, module: bool) -> NodeIndex {
        if let Some(&idx) = self.path_index.get(path) {
            if module {
                if let Some(node) = self.graph.node_weight_mut(idx) {
                    node.module = true;
                }
            }
            return idx;
        }
        let idx = self.graph.add_node(FileNode {
            path: path.to_path_buf(),
            module,
        });
        self.path_index.insert(path.to_path_buf(), idx);
        idx
    }

    /// Ingest one module's scan result. Re-inserting the same pair updates
    /// the existing edge instead of duplicating it.
    pub fn insert_scan(&mut self, module: &Path, edges: &[DependencyEdge]) {
        let module_idx = self.add_node(module, true);
        for edge in edges {
            let dep_idx = self.add_node(&edge.path, false);
            self.graph.update_edge(module_idx, dep_idx, edge.origin);
        }
    }

    /// What `path` depends on, sorted.
    pub fn dependencies(&self, path: &Path) -> Vec<PathBuf> {
        self.neighbors(path, Direction::Outgoing)
    }

    /// Which modules must rebuild when `path` changes, sorted.
    pub fn dependents(&self, path: &Path) -> Vec<PathBuf> {
        self.neighbors(path, Direction::Incoming)
    }

    fn neighbors(&self, path: &Path, direction: Direction) -> Vec<PathBuf> {
        let Some(&idx) = self.path_index.get(path) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph[other].path.clone()
            })
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    // ─── Stats ──────────────────────────────────────────────────

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut module_count = 0;
        let mut dependency_count = 0;
        for node in self.graph.node_weights() {
            if node.module {
                module_count += 1;
            } else {
                dependency_count += 1;
            }
        }

        let mut include_edges = 0;
        let mut import_edges = 0;
        let mut sibling_edges = 0;
        for origin in self.graph.edge_weights() {
            match origin {
                EdgeOrigin::Include => include_edges += 1,
                EdgeOrigin::Import => import_edges += 1,
                EdgeOrigin::Sibling => sibling_edges += 1,
            }
        }

        GraphStats {
            module_count,
            dependency_count,
            total_edges: self.graph.edge_count(),
            include_edges,
            import_edges,
            sibling_edges,
        }
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    /// Files scanned as modules.
    pub module_count: usize,
    /// Files known only as dependencies.
    pub dependency_count: usize,
    pub total_edges: usize,
    pub include_edges: usize,
    pub import_edges: usize,
    pub sibling_edges: usize,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules, {} dependency files, {} edges (include: {}, import: {}, sibling: {})",
            self.module_count,
            self.dependency_count,
            self.total_edges,
            self.include_edges,
            self.import_edges,
            self.sibling_edges
        )
    }
}
