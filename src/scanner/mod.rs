//! Dependency aggregation — the one entry point the build graph calls.
//!
//! [`DependencyScanner::scan`] merges three dependency sources for a module
//! file into one ordered, deduplicated edge list: local `#include`
//! directives, transitive intra-project imports, and (for cgo modules)
//! sibling native files. Tool failures propagate whole; everything else
//! degrades to an empty contribution from that sub-step.

pub mod siblings;

pub use siblings::{glob_siblings, NATIVE_HEADER_SUFFIX, NATIVE_SOURCE_SUFFIX};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::parser::{extract_includes, has_interop_marker, QuoteStyle};
use crate::resolver::{GoListResolver, ImportResolver};
use crate::source::ModuleSource;

/// Suffix of compiled-module source files.
pub const MODULE_SUFFIX: &str = ".go";

/// Which sub-scan produced a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// A local `#include` directive in the cgo preamble.
    Include,
    /// A file of a transitively imported intra-project package.
    Import,
    /// A native file next to a module carrying the interop marker.
    Sibling,
}

impl fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeOrigin::Include => write!(f, "include"),
            EdgeOrigin::Import => write!(f, "import"),
            EdgeOrigin::Sibling => write!(f, "sibling"),
        }
    }
}

/// One `(module, dependency)` pair destined for the build graph.
///
/// Unique per scan by `path`. Insertion order reflects scan priority
/// (includes, then imports, then siblings) and carries no further meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Project-relative path of the scanned module.
    pub module: PathBuf,
    /// Project-relative path of the dependency.
    pub path: PathBuf,
    /// Which sub-scan first produced this edge.
    pub origin: EdgeOrigin,
}

/// Scans module files for the complete set of files whose change should
/// trigger their recompilation.
///
/// One scanner serves many concurrent `scan` calls: it holds only the
/// config and the resolver, and each invocation's state dies with it.
pub struct DependencyScanner {
    config: ScanConfig,
    resolver: Arc<dyn ImportResolver>,
}

impl DependencyScanner {
    /// Scanner with the production `go list` resolver and a
    /// process-lifetime cache.
    pub fn new(config: ScanConfig) -> Self {
        let resolver = Arc::new(GoListResolver::new(config.clone()));
        Self { config, resolver }
    }

    /// Scanner with a caller-provided resolver. This is the seam tests use
    /// to exercise aggregation without the external tool.
    pub fn with_resolver(config: ScanConfig, resolver: Arc<dyn ImportResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan one module file.
    ///
    /// `Ok(vec![])` means "scanned successfully, zero dependencies" —
    /// distinct from `Err(_)`, where a tool failure leaves the dependency
    /// set unknown and the caller must assume the file changed.
    pub fn scan(&self, module_path: &Path) -> Result<Vec<DependencyEdge>> {
        let source = ModuleSource::load(&self.config.project_root, module_path)?;
        let includes = extract_includes(source.content());
        let marker = has_interop_marker(source.content());

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut edges: Vec<DependencyEdge> = Vec::new();

        // Includes first. Angle-delimited headers resolve to the toolchain
        // include path and produce no edge.
        for directive in &includes {
            if directive.quote_style != QuoteStyle::Local {
                continue;
            }
            let resolved = self.resolve_include(source.directory(), &directive.header_name);
            push_edge(
                &mut edges,
                &mut seen,
                source.path(),
                resolved,
                EdgeOrigin::Include,
            );
        }

        // Then every file of every transitively imported intra-project
        // package. A resolver failure propagates untouched.
        let package_dirs = self
            .resolver
            .resolve_imports(source.path(), source.content())?;
        for dir in &package_dirs {
            match self.list_module_files(dir) {
                Some(files) => {
                    for file in files {
                        push_edge(&mut edges, &mut seen, source.path(), file, EdgeOrigin::Import);
                    }
                }
                None => {
                    warn!(
                        error = %ScanError::PathResolution { path: dir.clone() },
                        "import directory missing; recording best-effort edge"
                    );
                    push_edge(
                        &mut edges,
                        &mut seen,
                        source.path(),
                        dir.clone(),
                        EdgeOrigin::Import,
                    );
                }
            }
        }

        // Finally siblings, activated by the marker found during include
        // extraction.
        for sibling in glob_siblings(&self.config.project_root, source.directory(), marker) {
            push_edge(
                &mut edges,
                &mut seen,
                source.path(),
                sibling,
                EdgeOrigin::Sibling,
            );
        }

        debug!(
            module = %source.path().display(),
            edges = edges.len(),
            marker,
            "scan complete"
        );
        Ok(edges)
    }

    /// Resolve a local include against the module directory, falling back
    /// to the project include root. A name found in neither place still
    /// resolves to the fallback path, which is recorded as an edge anyway.
    fn resolve_include(&self, module_dir: &Path, header: &str) -> PathBuf {
        let local = module_dir.join(header);
        if self.config.project_root.join(&local).is_file() {
            return local;
        }
        let fallback = self.config.include_root.join(header);
        if !self.config.project_root.join(&fallback).is_file() {
            warn!(
                error = %ScanError::PathResolution { path: fallback.clone() },
                "include not found on disk; recording best-effort edge"
            );
        }
        fallback
    }

    /// All module source files in one package directory, sorted. `None`
    /// when the directory cannot be listed.
    fn list_module_files(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        let entries = fs::read_dir(self.config.project_root.join(dir)).ok()?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.ends_with(MODULE_SUFFIX).then(|| dir.join(name))
            })
            .collect();
        files.sort();
        Some(files)
    }
}

/// Record an edge unless its path was already seen or points back at the
/// module itself.
fn push_edge(
    edges: &mut Vec<DependencyEdge>,
    seen: &mut HashSet<PathBuf>,
    module: &Path,
    path: PathBuf,
    origin: EdgeOrigin,
) {
    if path == module {
        return;
    }
    if seen.insert(path.clone()) {
        edges.push(DependencyEdge {
            module: module.to_path_buf(),
            path,
            origin,
        });
    }
}
