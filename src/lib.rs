//! # depscan
//!
//! Source-dependency scanning for incremental builds of cgo-heavy Go
//! module trees.
//!
//! For every compiled module file, depscan answers one question for the
//! build graph: which files, when changed, must trigger this module's
//! recompilation? Three sources merge into one deterministic, deduplicated
//! answer:
//!
//! - **Includes**: local `#include` directives in the cgo preamble
//! - **Imports**: transitive intra-project packages reported by `go list`
//! - **Siblings**: native `.c`/`.h` files next to modules carrying `import "C"`
//!
//! The scan is sound over complete: a path that cannot be resolved on disk
//! is still recorded (a spurious rebuild is cheaper than a stale one), and
//! an introspection failure is surfaced whole so the caller can fall back
//! to a conservative rebuild instead of building with stale assumptions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use depscan::{DependencyScanner, ScanConfig};
//! use std::path::Path;
//!
//! let config = ScanConfig::load(Path::new(".")).unwrap();
//! let scanner = DependencyScanner::new(config);
//!
//! // Which files should trigger a rebuild of this module?
//! let edges = scanner.scan(Path::new("src/control/server/main.go")).unwrap();
//! for edge in edges {
//!     println!("{} ({})", edge.path.display(), edge.origin);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod source;

// Re-exports for convenience
pub use error::{Result, ScanError};

// Scanner re-exports
pub use config::ScanConfig;
pub use scanner::{glob_siblings, DependencyEdge, DependencyScanner, EdgeOrigin};
pub use source::ModuleSource;

// Parsing
pub use parser::{
    extract_includes, has_interop_marker, IncludeDirective, QuoteStyle, INTEROP_MARKER,
};

// Import resolution
pub use resolver::{
    GoListResolver, ImportResolver, MemoryCache, NoopCache, ResolveCache,
};

// Graph view
pub use graph::{scan_project, DepGraph, GraphStats, ProjectScan};
