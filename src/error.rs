//! Error types for the dependency scanner.
//!
//! The split that matters to callers: tool failures (`ToolInvocation`,
//! `ToolTimeout`, `ToolOutput`) mean the dependency set is unknown and the
//! affected file must be rebuilt conservatively. Everything else is either
//! fatal only to a single scan (`Source`, `Config`) or not fatal at all
//! (`PathResolution`, which is logged while the edge is still recorded).

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors produced while scanning a module file for dependencies.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The module source file could not be read.
    #[error("failed to read module source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package-introspection subprocess could not be spawned or exited
    /// non-zero.
    #[error("package introspection failed for {package}: {reason}")]
    ToolInvocation { package: String, reason: String },

    /// The package-introspection subprocess exceeded its deadline.
    #[error("package introspection timed out for {package} after {timeout_secs}s")]
    ToolTimeout { package: String, timeout_secs: u64 },

    /// The package-introspection subprocess produced output that does not
    /// match the expected schema.
    #[error("unparsable introspection output for {package}: {source}")]
    ToolOutput {
        package: String,
        #[source]
        source: serde_json::Error,
    },

    /// A dependency path could not be mapped onto an existing file.
    /// Constructed for logging: the best-effort edge is recorded anyway.
    #[error("cannot resolve {path} to an existing file")]
    PathResolution { path: PathBuf },

    /// The scanner configuration file exists but could not be used.
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl ScanError {
    /// True when the dependency set for the scanned file is unknown and the
    /// caller must assume it changed.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            ScanError::ToolInvocation { .. }
                | ScanError::ToolTimeout { .. }
                | ScanError::ToolOutput { .. }
        )
    }
}
