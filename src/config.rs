//! Scanner configuration.
//!
//! Every knob has a default, so a project with conventional layout needs no
//! config file at all. An optional `depscan.toml` at the project root
//! overrides individual fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Name of the optional config file looked up at the project root.
pub const CONFIG_FILE: &str = "depscan.toml";

/// Configuration for a [`DependencyScanner`](crate::DependencyScanner).
///
/// All paths except `project_root` are interpreted relative to
/// `project_root`, and all dependency edges are emitted relative to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Project root directory. Subprocesses run from here and every emitted
    /// path is relative to it.
    pub project_root: PathBuf,

    /// The `go` binary used for package introspection.
    pub go_bin: String,

    /// Import-path prefix identifying intra-project packages. Anything
    /// `go list` reports that does not start with this is external and
    /// ignored.
    pub module_prefix: String,

    /// Directory under the project root that `module_prefix` maps to.
    pub source_root: PathBuf,

    /// Fallback directory for headers not found next to the module.
    pub include_root: PathBuf,

    /// Value passed as `-mod=<mode>` to `go list`.
    pub mod_mode: String,

    /// Wall-clock bound on a single `go list` invocation, in seconds.
    pub tool_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            go_bin: "go".to_string(),
            module_prefix: "example.com/daos-stack/daos/src/control".to_string(),
            source_root: PathBuf::from("src/control"),
            include_root: PathBuf::from("src/include"),
            mod_mode: "vendor".to_string(),
            tool_timeout_secs: 30,
        }
    }
}

impl ScanConfig {
    /// Load the configuration for a project rooted at `root`.
    ///
    /// Reads `depscan.toml` from the root if present, otherwise falls back
    /// to defaults. `project_root` is always set to `root`, regardless of
    /// what the file says.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let text = fs::read_to_string(&path).map_err(|e| ScanError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?;
            toml::from_str(&text).map_err(|e| ScanError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };
        config.project_root = root.to_path_buf();
        Ok(config)
    }
}
