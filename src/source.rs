//! Source reader — loads one module file and its path context.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// One module file under scan.
///
/// Owned by a single scan invocation and never mutated. `path` is always
/// project-relative; the directory is derived from it.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    path: PathBuf,
    directory: PathBuf,
    content: String,
}

impl ModuleSource {
    /// Read the module at `path` (relative to `project_root`).
    pub fn load(project_root: &Path, path: &Path) -> Result<Self> {
        let abs = project_root.join(path);
        let content = fs::read_to_string(&abs).map_err(|e| ScanError::Source {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_content(path, content))
    }

    /// Build a `ModuleSource` from already-loaded text.
    pub fn from_content(path: &Path, content: String) -> Self {
        let directory = path.parent().unwrap_or(Path::new("")).to_path_buf();
        Self {
            path: path.to_path_buf(),
            directory,
            content,
        }
    }

    /// Project-relative path of the module file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project-relative directory containing the module file.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The module's text.
    pub fn content(&self) -> &str {
        &self.content
    }
}
