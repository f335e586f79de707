//! Sibling file globber — native files next to a cgo module.
//!
//! A module carrying the interop marker compiles against whatever `.c` and
//! `.h` files sit in its own directory, so all of them become dependencies.

use std::fs;
use std::path::{Path, PathBuf};

/// Suffixes of native files tracked alongside a cgo module.
pub const NATIVE_SOURCE_SUFFIX: &str = ".c";
pub const NATIVE_HEADER_SUFFIX: &str = ".h";

/// List the native source/header files in the module's own directory.
///
/// Without the marker this returns empty immediately, touching no
/// filesystem. With it, the directory is listed non-recursively and every
/// `.c`/`.h` file is returned, lexicographically sorted so repeated calls
/// against an unchanged listing produce identical output. A directory that
/// no longer exists yields empty: no directory, no siblings.
pub fn glob_siblings(project_root: &Path, directory: &Path, marker_present: bool) -> Vec<PathBuf> {
    if !marker_present {
        return Vec::new();
    }

    let entries = match fs::read_dir(project_root.join(directory)) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut siblings: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(NATIVE_SOURCE_SUFFIX) || name.ends_with(NATIVE_HEADER_SUFFIX) {
                Some(directory.join(name))
            } else {
                None
            }
        })
        .collect();
    siblings.sort();
    siblings
}
