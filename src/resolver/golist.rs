//! The `go list` adapter — resolves transitive intra-project imports.
//!
//! `go list -json` already reports the transitive closure of a package's
//! imports in its `Deps` array, so one blocking invocation per module is
//! enough. Only deps under the configured module prefix are intra-project;
//! everything else is external and dropped. A failed or timed-out
//! invocation is surfaced whole — never a partial result — so the build
//! graph can fall back to a conservative rebuild.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::resolver::cache::{CacheKey, MemoryCache, ResolveCache};

/// Resolves the transitive intra-project package directories a module
/// depends on. The one seam between the aggregator and the external tool;
/// tests substitute an in-memory fake.
pub trait ImportResolver: Send + Sync {
    /// Resolve imports for the module at `module_path` with the given
    /// content. Returns project-relative package directories.
    fn resolve_imports(&self, module_path: &Path, content: &str) -> Result<BTreeSet<PathBuf>>;
}

/// The `Deps` slice of `go list -json` output. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct PackageListing {
    #[serde(rename = "Deps")]
    deps: Option<Vec<String>>,
}

/// Production resolver backed by the `go` binary.
pub struct GoListResolver {
    config: ScanConfig,
    cache: Arc<dyn ResolveCache>,
}

impl GoListResolver {
    /// Resolver with a process-lifetime in-memory cache.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    /// Resolver with a caller-provided cache.
    pub fn with_cache(config: ScanConfig, cache: Arc<dyn ResolveCache>) -> Self {
        Self { config, cache }
    }

    /// The package argument handed to `go list`: the module's directory,
    /// made explicitly relative so resolution happens against the project
    /// root it runs from.
    fn package_argument(&self, module_path: &Path) -> String {
        let dir = module_path.parent().unwrap_or(Path::new(""));
        if dir.as_os_str().is_empty() {
            "./.".to_string()
        } else {
            format!("./{}", dir.display())
        }
    }

    /// Run `go list -json -mod=<mode> <package>` from the project root and
    /// reduce its `Deps` to intra-project package directories.
    fn introspect(&self, package: &str) -> Result<BTreeSet<PathBuf>> {
        let mut cmd = Command::new(&self.config.go_bin);
        cmd.arg("list")
            .arg("-json")
            .arg(format!("-mod={}", self.config.mod_mode))
            .arg(package)
            .current_dir(&self.config.project_root);

        let timeout = Duration::from_secs(self.config.tool_timeout_secs);
        let output = run_bounded(cmd, timeout).map_err(|e| ScanError::ToolInvocation {
            package: package.to_string(),
            reason: e.to_string(),
        })?;
        let output = output.ok_or(ScanError::ToolTimeout {
            package: package.to_string(),
            timeout_secs: self.config.tool_timeout_secs,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("exit status {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(ScanError::ToolInvocation {
                package: package.to_string(),
                reason,
            });
        }

        let listing: PackageListing =
            serde_json::from_slice(&output.stdout).map_err(|e| ScanError::ToolOutput {
                package: package.to_string(),
                source: e,
            })?;
        Ok(self.intra_project_dirs(&listing))
    }

    /// Keep deps under the module prefix and map each onto its directory
    /// under the source root.
    fn intra_project_dirs(&self, listing: &PackageListing) -> BTreeSet<PathBuf> {
        let mut dirs = BTreeSet::new();
        for dep in listing.deps.iter().flatten() {
            let Some(suffix) = dep.strip_prefix(&self.config.module_prefix) else {
                continue;
            };
            let suffix = suffix.trim_start_matches('/');
            let dir = if suffix.is_empty() {
                self.config.source_root.clone()
            } else {
                self.config.source_root.join(suffix)
            };
            dirs.insert(dir);
        }
        dirs
    }
}

impl ImportResolver for GoListResolver {
    fn resolve_imports(&self, module_path: &Path, content: &str) -> Result<BTreeSet<PathBuf>> {
        let key = CacheKey::for_content(module_path, content);
        if let Some(dirs) = self.cache.get(&key) {
            debug!(module = %module_path.display(), "resolver cache hit");
            return Ok(dirs);
        }

        let package = self.package_argument(module_path);
        let dirs = self.introspect(&package)?;
        debug!(
            module = %module_path.display(),
            package = %package,
            dirs = dirs.len(),
            "resolved intra-project imports"
        );
        self.cache.insert(key, dirs.clone());
        Ok(dirs)
    }
}

/// Result of a bounded subprocess run.
struct ToolOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Run a command, draining its pipes off-thread, and kill it if it outlives
/// `timeout`. `Ok(None)` means the deadline fired.
fn run_bounded(mut cmd: Command, timeout: Duration) -> std::io::Result<Option<ToolOutput>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain both pipes concurrently; a full pipe would otherwise wedge the
    // child and turn every large listing into a timeout.
    let stdout_pipe = child.stdout.take();
    let stdout_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stdout_pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_pipe = child.stderr.take();
    let stderr_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr_pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            None => thread::sleep(Duration::from_millis(25)),
        }
    };

    Ok(Some(ToolOutput {
        status,
        stdout: stdout_thread.join().unwrap_or_default(),
        stderr: stderr_thread.join().unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::cache::NoopCache;

    fn config_with_bin(root: &Path, bin: &str) -> ScanConfig {
        ScanConfig {
            project_root: root.to_path_buf(),
            go_bin: bin.to_string(),
            module_prefix: "example.com/acme/storage/src/control".to_string(),
            source_root: PathBuf::from("src/control"),
            tool_timeout_secs: 5,
            ..ScanConfig::default()
        }
    }

    /// Write an executable shell script standing in for the `go` binary.
    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-go");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_package_argument_forms() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = GoListResolver::new(config_with_bin(dir.path(), "go"));
        assert_eq!(
            resolver.package_argument(Path::new("src/control/server/main.go")),
            "./src/control/server"
        );
        assert_eq!(resolver.package_argument(Path::new("main.go")), "./.");
    }

    #[test]
    fn test_prefix_filter_and_directory_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = GoListResolver::new(config_with_bin(dir.path(), "go"));
        let listing = PackageListing {
            deps: Some(vec![
                "example.com/acme/storage/src/control/common".to_string(),
                "example.com/acme/storage/src/control/lib/daos".to_string(),
                "example.com/acme/storage/src/control".to_string(),
                "github.com/pkg/errors".to_string(),
                "fmt".to_string(),
            ]),
        };

        let dirs = resolver.intra_project_dirs(&listing);
        let expected: BTreeSet<PathBuf> = [
            "src/control",
            "src/control/common",
            "src/control/lib/daos",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(dirs, expected);
    }

    #[test]
    fn test_missing_deps_field_means_no_imports() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = GoListResolver::new(config_with_bin(dir.path(), "go"));
        let listing: PackageListing = serde_json::from_str("{}").unwrap();
        assert!(resolver.intra_project_dirs(&listing).is_empty());
    }

    #[test]
    fn test_spawn_failure_is_tool_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = GoListResolver::with_cache(
            config_with_bin(dir.path(), "depscan-test-no-such-binary"),
            Arc::new(NoopCache),
        );
        let err = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main\n")
            .unwrap_err();
        assert!(matches!(err, ScanError::ToolInvocation { .. }));
        assert!(err.is_tool_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_tool_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_tool(dir.path(), "echo 'go: build constraints exclude all files' >&2; exit 1");
        let resolver =
            GoListResolver::with_cache(config_with_bin(dir.path(), &bin), Arc::new(NoopCache));

        let err = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main\n")
            .unwrap_err();
        match err {
            ScanError::ToolInvocation { reason, .. } => {
                assert!(reason.contains("build constraints"));
            }
            other => panic!("expected ToolInvocation, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unparsable_output_is_tool_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_tool(dir.path(), "echo 'not json at all'");
        let resolver =
            GoListResolver::with_cache(config_with_bin(dir.path(), &bin), Arc::new(NoopCache));

        let err = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main\n")
            .unwrap_err();
        assert!(matches!(err, ScanError::ToolOutput { .. }));
        assert!(err.is_tool_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_is_tool_timeout_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_tool(dir.path(), "sleep 30");
        let mut config = config_with_bin(dir.path(), &bin);
        config.tool_timeout_secs = 1;
        let resolver = GoListResolver::with_cache(config, Arc::new(NoopCache));

        let err = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main\n")
            .unwrap_err();
        assert!(matches!(err, ScanError::ToolTimeout { .. }));
        assert!(err.is_tool_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_listing_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_tool(
            dir.path(),
            r#"echo '{"Deps": ["example.com/acme/storage/src/control/common", "github.com/external/pkg", "os"]}'"#,
        );
        let resolver =
            GoListResolver::with_cache(config_with_bin(dir.path(), &bin), Arc::new(NoopCache));

        let dirs = resolver
            .resolve_imports(Path::new("src/control/server/main.go"), "package main\n")
            .unwrap();
        let expected: BTreeSet<PathBuf> =
            [PathBuf::from("src/control/common")].into_iter().collect();
        assert_eq!(dirs, expected);
    }

    #[test]
    fn test_cache_hit_bypasses_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        // A resolver whose binary cannot possibly run: only a cache hit can
        // make this succeed.
        let cache = Arc::new(MemoryCache::new());
        let key = CacheKey::for_content(Path::new("pkg/main.go"), "package main\n");
        let cached: BTreeSet<PathBuf> = [PathBuf::from("src/control/common")].into_iter().collect();
        cache.insert(key, cached.clone());

        let resolver = GoListResolver::with_cache(
            config_with_bin(dir.path(), "depscan-test-no-such-binary"),
            cache,
        );
        let dirs = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main\n")
            .unwrap();
        assert_eq!(dirs, cached);

        // Different content misses the cache and falls through to the
        // (failing) subprocess.
        let err = resolver
            .resolve_imports(Path::new("pkg/main.go"), "package main // edited\n")
            .unwrap_err();
        assert!(err.is_tool_failure());
    }
}
