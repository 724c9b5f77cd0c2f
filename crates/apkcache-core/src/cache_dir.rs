//! Local cache inspection.
//!
//! The directory listing is the index: every `<prefix>-*.apk` file in the
//! cache directory is a candidate. Nothing else is persisted.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::version::{PackageVersion, PACKAGE_SUFFIX, VERSION_SEPARATOR};

/// One package file found in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPackage {
    pub path: PathBuf,
    pub filename: String,
    pub version: PackageVersion,
}

/// Snapshot of the cache directory, taken once per run.
#[derive(Debug, Clone, Default)]
pub struct LocalCacheState {
    /// Conforming entries, sorted oldest to newest.
    pub packages: Vec<CachedPackage>,
    /// Files matching the glob whose version could not be parsed.
    pub skipped: Vec<PathBuf>,
}

impl LocalCacheState {
    /// Lists `<package_prefix>-*.apk` in `dir`. Entries without a three-part
    /// numeric version are skipped and logged, not fatal.
    pub fn scan(dir: &Path, package_prefix: &str) -> Result<Self> {
        let pattern = format!(
            "{}/{}{}*{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            glob::Pattern::escape(package_prefix),
            VERSION_SEPARATOR,
            PACKAGE_SUFFIX
        );

        let mut state = LocalCacheState::default();
        let paths = glob::glob(&pattern).with_context(|| format!("bad cache glob {pattern}"))?;
        for entry in paths {
            let path = entry.with_context(|| format!("list {}", dir.display()))?;
            if !path.is_file() {
                continue;
            }
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => {
                    state.skipped.push(path);
                    continue;
                }
            };
            match PackageVersion::from_filename(&filename) {
                Ok(version) => state.packages.push(CachedPackage {
                    path,
                    filename,
                    version,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping cache entry: {}", e);
                    state.skipped.push(path);
                }
            }
        }
        state.packages.sort_by(|a, b| a.version.cmp(&b.version));

        tracing::debug!(
            dir = %dir.display(),
            packages = state.packages.len(),
            skipped = state.skipped.len(),
            "scanned cache directory"
        );
        Ok(state)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Entry with the highest version (numeric ordering).
    pub fn newest(&self) -> Option<&CachedPackage> {
        self.packages.last()
    }

    pub fn newest_version(&self) -> Option<PackageVersion> {
        self.newest().map(|p| p.version)
    }
}
