//! Cache controller: discover, compare, fetch.
//!
//! Evaluated once per run: make sure the cache directory exists, resolve the
//! remote descriptor, snapshot the directory, classify into a [`CacheState`]
//! and download when the state calls for it.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::cache_dir::LocalCacheState;
use crate::config::CacheConfig;
use crate::descriptor::PackageDescriptor;
use crate::downloader::{CurlFetcher, Fetcher};
use crate::progress::ProgressSink;
use crate::resolver::{Resolver, VendorPageResolver};
use crate::version::PackageVersion;

/// Classification of the cache against the remote descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No package file in the cache at all.
    NoLocalCopy,
    /// The file for the remote version exists but is not a readable archive.
    CorruptLocalCopy,
    /// The remote version is newer than anything cached, or its file is missing.
    StaleLocalCopy,
    UpToDate,
}

impl CacheState {
    pub fn needs_download(self) -> bool {
        self != CacheState::UpToDate
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheState::NoLocalCopy => "no local copy",
            CacheState::CorruptLocalCopy => "local copy is corrupt",
            CacheState::StaleLocalCopy => "local copy is outdated",
            CacheState::UpToDate => "up to date",
        };
        f.write_str(s)
    }
}

/// Classifies the cache. `target` is where the remote package lives locally.
pub fn decide(local: &LocalCacheState, remote: &PackageDescriptor, target: &Path) -> CacheState {
    if local.is_empty() {
        return CacheState::NoLocalCopy;
    }
    if !target.exists() {
        return CacheState::StaleLocalCopy;
    }
    if !archive::is_valid_package(target) {
        return CacheState::CorruptLocalCopy;
    }
    match local.newest_version() {
        Some(newest) if remote.version() <= newest => CacheState::UpToDate,
        _ => CacheState::StaleLocalCopy,
    }
}

/// What a sync would do, computed without touching any package file.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub state: CacheState,
    pub descriptor: PackageDescriptor,
    /// `<cache_dir>/<descriptor filename>`.
    pub target: PathBuf,
    pub local_newest: Option<PackageVersion>,
}

/// Result of a completed sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub state: CacheState,
    /// Version now installed in the cache (the remote version).
    pub version: PackageVersion,
    pub path: PathBuf,
    /// Bytes fetched, or `None` when nothing was downloaded.
    pub bytes_downloaded: Option<u64>,
}

/// Owns the cache directory and the two remote-facing collaborators.
pub struct PackageCache<R = VendorPageResolver, F = CurlFetcher> {
    cache_dir: PathBuf,
    package_prefix: String,
    resolver: R,
    fetcher: F,
}

impl PackageCache {
    /// Builds the vendor-page resolver and curl fetcher from `cfg`.
    pub fn new(cfg: &CacheConfig) -> Result<Self> {
        Ok(Self::with_parts(
            &cfg.cache_dir,
            &cfg.package_prefix,
            VendorPageResolver::from_config(cfg)?,
            CurlFetcher::new(cfg.http.clone()),
        ))
    }
}

impl<R: Resolver, F: Fetcher> PackageCache<R, F> {
    pub fn with_parts(cache_dir: &Path, package_prefix: &str, resolver: R, fetcher: F) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            package_prefix: package_prefix.to_string(),
            resolver,
            fetcher,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create the cache directory if absent. Idempotent.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("create cache dir {}", self.cache_dir.display()))
    }

    /// Snapshot of the cache directory. No network access.
    pub fn local_state(&self) -> Result<LocalCacheState> {
        LocalCacheState::scan(&self.cache_dir, &self.package_prefix)
    }

    /// Resolve the remote package and classify the cache against it.
    /// A resolution failure aborts before the directory is scanned.
    pub fn plan(&self) -> Result<SyncPlan> {
        self.ensure_dir()?;
        let descriptor = self.resolver.resolve_latest()?;
        let local = self.local_state()?;
        let target = self.cache_dir.join(descriptor.filename());
        let state = decide(&local, &descriptor, &target);
        tracing::info!(
            remote = %descriptor.version(),
            local = ?local.newest_version().map(|v| v.to_string()),
            state = ?state,
            "cache classified"
        );
        Ok(SyncPlan {
            state,
            local_newest: local.newest_version(),
            descriptor,
            target,
        })
    }

    /// Carry out `plan`: drop a corrupt file, download when needed.
    pub fn execute(&self, plan: &SyncPlan, progress: &mut dyn ProgressSink) -> Result<SyncOutcome> {
        if plan.state == CacheState::CorruptLocalCopy {
            tracing::warn!(path = %plan.target.display(), "removing corrupt package");
            remove_if_present(&plan.target)?;
        }

        let bytes_downloaded = if plan.state.needs_download() {
            Some(self.fetcher.fetch(&plan.descriptor, &plan.target, progress)?)
        } else {
            None
        };

        Ok(SyncOutcome {
            state: plan.state,
            version: plan.descriptor.version(),
            path: plan.target.clone(),
            bytes_downloaded,
        })
    }

    /// `plan` followed by `execute`.
    pub fn sync(&self, progress: &mut dyn ProgressSink) -> Result<SyncOutcome> {
        let plan = self.plan()?;
        self.execute(&plan, progress)
    }

    /// Delete every cached package except the newest readable one.
    /// Returns the deleted paths; deletes nothing if no package is readable.
    pub fn prune(&self) -> Result<Vec<PathBuf>> {
        let local = self.local_state()?;
        let keep = match local
            .packages
            .iter()
            .rev()
            .find(|p| archive::is_valid_package(&p.path))
        {
            Some(p) => p.path.clone(),
            None => {
                tracing::info!("no readable package in cache, nothing pruned");
                return Ok(Vec::new());
            }
        };

        let mut removed = Vec::new();
        for package in local.packages.into_iter().filter(|p| p.path != keep) {
            remove_if_present(&package.path)?;
            tracing::info!(path = %package.path.display(), "pruned package");
            removed.push(package.path);
        }
        Ok(removed)
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}
