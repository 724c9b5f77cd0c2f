//! `apkcache status` – list cached packages.

use anyhow::Result;
use apkcache_core::archive::is_valid_package;
use apkcache_core::cache_dir::LocalCacheState;
use apkcache_core::config::CacheConfig;
use apkcache_core::progress::to_mb;
use apkcache_core::{PackageCache, PackageVersion};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub cache_dir: PathBuf,
    pub packages: Vec<StatusEntry>,
    /// Files that look like packages but carry no readable version.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusEntry {
    pub file: String,
    pub version: PackageVersion,
    pub bytes: u64,
    pub valid: bool,
}

pub(crate) fn build_report(cache_dir: PathBuf, state: LocalCacheState) -> StatusReport {
    let mut packages = Vec::with_capacity(state.packages.len());
    for p in state.packages.iter().rev() {
        let bytes = std::fs::metadata(&p.path).map(|m| m.len()).unwrap_or(0);
        packages.push(StatusEntry {
            file: p.filename.clone(),
            version: p.version,
            bytes,
            valid: is_valid_package(&p.path),
        });
    }
    StatusReport {
        cache_dir,
        packages,
        skipped: state.skipped,
    }
}

pub fn run_status(cfg: &CacheConfig, json: bool) -> Result<()> {
    let cache = PackageCache::new(cfg)?;
    let report = build_report(cache.cache_dir().to_path_buf(), cache.local_state()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.packages.is_empty() {
        println!("No packages in {}.", report.cache_dir.display());
    } else {
        println!("{:<10} {:>10} {:<6} {}", "VERSION", "SIZE(MB)", "VALID", "FILE");
        for e in &report.packages {
            println!(
                "{:<10} {:>10.2} {:<6} {}",
                e.version.to_string(),
                to_mb(e.bytes),
                if e.valid { "yes" } else { "no" },
                e.file
            );
        }
    }
    for path in &report.skipped {
        println!("skipped (no version): {}", path.display());
    }
    Ok(())
}
