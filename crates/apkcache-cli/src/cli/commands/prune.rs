//! `apkcache prune` – remove stale package versions.

use anyhow::Result;
use apkcache_core::config::CacheConfig;
use apkcache_core::PackageCache;

pub fn run_prune(cfg: &CacheConfig) -> Result<()> {
    let removed = PackageCache::new(cfg)?.prune()?;
    if removed.is_empty() {
        println!("Nothing to prune.");
    }
    for path in removed {
        println!("Removed {}", path.display());
    }
    Ok(())
}
