//! `apkcache sync` – bring the cache up to date.

use anyhow::Result;
use apkcache_core::config::CacheConfig;
use apkcache_core::{CacheState, PackageCache};

use crate::cli::progress_bar::DownloadBar;

pub fn run_sync(cfg: &CacheConfig) -> Result<()> {
    let cache = PackageCache::new(cfg)?;
    let plan = cache.plan()?;
    if plan.state == CacheState::CorruptLocalCopy {
        println!("Cached package is corrupt, downloading it again");
    }

    let mut bar = DownloadBar::default();
    let outcome = cache.execute(&plan, &mut bar)?;
    println!(
        "Installed version {} ({})",
        outcome.version,
        outcome.path.display()
    );
    Ok(())
}
