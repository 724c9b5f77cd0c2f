//! `apkcache check` – resolve the remote package and report the planned action.

use anyhow::Result;
use apkcache_core::config::CacheConfig;
use apkcache_core::PackageCache;

pub fn run_check(cfg: &CacheConfig) -> Result<()> {
    let cache = PackageCache::new(cfg)?;
    let plan = cache.plan()?;

    println!(
        "Remote: {} ({})",
        plan.descriptor.version(),
        plan.descriptor.url()
    );
    match plan.local_newest {
        Some(v) => println!("Local:  {v}"),
        None => println!("Local:  none"),
    }
    if plan.state.needs_download() {
        println!("Action: download {} ({})", plan.descriptor.filename(), plan.state);
    } else {
        println!("Action: none ({})", plan.state);
    }
    Ok(())
}
