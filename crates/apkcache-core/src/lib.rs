pub mod config;
pub mod error;
pub mod logging;

pub mod archive;
pub mod cache_dir;
pub mod controller;
pub mod descriptor;
pub mod downloader;
pub mod http;
pub mod progress;
pub mod resolver;
pub mod storage;
pub mod version;

pub use controller::{CacheState, PackageCache, SyncOutcome, SyncPlan};
pub use descriptor::PackageDescriptor;
pub use error::CacheError;
pub use version::PackageVersion;
