//! The resolved remote download target.

use anyhow::{Context, Result};

use crate::error::CacheError;
use crate::version::PackageVersion;

/// One discoverable remote package. `filename` and `version` are derived from
/// `url` at construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    url: String,
    filename: String,
    version: PackageVersion,
}

impl PackageDescriptor {
    /// Builds a descriptor from an absolute download URL.
    ///
    /// Fails with [`CacheError::VersionFormat`] if the last path segment does
    /// not carry a three-part version.
    pub fn from_url(url: &str) -> Result<Self> {
        let filename = filename_from_url_path(url)
            .with_context(|| format!("download URL has no file name: {url}"))?;
        let version = PackageVersion::from_filename(&filename)?;
        Ok(Self {
            url: url.to_string(),
            filename,
            version,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Last path segment of the URL; also the name used inside the cache directory.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn version(&self) -> PackageVersion {
        self.version
    }
}

/// Extracts the last path segment from a URL.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
