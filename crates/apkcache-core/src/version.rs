//! Version extraction from package filenames.
//!
//! A package is named `<prefix>-<major>.<minor>.<patch>.apk`. The version is
//! whatever follows the last `-` once the `.apk` suffix is stripped.

use std::fmt;

use serde::Serialize;

use crate::error::CacheError;

/// Suffix every package file carries.
pub const PACKAGE_SUFFIX: &str = ".apk";

/// Separator between the package prefix and its version.
pub const VERSION_SEPARATOR: char = '-';

/// Splits a package filename into its three raw version tokens.
///
/// Fails with [`CacheError::VersionFormat`] unless there are exactly three
/// `.`-separated tokens after the last separator.
pub fn extract_version_parts(filename: &str) -> Result<[&str; 3], CacheError> {
    let stem = filename.strip_suffix(PACKAGE_SUFFIX).unwrap_or(filename);
    let tail = stem.rsplit(VERSION_SEPARATOR).next().unwrap_or(stem);
    let parts: Vec<&str> = tail.split('.').collect();
    match parts.as_slice() {
        [major, minor, patch] => Ok([*major, *minor, *patch]),
        _ => Err(CacheError::VersionFormat {
            filename: filename.to_string(),
        }),
    }
}

/// A (major, minor, patch) triple. Ordering is numeric, component by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PackageVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses the version out of a package filename such as `SoulKnight-6.4.0.apk`.
    pub fn from_filename(filename: &str) -> Result<Self, CacheError> {
        let [major, minor, patch] = extract_version_parts(filename)?;
        let num = |s: &str| {
            s.parse::<u64>().map_err(|_| CacheError::VersionFormat {
                filename: filename.to_string(),
            })
        };
        Ok(Self::new(num(major)?, num(minor)?, num(patch)?))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
