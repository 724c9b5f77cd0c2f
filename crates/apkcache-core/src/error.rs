//! Error taxonomy for the fetch-and-cache flow.
//!
//! Core functions return `anyhow::Result`; the failures callers may want to
//! tell apart are raised as [`CacheError`] and recovered with `downcast_ref`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Vendor page unreachable, answered with a non-2xx status, or carried no download link.
    #[error("no version found on vendor site {page_url}: {reason}")]
    RemoteResolution { page_url: String, reason: String },

    /// A package filename does not decompose into exactly three numeric version components.
    #[error("cannot read a major.minor.patch version from {filename:?}")]
    VersionFormat { filename: String },

    /// The download response carried no `Content-Length` header.
    #[error("server did not report a size for {url}")]
    TransferSizeUnknown { url: String },

    /// The download response had a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
}

impl CacheError {
    pub(crate) fn remote(page_url: &str, reason: impl Into<String>) -> Self {
        CacheError::RemoteResolution {
            page_url: page_url.to_string(),
            reason: reason.into(),
        }
    }
}
