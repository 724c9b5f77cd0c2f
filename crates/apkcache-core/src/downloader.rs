//! Streaming package download.
//!
//! One GET, written chunk by chunk to a staged `.part` file as libcurl hands
//! the body over. The size must be known from `Content-Length` before the
//! first byte is written; the staged file is renamed onto the target only
//! after every announced byte arrived.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::path::Path;
use std::str;
use std::time::{Duration, Instant};

use crate::config::HttpConfig;
use crate::descriptor::PackageDescriptor;
use crate::error::CacheError;
use crate::http::{self, ResponseHead};
use crate::progress::{to_mb, ProgressSink, ProgressStats};
use crate::storage::StagedFile;

/// Something that can materialize a resolved package at a local path.
pub trait Fetcher {
    /// Downloads `descriptor` to `dest`, returning the number of bytes written.
    fn fetch(
        &self,
        descriptor: &PackageDescriptor,
        dest: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<u64>;
}

/// [`Fetcher`] backed by libcurl.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    http: HttpConfig,
}

impl CurlFetcher {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(
        &self,
        descriptor: &PackageDescriptor,
        dest: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<u64> {
        download_package(descriptor.url(), dest, &self.http, progress)
    }
}

/// Downloads `url` to `dest` with a single streaming GET.
///
/// Fails with [`CacheError::Http`] on a non-2xx final response and with
/// [`CacheError::TransferSizeUnknown`] when `Content-Length` is missing;
/// neither creates a file. On any failure after that the staged file is
/// removed and `dest` is left as it was.
pub fn download_package(
    url: &str,
    dest: &Path,
    cfg: &HttpConfig,
    progress: &mut dyn ProgressSink,
) -> Result<u64> {
    let headers: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let mut staged: Option<StagedFile> = None;
    let mut aborted: Option<anyhow::Error> = None;
    let mut stats = ProgressStats::default();
    let started = Instant::now();

    let mut easy = http::new_easy(url, cfg, Duration::from_secs(cfg.download_timeout_secs))?;
    easy.low_speed_limit(cfg.low_speed_limit_bytes)?;
    easy.low_speed_time(Duration::from_secs(cfg.low_speed_time_secs))?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.borrow_mut().push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            if staged.is_none() {
                match open_staged(url, dest, &ResponseHead::parse(&headers.borrow())) {
                    Ok((file, total)) => {
                        stats.total_bytes = total;
                        progress.start(total);
                        staged = Some(file);
                    }
                    Err(e) => {
                        aborted = Some(e);
                        return Ok(0); // abort transfer
                    }
                }
            }
            let Some(file) = staged.as_mut() else {
                return Ok(0);
            };
            if let Err(e) = file.append(data) {
                aborted = Some(e);
                return Ok(0);
            }
            stats.bytes_done = file.written();
            stats.elapsed_secs = started.elapsed().as_secs_f64();
            progress.advance(&stats, data.len() as u64);
            Ok(data.len())
        })?;
        transfer.perform()
    };

    // Returning early drops `staged`, which removes the temp file.
    if let Some(e) = aborted {
        return Err(e);
    }
    if let Err(e) = performed {
        return Err(e).with_context(|| format!("GET {url} failed"));
    }

    // An empty body never reaches the write callback.
    let staged = match staged {
        Some(file) => file,
        None => {
            let (file, total) = open_staged(url, dest, &ResponseHead::parse(&headers.borrow()))?;
            stats.total_bytes = total;
            progress.start(total);
            file
        }
    };

    if stats.bytes_done != stats.total_bytes {
        staged.discard();
        anyhow::bail!(
            "partial transfer of {url}: wrote {} of {} bytes",
            stats.bytes_done,
            stats.total_bytes
        );
    }

    let path = staged.finalize()?;
    stats.elapsed_secs = started.elapsed().as_secs_f64();
    progress.finish(&stats);
    tracing::info!(
        path = %path.display(),
        mb = stats.total_mb(),
        secs = stats.elapsed_secs,
        rate_mb_s = to_mb(stats.bytes_per_sec() as u64),
        "download complete"
    );
    Ok(stats.bytes_done)
}

/// Checks the final response head and creates the staged file, preallocated to its size.
fn open_staged(url: &str, dest: &Path, head: &ResponseHead) -> Result<(StagedFile, u64)> {
    if !head.is_success() {
        return Err(CacheError::Http {
            url: url.to_string(),
            status: head.status.unwrap_or(0),
        }
        .into());
    }
    let total = head.content_length.ok_or_else(|| CacheError::TransferSizeUnknown {
        url: url.to_string(),
    })?;
    tracing::debug!(url, total, dest = %dest.display(), "starting download");
    let mut file = StagedFile::create(dest)?;
    file.preallocate(total)?;
    Ok((file, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(lines: &[&str]) -> ResponseHead {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        ResponseHead::parse(&lines)
    }

    #[test]
    fn open_staged_requires_length() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SoulKnight-1.0.0.apk");
        let err = open_staged("http://x/a.apk", &dest, &head(&["HTTP/1.1 200 OK"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CacheError>(),
            Some(CacheError::TransferSizeUnknown { .. })
        ));
        assert!(!crate::storage::temp_path(&dest).exists());
    }

    #[test]
    fn open_staged_rejects_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SoulKnight-1.0.0.apk");
        let err = open_staged(
            "http://x/a.apk",
            &dest,
            &head(&["HTTP/1.1 404 Not Found", "Content-Length: 9"]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CacheError>(),
            Some(CacheError::Http { status: 404, .. })
        ));
    }

    #[test]
    fn open_staged_preallocates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SoulKnight-1.0.0.apk");
        let (file, total) = open_staged(
            "http://x/a.apk",
            &dest,
            &head(&["HTTP/1.1 200 OK", "Content-Length: 4096"]),
        )
        .unwrap();
        assert_eq!(total, 4096);
        let tp = file.temp_path().to_path_buf();
        assert_eq!(std::fs::metadata(&tp).unwrap().len(), 4096);
        file.discard();
        assert!(!tp.exists());
    }

    #[test]
    fn open_staged_cleans_up_when_preallocation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SoulKnight-1.0.0.apk");
        let result = open_staged(
            "http://x/a.apk",
            &dest,
            &head(&["HTTP/1.1 200 OK", "Content-Length: 18446744073709551615"]),
        );
        assert!(result.is_err());
        assert!(!crate::storage::temp_path(&dest).exists());
        assert!(!dest.exists());
    }
}
