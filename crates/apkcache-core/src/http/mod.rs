//! Blocking HTTP GET over libcurl (via the `curl` crate).
//!
//! Two request shapes are needed: the vendor page, collected whole as text,
//! and the package body, which the downloader streams itself using
//! [`new_easy`] and [`ResponseHead`].

mod parse;

pub use parse::ResponseHead;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::HttpConfig;

/// Builds a GET handle with redirects and the configured timeouts applied.
pub(crate) fn new_easy(url: &str, cfg: &HttpConfig, timeout: Duration) -> Result<curl::easy::Easy> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))?;
    easy.timeout(timeout)?;
    if let Some(agent) = &cfg.user_agent {
        easy.useragent(agent)?;
    }
    Ok(easy)
}

/// Body and status of a completed page GET.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u32,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GETs `url` and returns the body as text (invalid UTF-8 is replaced).
///
/// Runs in the current thread. A non-2xx status is not an error here; check
/// [`Page::is_success`].
pub fn fetch_text(url: &str, cfg: &HttpConfig) -> Result<Page> {
    let mut body: Vec<u8> = Vec::new();
    let mut easy = new_easy(url, cfg, Duration::from_secs(cfg.page_timeout_secs))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let status = easy.response_code().context("no response code")?;
    tracing::debug!(url, status, bytes = body.len(), "fetched page");
    Ok(Page {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
