//! Resolver interface for discovering the latest published package.
//!
//! The controller only depends on [`Resolver`]; scraping the vendor page is
//! one implementation and can be swapped for a structured API without
//! touching the orchestration logic.

use anyhow::Result;
use regex::Regex;

use crate::config::{CacheConfig, HttpConfig};
use crate::descriptor::PackageDescriptor;
use crate::error::CacheError;
use crate::http;
use crate::version::VERSION_SEPARATOR;

/// Trait implemented by anything that can name the newest remote package.
pub trait Resolver {
    fn resolve_latest(&self) -> Result<PackageDescriptor>;
}

/// Builds the download-link pattern: the literal prefix, then the shortest
/// run of URL characters ending in `.apk`.
pub fn download_link_pattern(download_url_prefix: &str) -> Result<Regex> {
    let pattern = format!(r#"{}[^\s"'<>]*?\.apk"#, regex::escape(download_url_prefix));
    Ok(Regex::new(&pattern)?)
}

/// Returns the first download link in `body`, if any.
pub fn extract_download_url<'a>(body: &'a str, pattern: &Regex) -> Option<&'a str> {
    pattern.find(body).map(|m| m.as_str())
}

/// True if `filename` is `<package_prefix>-...`, i.e. it lands inside the cache glob.
pub fn matches_package_prefix(filename: &str, package_prefix: &str) -> bool {
    filename
        .strip_prefix(package_prefix)
        .is_some_and(|rest| rest.starts_with(VERSION_SEPARATOR))
}

/// Scrapes a vendor web page for the first matching download link.
#[derive(Debug, Clone)]
pub struct VendorPageResolver {
    page_url: String,
    pattern: Regex,
    package_prefix: String,
    http: HttpConfig,
}

impl VendorPageResolver {
    pub fn new(
        page_url: &str,
        download_url_prefix: &str,
        package_prefix: &str,
        http: HttpConfig,
    ) -> Result<Self> {
        Ok(Self {
            page_url: page_url.to_string(),
            pattern: download_link_pattern(download_url_prefix)?,
            package_prefix: package_prefix.to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &CacheConfig) -> Result<Self> {
        Self::new(
            &cfg.vendor_page_url,
            &cfg.download_url_prefix,
            &cfg.package_prefix,
            cfg.http.clone(),
        )
    }
}

impl Resolver for VendorPageResolver {
    fn resolve_latest(&self) -> Result<PackageDescriptor> {
        let page = http::fetch_text(&self.page_url, &self.http)
            .map_err(|e| CacheError::remote(&self.page_url, format!("{e:#}")))?;
        if !page.is_success() {
            return Err(CacheError::remote(&self.page_url, format!("HTTP {}", page.status)).into());
        }

        let url = extract_download_url(&page.body, &self.pattern)
            .ok_or_else(|| CacheError::remote(&self.page_url, "no download link on the page"))?;
        let descriptor = PackageDescriptor::from_url(url)?;
        if !matches_package_prefix(descriptor.filename(), &self.package_prefix) {
            return Err(CacheError::remote(
                &self.page_url,
                format!(
                    "download link {} is not a {} package",
                    descriptor.filename(),
                    self.package_prefix
                ),
            )
            .into());
        }
        tracing::info!(
            url = descriptor.url(),
            version = %descriptor.version(),
            "resolved latest package"
        );
        Ok(descriptor)
    }
}
