use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// libcurl transport knobs (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds for every request.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds for the vendor page GET.
    pub page_timeout_secs: u64,
    /// Whole-request timeout in seconds for the package download.
    pub download_timeout_secs: u64,
    /// Abort a download that stays below this many bytes/sec ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional User-Agent header; libcurl sends none by default.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            page_timeout_secs: 30,
            download_timeout_secs: 3600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/apkcache/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding downloaded packages. Relative paths resolve against the working directory.
    pub cache_dir: PathBuf,
    /// Vendor page scanned for the download link.
    pub vendor_page_url: String,
    /// Every download link starts with this prefix.
    pub download_url_prefix: String,
    /// Package files are named `<package_prefix>-<major>.<minor>.<patch>.apk`.
    pub package_prefix: String,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            vendor_page_url: "https://www.chillyroom.com/zh".to_string(),
            download_url_prefix: "https://apk.chillyroom.com/apks/".to_string(),
            package_prefix: "SoulKnight".to_string(),
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("apkcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from(path: &Path) -> Result<CacheConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: CacheConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.cache_dir, PathBuf::from(".cache"));
        assert_eq!(cfg.vendor_page_url, "https://www.chillyroom.com/zh");
        assert_eq!(cfg.download_url_prefix, "https://apk.chillyroom.com/apks/");
        assert_eq!(cfg.package_prefix, "SoulKnight");
        assert_eq!(cfg.http.connect_timeout_secs, 15);
        assert!(cfg.http.user_agent.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = CacheConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CacheConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_without_http_section() {
        let toml = r#"
            cache_dir = "/var/cache/apks"
            vendor_page_url = "https://vendor.example/"
            download_url_prefix = "https://cdn.vendor.example/apks/"
            package_prefix = "Game"
        "#;
        let cfg: CacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("/var/cache/apks"));
        assert_eq!(cfg.package_prefix, "Game");
        assert_eq!(cfg.http, HttpConfig::default());
    }

    #[test]
    fn config_toml_http_overrides() {
        let toml = r#"
            cache_dir = ".cache"
            vendor_page_url = "https://vendor.example/"
            download_url_prefix = "https://cdn.vendor.example/apks/"
            package_prefix = "Game"

            [http]
            connect_timeout_secs = 5
            page_timeout_secs = 10
            download_timeout_secs = 600
            low_speed_limit_bytes = 4096
            low_speed_time_secs = 20
            user_agent = "apkcache/0.1"
        "#;
        let cfg: CacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.http.connect_timeout_secs, 5);
        assert_eq!(cfg.http.download_timeout_secs, 600);
        assert_eq!(cfg.http.low_speed_limit_bytes, 4096);
        assert_eq!(cfg.http.user_agent.as_deref(), Some("apkcache/0.1"));
    }

    #[test]
    fn load_from_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = CacheConfig::default();
        cfg.package_prefix = "Other".to_string();
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(load_from(&path).unwrap().package_prefix, "Other");
    }
}
