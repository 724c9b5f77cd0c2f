//! Tests for global options and config loading.

use super::parse;
use crate::cli::CliCommand;
use apkcache_core::config::CacheConfig;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_cache_dir_before_subcommand() {
    let cli = parse(&["apkcache", "--cache-dir", "/tmp/apks", "status"]);
    assert_eq!(cli.cache_dir.as_deref(), Some(Path::new("/tmp/apks")));
    assert!(matches!(cli.command, Some(CliCommand::Status { .. })));
}

#[test]
fn cli_parse_cache_dir_after_subcommand() {
    let cli = parse(&["apkcache", "sync", "--cache-dir", "apks"]);
    assert_eq!(cli.cache_dir, Some(PathBuf::from("apks")));
}

#[test]
fn cli_parse_config_path() {
    let cli = parse(&["apkcache", "--config", "/etc/apkcache.toml"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/apkcache.toml")));
    assert!(cli.command.is_none());
}

#[test]
fn cache_dir_flag_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut cfg = CacheConfig::default();
    cfg.package_prefix = "Other".to_string();
    std::fs::write(&path, toml_string(&cfg)).unwrap();

    let cli = parse(&[
        "apkcache",
        "--config",
        path.to_str().unwrap(),
        "--cache-dir",
        "/srv/apks",
    ]);
    let loaded = cli.load_config().unwrap();
    assert_eq!(loaded.cache_dir, PathBuf::from("/srv/apks"));
    assert_eq!(loaded.package_prefix, "Other");
}

#[test]
fn missing_config_file_is_an_error() {
    let cli = parse(&["apkcache", "--config", "/nonexistent/apkcache.toml"]);
    assert!(cli.load_config().is_err());
}

fn toml_string(cfg: &CacheConfig) -> String {
    format!(
        "cache_dir = {:?}\nvendor_page_url = {:?}\ndownload_url_prefix = {:?}\npackage_prefix = {:?}\n",
        cfg.cache_dir.to_string_lossy(),
        cfg.vendor_page_url,
        cfg.download_url_prefix,
        cfg.package_prefix
    )
}
