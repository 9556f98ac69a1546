#![allow(clippy::unwrap_used, clippy::expect_used)]

use brrtfn::cli::resolve_config;
use brrtfn::config::{AppConfig, DEFAULT_ADDR};
use std::io::Write;

fn temp_config(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("brrtfn_config_")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = temp_config(
        "http:\n  addr: 127.0.0.1:9001\ndispatcher:\n  debug: true\n  base_path: /functions\n",
        ".yaml",
    );
    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.http.addr, "127.0.0.1:9001");
    assert!(config.dispatcher.debug);
    assert_eq!(config.dispatcher.base_path.as_deref(), Some("/functions"));
}

#[test]
fn test_load_json_file() {
    let file = temp_config(r#"{"http": {"addr": "0.0.0.0:7000"}}"#, ".json");
    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.http.addr, "0.0.0.0:7000");
    assert!(!config.dispatcher.debug);
}

#[test]
fn test_load_reports_invalid_yaml() {
    let file = temp_config("http: [not, a, map]\n", ".yaml");
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid YAML config"));
}

#[test]
fn test_cli_flags_override_file() {
    let file = temp_config("http:\n  addr: 127.0.0.1:9001\n", ".yml");
    let path = file.path().to_path_buf();

    let config = resolve_config(
        Some(&path),
        Some("127.0.0.1:9999".to_string()),
        true,
        Some("/fn".to_string()),
    )
    .unwrap();
    assert_eq!(config.http.addr, "127.0.0.1:9999");
    assert!(config.dispatcher.debug);
    assert_eq!(config.dispatcher.base_path.as_deref(), Some("/fn"));

    let defaults = resolve_config(None, None, false, None).unwrap();
    assert_eq!(defaults.http.addr, DEFAULT_ADDR);
}
