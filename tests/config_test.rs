//! Configuration file tests
//!
//! Covers the create-on-first-run behavior and file-level failure modes; the
//! pure parsing and validation rules are tested in `config`'s unit tests.

use std::fs;

use tempfile::tempdir;

use tcpforward::config::RelayConfig;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    assert!(!path.exists());

    let config = RelayConfig::load_or_create(&path).expect("first run creates the file");

    assert!(path.exists(), "default config file written");
    assert_eq!(config, RelayConfig::default());

    // A second load reads the file it just wrote.
    let reloaded = RelayConfig::load_or_create(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_created_file_mentions_forward_server() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");

    RelayConfig::load_or_create(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("config-ver"));
    assert!(raw.contains("forward-server"));
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "port: [not a number\n").unwrap();

    let err = RelayConfig::load_or_create(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_out_of_range_port_in_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        "port: 70000\nforward-server:\n  ip: \"example.com\"\n  port: 25565\n",
    )
    .unwrap();

    let err = RelayConfig::load_or_create(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid local port: 70000"));
}

#[test]
fn test_missing_forward_server_in_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "config-ver: \"1.0\"\nport: 25565\n").unwrap();

    let err = RelayConfig::load_or_create(&path).unwrap_err();
    assert!(err.to_string().contains("Missing forward-server"));
}
