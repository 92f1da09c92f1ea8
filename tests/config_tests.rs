// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clubadmin::backend::BackendError;
use clubadmin::cli;
use clubadmin::config::BackendConfig;
use tempfile::tempdir;

#[test]
fn flags_override_the_saved_file() {
    let base = BackendConfig {
        url: "https://old.example".into(),
        api_key: "anon".into(),
        token: Some("jwt".into()),
    };
    let m = cli::build_cli().get_matches_from([
        "clubadmin",
        "--url",
        " https://club.example.co ",
        "--token",
        "",
        "doctor",
    ]);
    let cfg = BackendConfig::with_overrides(Some(base), &m).unwrap();
    assert_eq!(cfg.url, "https://club.example.co");
    assert_eq!(cfg.api_key, "anon");
    assert_eq!(cfg.token, None);
}

#[test]
fn missing_url_or_key_is_a_config_error() {
    let m = cli::build_cli().get_matches_from(["clubadmin", "--api-key", "anon", "doctor"]);
    let err = BackendConfig::with_overrides(None, &m).unwrap_err();
    assert!(matches!(err, BackendError::Config(ref msg) if msg.contains("URL")));

    let m = cli::build_cli().get_matches_from(["clubadmin", "--url", "https://x.example", "doctor"]);
    let err = BackendConfig::with_overrides(None, &m).unwrap_err();
    assert!(matches!(err, BackendError::Config(ref msg) if msg.contains("API key")));
}

#[test]
fn save_then_load_keeps_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    assert!(BackendConfig::load(&path).unwrap().is_none());
    let cfg = BackendConfig {
        url: "https://club.example.co".into(),
        api_key: "anon".into(),
        token: None,
    };
    cfg.save(&path).unwrap();
    assert_eq!(BackendConfig::load(&path).unwrap(), Some(cfg));

    std::fs::write(&path, "not json").unwrap();
    assert!(BackendConfig::load(&path).is_err());
}
