// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clubadmin::backend::MemoryStore;
use clubadmin::commands::prices::{self, plan_adjustment};
use clubadmin::models::{COURT_PRICES_KEY, PriceConfig, SWIMMING_PRICES_KEY};
use clubadmin::cli;
use rust_decimal::Decimal;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn setup() -> MemoryStore {
    MemoryStore::new().with_rows(
        "price_config",
        vec![
            json!({"key": SWIMMING_PRICES_KEY,
                   "value": {"adultos": {"2x_semana": 18000, "libre": 25000}, "matricula": 5000}}),
            json!({"key": COURT_PRICES_KEY,
                   "value": {"padel": {"dia": 8000, "noche": 10000}}}),
        ],
    )
}

fn run(store: &MemoryStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["clubadmin", "prices"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("prices", sub)) = matches.subcommand() {
        prices::handle(store, sub)
    } else {
        panic!("prices command not parsed");
    }
}

fn value_of(store: &MemoryStore, key: &str) -> serde_json::Value {
    store
        .rows("price_config")
        .into_iter()
        .find(|r| r["key"] == json!(key))
        .map(|r| r["value"].clone())
        .unwrap()
}

#[test]
fn plan_reports_changes_per_key() {
    let configs: Vec<PriceConfig> = setup()
        .rows("price_config")
        .into_iter()
        .map(|r| serde_json::from_value(r).unwrap())
        .collect();
    let plan = plan_adjustment(&configs, Decimal::from(10), Decimal::from(500)).unwrap();
    assert_eq!(plan.len(), 2);
    let swim = &plan[0];
    assert_eq!(swim.config.key, SWIMMING_PRICES_KEY);
    assert_eq!(swim.config.value["adultos"]["2x_semana"], json!(20000));
    assert_eq!(swim.config.value["adultos"]["libre"], json!(27500));
    assert_eq!(swim.changes.len(), 3);
    // inputs stay untouched
    assert_eq!(configs[0].value["adultos"]["libre"], json!(25000));
}

#[test]
fn adjust_without_apply_is_a_preview() {
    let store = setup();
    let before = value_of(&store, COURT_PRICES_KEY);
    run(&store, &["adjust", "--percent", "15", "--round", "100"]).unwrap();
    assert_eq!(value_of(&store, COURT_PRICES_KEY), before);
}

#[test]
fn adjust_apply_saves_only_selected_keys() {
    let store = setup();
    let swim_before = value_of(&store, SWIMMING_PRICES_KEY);
    run(
        &store,
        &["adjust", "--percent", "15", "--round", "100", "--key", COURT_PRICES_KEY, "--apply"],
    )
    .unwrap();
    let court = value_of(&store, COURT_PRICES_KEY);
    assert_eq!(court["padel"]["dia"], json!(9200));
    assert_eq!(court["padel"]["noche"], json!(11500));
    assert_eq!(value_of(&store, SWIMMING_PRICES_KEY), swim_before);
    assert_eq!(store.rows("price_config").len(), 2);
}

#[test]
fn adjust_rejects_unknown_key_and_bad_increment() {
    let store = setup();
    let err = run(&store, &["adjust", "--percent", "5", "--key", "gym_prices"]).unwrap_err();
    assert!(err.to_string().contains("gym_prices"));
    assert!(run(&store, &["adjust", "--percent", "5", "--round", "0", "--apply"]).is_err());
    assert_eq!(value_of(&store, COURT_PRICES_KEY)["padel"]["dia"], json!(8000));
}

#[test]
fn set_replaces_or_creates_a_blob() {
    let store = setup();
    run(
        &store,
        &["set", "--key", COURT_PRICES_KEY, "--value", r#"{"futbol": {"hora": 20000}}"#],
    )
    .unwrap();
    assert_eq!(
        value_of(&store, COURT_PRICES_KEY),
        json!({"futbol": {"hora": 20000}})
    );

    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, r#"{{"clase": 3000}}"#).unwrap();
    tmp.flush().unwrap();
    let path = tmp.path().display().to_string();
    run(&store, &["set", "--key", "gym_prices", "--file", &path]).unwrap();
    assert_eq!(value_of(&store, "gym_prices"), json!({"clase": 3000}));
    assert_eq!(store.rows("price_config").len(), 3);
}

#[test]
fn set_rejects_invalid_json() {
    let store = setup();
    let err = run(&store, &["set", "--key", COURT_PRICES_KEY, "--value", "{nope"]).unwrap_err();
    assert!(err.to_string().contains("Invalid JSON"));
}

#[test]
fn negative_percent_lowers_prices() {
    let store = setup();
    run(&store, &["adjust", "--percent", "-10", "--apply"]).unwrap();
    let court = value_of(&store, COURT_PRICES_KEY);
    assert_eq!(court["padel"]["dia"], json!(7200));
    assert_eq!(court["padel"]["noche"], json!(9000));
    let swim = value_of(&store, SWIMMING_PRICES_KEY);
    assert_eq!(swim["adultos"]["libre"], json!(22500));
    assert_eq!(swim["matricula"], json!(4500));
}

#[test]
fn cut_past_zero_is_rejected_and_nothing_is_saved() {
    let store = setup();
    let before = value_of(&store, COURT_PRICES_KEY);
    let err = run(&store, &["adjust", "--percent", "-150", "--apply"]).unwrap_err();
    assert!(format!("{:#}", err).contains("above -100"));
    assert_eq!(value_of(&store, COURT_PRICES_KEY), before);
}
