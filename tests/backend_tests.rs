// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clubadmin::backend::{
    BackendError, MemoryStore, Op, Query, RestStore, Store, fetch_all, fetch_one, insert_record,
    parse_content_range, update_records, upsert_record,
};
use clubadmin::config::BackendConfig;
use clubadmin::models::{PriceConfig, Student};
use serde_json::json;

fn setup() -> MemoryStore {
    MemoryStore::new().with_rows(
        "students",
        vec![
            json!({"id": 1, "name": "Lucía Gómez", "dni": "30111222", "is_professor": false, "expires_on": "2025-03-10"}),
            json!({"id": 2, "name": "Ana Pérez", "dni": "28999111", "is_professor": true, "expires_on": null}),
            json!({"id": 3, "name": "Bruno Díaz", "dni": "40123456", "is_professor": false, "expires_on": "2025-01-31"}),
        ],
    )
}

#[test]
fn memory_store_filters_orders_and_limits() {
    let store = setup();
    let rows = store
        .select("students", &Query::new().order_by("name", false))
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Ana Pérez", "Bruno Díaz", "Lucía Gómez"]);

    let profs = store
        .select("students", &Query::new().eq("is_professor", true))
        .unwrap();
    assert_eq!(profs.len(), 1);
    assert_eq!(profs[0]["dni"], json!("28999111"));

    let later = store
        .select(
            "students",
            &Query::new()
                .gte("expires_on", "2025-02-01")
                .order_by("id", true)
                .limit(5),
        )
        .unwrap();
    assert_eq!(later.len(), 1);
    assert_eq!(later[0]["id"], json!(1));

    let first = store
        .select("students", &Query::new().order_by("id", true).limit(2))
        .unwrap();
    assert_eq!(first[0]["id"], json!(3));
    assert_eq!(first.len(), 2);

    let not_two = store
        .count("students", &Query::new().filter("id", Op::Neq, 2))
        .unwrap();
    assert_eq!(not_two, 2);
}

#[test]
fn nulls_sort_last_ascending() {
    let store = setup();
    let rows = store
        .select("students", &Query::new().order_by("expires_on", false))
        .unwrap();
    assert_eq!(rows[0]["id"], json!(3));
    assert_eq!(rows[2]["id"], json!(2));
}

#[test]
fn typed_insert_assigns_next_id() {
    let store = setup();
    let s = Student {
        id: None,
        name: "Carla Ruiz".into(),
        dni: "35000111".into(),
        phone: None,
        email: None,
        plan: Some("2x semana".into()),
        is_professor: false,
        last_payment: None,
        expires_on: None,
    };
    let saved = insert_record(&store, &s).unwrap();
    assert_eq!(saved.id, Some(4));
    let back: Student = fetch_one(&store, &Query::new().eq("dni", "35000111")).unwrap();
    assert_eq!(back.plan.as_deref(), Some("2x semana"));
}

#[test]
fn update_without_match_is_not_found() {
    let store = setup();
    let err = update_records::<Student>(
        &store,
        &Query::new().eq("dni", "00000000"),
        &json!({"plan": "libre"}),
    )
    .unwrap_err();
    assert!(matches!(err, BackendError::NotFound { .. }));

    let updated =
        update_records::<Student>(&store, &Query::new().eq("id", 2), &json!({"plan": "libre"}))
            .unwrap();
    assert_eq!(updated[0].plan.as_deref(), Some("libre"));
}

#[test]
fn upsert_merges_on_conflict_column() {
    let store = MemoryStore::new();
    let cfg = PriceConfig {
        key: "court_prices".into(),
        value: json!({"dia": 8000}),
    };
    upsert_record(&store, &cfg, "key").unwrap();
    let cfg2 = PriceConfig {
        key: "court_prices".into(),
        value: json!({"dia": 9000}),
    };
    upsert_record(&store, &cfg2, "key").unwrap();
    let all: Vec<PriceConfig> = fetch_all(&store, &Query::new()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, json!({"dia": 9000}));
}

#[test]
fn delete_reports_removed_rows() {
    let store = setup();
    assert_eq!(
        store
            .delete("students", &Query::new().eq("is_professor", false))
            .unwrap(),
        2
    );
    assert_eq!(store.count("students", &Query::new()).unwrap(), 1);
    assert_eq!(store.delete("missing", &Query::new()).unwrap(), 0);
}

#[test]
fn content_range_totals() {
    assert_eq!(parse_content_range("0-24/342"), Some(342));
    assert_eq!(parse_content_range("*/0"), Some(0));
    assert_eq!(parse_content_range("0-0/*"), None);
    assert_eq!(parse_content_range(""), None);
}

#[test]
fn rest_urls_follow_postgrest_conventions() {
    let cfg = BackendConfig {
        url: "https://club.example.co".into(),
        api_key: "anon".into(),
        token: None,
    };
    let store = RestStore::new(&cfg).unwrap();
    let url = store
        .table_url(
            "transactions",
            &Query::new()
                .gte("date", "2025-03-01")
                .eq("type", "income")
                .order_by("date", true)
                .limit(10),
        )
        .unwrap();
    assert_eq!(url.path(), "/rest/v1/transactions");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("select".into(), "*".into()),
            ("date".into(), "gte.2025-03-01".into()),
            ("type".into(), "eq.income".into()),
            ("order".into(), "date.desc".into()),
            ("limit".into(), "10".into()),
        ]
    );
}

#[test]
fn rest_store_rejects_bad_urls() {
    let cfg = BackendConfig {
        url: "not a url".into(),
        api_key: "anon".into(),
        token: None,
    };
    assert!(matches!(RestStore::new(&cfg), Err(BackendError::Url(_))));
}

#[test]
fn bearer_defaults_to_api_key() {
    let mut cfg = BackendConfig {
        url: "https://x.example".into(),
        api_key: "anon".into(),
        token: None,
    };
    assert_eq!(cfg.bearer(), "anon");
    cfg.token = Some("jwt".into());
    assert_eq!(cfg.bearer(), "jwt");
}

#[test]
fn null_fields_match_no_comparison() {
    let store = setup();
    // Ana has a null expiry and Carla none at all; neither is "not equal"
    let store = store.with_rows("students", vec![json!({"id": 4, "name": "Carla", "dni": "35000111"})]);
    let rows = store
        .select("students", &Query::new().filter("expires_on", Op::Neq, "2025-03-10"))
        .unwrap();
    let ids: Vec<i64> = rows.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(
        store
            .count("students", &Query::new().filter("expires_on", Op::Lt, "2030-01-01"))
            .unwrap(),
        2
    );
}

#[test]
fn any_of_matches_listed_values() {
    let store = setup();
    let q = Query::new().any_of("dni", &["28999111", "40123456", "00000000"]);
    assert_eq!(store.count("students", &q).unwrap(), 2);

    let cfg = BackendConfig {
        url: "https://club.example.co".into(),
        api_key: "anon".into(),
        token: None,
    };
    let url = RestStore::new(&cfg)
        .unwrap()
        .table_url("transactions", &Query::new().any_of("type", &["income", "ingreso"]))
        .unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs[1], ("type".to_string(), "in.(income,ingreso)".to_string()));
}
