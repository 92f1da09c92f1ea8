// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clubadmin::backend::MemoryStore;
use clubadmin::models::TransactionKind;
use clubadmin::{cli, commands::transactions};
use rust_decimal::Decimal;
use serde_json::json;

fn setup() -> MemoryStore {
    MemoryStore::new().with_rows(
        "transactions",
        vec![
            json!({"id": 1, "date": "2025-01-01", "amount": 1500, "type": "income", "category": "Cancha"}),
            json!({"id": 2, "date": "2025-01-02", "amount": "200.50", "type": "expense", "category": "Luz"}),
            json!({"id": 3, "date": "2025-01-03", "amount": 8000, "type": "ingreso", "category": "Cuota pileta"}),
            json!({"id": 4, "date": "2025-02-01", "amount": 900, "type": "income", "category": "Cancha"}),
        ],
    )
}

fn run(store: &MemoryStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["clubadmin", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", sub)) = matches.subcommand() {
        transactions::handle(store, sub)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let store = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["clubadmin", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&store, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date.to_string(), "2025-02-01");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_filters_by_month_and_type() {
    let store = setup();
    let matches = cli::build_cli().get_matches_from([
        "clubadmin", "tx", "list", "--month", "2025-01", "--type", "income",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&store, list_m).unwrap();
    let ids: Vec<i64> = rows.iter().filter_map(|t| t.id).collect();
    // the "ingreso" row counts as income too
    assert_eq!(ids, vec![3, 1]);
    assert!(rows.iter().all(|t| t.kind == TransactionKind::Income));
}

#[test]
fn rows_decode_numbers_strings_and_spanish_types() {
    let store = setup();
    let matches = cli::build_cli().get_matches_from(["clubadmin", "tx", "list"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&store, list_m).unwrap();
    assert_eq!(rows.len(), 4);
    let luz = rows.iter().find(|t| t.category == "Luz").unwrap();
    assert_eq!(luz.amount, Decimal::new(20050, 2));
    assert_eq!(luz.kind, TransactionKind::Expense);
    let cuota = rows.iter().find(|t| t.id == Some(3)).unwrap();
    assert_eq!(cuota.kind, TransactionKind::Income);
}

#[test]
fn add_records_transaction() {
    let store = setup();
    run(
        &store,
        &[
            "add",
            "--date",
            "2025-02-10",
            "--amount",
            "350.25",
            "--type",
            "Expense",
            "--category",
            "Bebidas",
            "--method",
            "transferencia",
        ],
    )
    .unwrap();
    let rows = store.rows("transactions");
    let added = rows.iter().find(|r| r["id"] == json!(5)).unwrap();
    assert_eq!(added["type"], json!("expense"));
    assert_eq!(added["date"], json!("2025-02-10"));
    assert_eq!(added["payment_method"], json!("transferencia"));
}

#[test]
fn add_rejects_negative_amount_and_unknown_type() {
    let store = setup();
    let err = run(
        &store,
        &["add", "--amount=-10", "--type", "expense", "--category", "Luz"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must not be negative"));

    let err = run(
        &store,
        &["add", "--amount", "10", "--type", "refund", "--category", "Luz"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid transaction type"));
    assert_eq!(store.rows("transactions").len(), 4);
}

#[test]
fn rm_removes_only_existing_ids() {
    let store = setup();
    run(&store, &["rm", "--id", "2"]).unwrap();
    assert_eq!(store.rows("transactions").len(), 3);
    let err = run(&store, &["rm", "--id", "2"]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn type_filter_covers_every_label() {
    let store = MemoryStore::new().with_rows(
        "transactions",
        vec![
            json!({"id": 1, "date": "2025-04-01", "amount": 100, "type": "ingreso", "category": "Cuota"}),
            json!({"id": 2, "date": "2025-04-02", "amount": 200, "type": "income", "category": "Cancha"}),
            json!({"id": 3, "date": "2025-04-03", "amount": 50, "type": "gasto", "category": "Luz"}),
            json!({"id": 4, "date": "2025-04-04", "amount": 70, "type": "egreso", "category": "Cloro"}),
        ],
    );
    let query = |kind: &str| {
        let matches =
            cli::build_cli().get_matches_from(["clubadmin", "tx", "list", "--type", kind]);
        let (_, tx_m) = matches.subcommand().unwrap();
        let (_, list_m) = tx_m.subcommand().unwrap();
        transactions::query_rows(&store, list_m).unwrap()
    };
    assert_eq!(query("income").len(), 2);
    let expenses = query("gasto");
    assert_eq!(expenses.len(), 2);
    assert!(expenses.iter().all(|t| t.kind == TransactionKind::Expense));
}
