// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clubadmin::commands::doctor::check;
use clubadmin::models::{InventoryItem, Promotion, Student, Transaction};
use serde_json::{Value, json};

fn decode<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).unwrap())
        .collect()
}

fn codes(issues: &[(String, String)]) -> Vec<&str> {
    issues.iter().map(|(c, _)| c.as_str()).collect()
}

#[test]
fn clean_data_has_no_issues() {
    let students: Vec<Student> = decode(vec![json!({"name": "A", "dni": "30111222",
        "last_payment": "2025-03-01", "expires_on": "2025-04-01"})]);
    let txs: Vec<Transaction> = decode(vec![
        json!({"date": "2025-03-01", "amount": 100, "type": "income", "category": "Cuota"}),
    ]);
    assert!(check(&students, &txs, &[], &[]).is_empty());
}

#[test]
fn every_problem_kind_is_reported() {
    let students: Vec<Student> = decode(vec![
        json!({"name": "A", "dni": "30111222"}),
        json!({"name": "B", "dni": "30111222"}),
        json!({"name": "C", "dni": "40123456", "last_payment": "2025-03-10", "expires_on": "2025-03-01"}),
    ]);
    let txs: Vec<Transaction> = decode(vec![
        json!({"id": 7, "date": "2025-03-01", "amount": 100, "type": "income", "category": " "}),
        json!({"id": 8, "date": "2025-03-02", "amount": "-5", "type": "expense", "category": "Luz"}),
    ]);
    let items: Vec<InventoryItem> =
        decode(vec![json!({"name": "Agua", "initial_stock": 1, "exits": 3})]);
    let promos: Vec<Promotion> = decode(vec![json!({"name": "P", "price": 1,
        "valid_from": "2025-05-01", "valid_until": "2025-04-01"})]);

    let issues = check(&students, &txs, &items, &promos);
    assert_eq!(
        codes(&issues),
        vec![
            "duplicate_dni",
            "expiry_before_payment",
            "uncategorized_tx",
            "negative_amount",
            "negative_stock",
            "inverted_promotion_window",
        ]
    );
    assert_eq!(issues[0].1, "30111222 (2 students)");
    assert_eq!(issues[4].1, "Agua (-2)");
}
