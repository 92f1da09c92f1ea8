// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Query, Store, fetch_all};
use crate::models::{InventoryItem, Promotion, Student, Transaction};
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::HashMap;

/// One finding: an issue code and a human-readable detail.
pub type Issue = (String, String);

pub fn check(
    students: &[Student],
    txs: &[Transaction],
    items: &[InventoryItem],
    promos: &[Promotion],
) -> Vec<Issue> {
    let mut rows = Vec::new();

    // 1) Duplicate DNIs
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for s in students {
        *seen.entry(s.dni.as_str()).or_insert(0) += 1;
    }
    let mut dups: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
    dups.sort();
    for (dni, n) in dups {
        rows.push(("duplicate_dni".into(), format!("{} ({} students)", dni, n)));
    }

    // 2) Expiry before last payment
    for s in students {
        if let (Some(paid), Some(end)) = (s.last_payment, s.expires_on) {
            if end < paid {
                rows.push((
                    "expiry_before_payment".into(),
                    format!("{} ({}): paid {}, expires {}", s.name, s.dni, paid, end),
                ));
            }
        }
    }

    // 3) Transactions without category or with negative amounts
    for t in txs {
        let id = t.id.map(|i| i.to_string()).unwrap_or_else(|| "?".into());
        if t.category.trim().is_empty() {
            rows.push((
                "uncategorized_tx".into(),
                format!("#{} {} {}", id, t.date, t.amount),
            ));
        }
        if t.amount.is_sign_negative() {
            rows.push((
                "negative_amount".into(),
                format!("#{} {} {}", id, t.date, t.amount),
            ));
        }
    }

    // 4) Stock below zero
    for i in items {
        if i.current_stock() < 0 {
            rows.push((
                "negative_stock".into(),
                format!("{} ({})", i.name, i.current_stock()),
            ));
        }
    }

    // 5) Promotion windows that end before they start
    for p in promos {
        if let (Some(from), Some(until)) = (p.valid_from, p.valid_until) {
            if until < from {
                rows.push((
                    "inverted_promotion_window".into(),
                    format!("{}: {} > {}", p.name, from, until),
                ));
            }
        }
    }
    rows
}

pub fn handle(store: &dyn Store) -> Result<()> {
    let students: Vec<Student> = fetch_all(store, &Query::new())?;
    let txs: Vec<Transaction> = fetch_all(store, &Query::new())?;
    let items: Vec<InventoryItem> = fetch_all(store, &Query::new())?;
    let promos: Vec<Promotion> = fetch_all(store, &Query::new())?;

    let issues = check(&students, &txs, &items, &promos);
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(count = issues.len(), "doctor found issues");
        let rows = issues.into_iter().map(|(a, b)| vec![a, b]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
