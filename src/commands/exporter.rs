// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Query, Store, fetch_all};
use crate::commands::transactions::month_bounds;
use crate::models::Transaction;
use crate::utils::{opt_arg, parse_month, required_arg};
use anyhow::{Result, anyhow};
use serde_json::json;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required_arg(sub, "format")?.to_lowercase();
    let out = required_arg(sub, "out")?;

    let mut q = Query::new();
    if let Some(month) = opt_arg(sub, "month") {
        let (first, last) = month_bounds(parse_month(&month)?)?;
        q = q.gte("date", first).lte("date", last);
    }
    let rows: Vec<Transaction> = fetch_all(store, &q.order_by("date", false))?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "type",
                "amount",
                "category",
                "description",
                "payment_method",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.description.clone().unwrap_or_default(),
                    t.payment_method.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "date": t.date, "type": t.kind.as_str(), "amount": t.amount.to_string(),
                        "category": t.category, "description": t.description,
                        "payment_method": t.payment_method
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
