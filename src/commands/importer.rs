// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Store, insert_record};
use crate::commands::transactions::parse_kind;
use crate::models::{Transaction, TransactionKind};
use crate::utils::{parse_date, parse_decimal, required_arg};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use std::io::Read;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(store, sub),
        _ => Ok(()),
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Parses `date,type,amount,category,description,payment_method` rows. An
/// empty type takes the sign of the amount (negative means expense).
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result.with_context(|| format!("Malformed CSV at line {}", line))?;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let kind_raw = rec.get(1).unwrap_or("").trim();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let category = rec.get(3).unwrap_or("").trim().to_string();

        let date = parse_date(date_raw).with_context(|| format!("Line {}", line))?;
        let mut amount = parse_decimal(amount_raw).with_context(|| format!("Line {}", line))?;
        let kind = if kind_raw.is_empty() {
            if amount.is_sign_negative() {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            }
        } else {
            parse_kind(kind_raw).with_context(|| format!("Line {}", line))?
        };
        if amount.is_sign_negative() {
            if !kind_raw.is_empty() {
                return Err(anyhow!(
                    "Line {}: negative amount '{}' with explicit type '{}'",
                    line,
                    amount_raw,
                    kind_raw
                ));
            }
            amount = -amount;
        }
        out.push(Transaction {
            id: None,
            date,
            amount,
            kind,
            category,
            description: non_empty(rec.get(4)),
            payment_method: non_empty(rec.get(5)),
        });
    }
    Ok(out)
}

fn import_transactions(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let path = required_arg(sub, "path")?;
    let file = std::fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
    // Validate the whole file before the first insert; the backend has no
    // multi-row transaction.
    let rows = parse_transactions(file)?;
    for tx in &rows {
        insert_record(store, tx)?;
    }
    tracing::info!(count = rows.len(), %path, "transactions imported");
    println!("Imported {} transactions from {}", rows.len(), path);
    Ok(())
}
