// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Query, Store, delete_records, fetch_all, insert_record};
use crate::metrics::Period;
use crate::models::{Transaction, TransactionKind};
use crate::utils::{
    fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal, parse_month, pretty_table,
    required_arg, today,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn parse_kind(s: &str) -> Result<TransactionKind> {
    TransactionKind::parse(s)
        .ok_or_else(|| anyhow!("Invalid transaction type '{}', expected income|expense", s.trim()))
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let date = match opt_arg(sub, "date") {
        Some(d) => parse_date(&d)?,
        None => today(),
    };
    let amount = parse_decimal(required_arg(sub, "amount")?)?;
    if amount.is_sign_negative() {
        return Err(anyhow!(
            "Amount must not be negative; use --type expense for outgoing money"
        ));
    }
    let kind = parse_kind(required_arg(sub, "type")?)?;
    let category = required_arg(sub, "category")?.to_string();

    let tx = Transaction {
        id: None,
        date,
        amount,
        kind,
        category,
        description: opt_arg(sub, "description"),
        payment_method: opt_arg(sub, "method"),
    };
    let saved = insert_record(store, &tx)?;
    tracing::info!(id = ?saved.id, kind = kind.as_str(), %amount, "transaction recorded");
    println!(
        "Recorded {} {} on {} ({})",
        kind.as_str(),
        fmt_money(&saved.amount),
        saved.date,
        saved.category
    );
    Ok(())
}

/// First and last day of a month, for range filters.
pub fn month_bounds(period: Period) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(period.year, period.month, 1)
        .ok_or_else(|| anyhow!("Invalid month '{}'", period))?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Invalid month '{}'", period))?;
    Ok((first, last))
}

pub fn list_query(sub: &clap::ArgMatches) -> Result<Query> {
    let mut q = Query::new();
    if let Some(month) = opt_arg(sub, "month") {
        let (first, last) = month_bounds(parse_month(&month)?)?;
        q = q.gte("date", first).lte("date", last);
    }
    if let Some(kind) = opt_arg(sub, "type") {
        q = q.any_of("type", parse_kind(&kind)?.labels());
    }
    if let Some(cat) = opt_arg(sub, "category") {
        q = q.eq("category", cat);
    }
    q = q.order_by("date", true);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        q = q.limit(*limit);
    }
    Ok(q)
}

pub fn query_rows(store: &dyn Store, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    Ok(fetch_all(store, &list_query(sub)?)?)
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.map(|i| i.to_string()).unwrap_or_default(),
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    format!("{:.2}", t.amount),
                    t.category.clone(),
                    t.description.clone().unwrap_or_default(),
                    t.payment_method.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Amount", "Category", "Description", "Method"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing required argument --id"))?;
    let n = delete_records::<Transaction>(store, &Query::new().eq("id", id))?;
    if n == 0 {
        return Err(anyhow!("Transaction {} not found", id));
    }
    tracing::info!(id, "transaction deleted");
    println!("Deleted transaction {}", id);
    Ok(())
}
