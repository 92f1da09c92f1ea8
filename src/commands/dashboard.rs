// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Query, Store, count_records, fetch_all};
use crate::metrics::{
    MonthComparison, Overview, Period, compare_with_previous, low_stock, monthly_metrics,
    yearly_series,
};
use crate::models::{InventoryItem, Promotion, Student, Transaction};
use crate::utils::{
    fmt_money, fmt_percent, maybe_print_json, opt_arg, parse_month, pretty_table, today,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub)?,
        Some(("month", sub)) => month(store, sub)?,
        Some(("series", sub)) => series(store, sub)?,
        Some(("categories", sub)) => categories(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn period_arg(sub: &clap::ArgMatches) -> Result<Period> {
    match opt_arg(sub, "month") {
        Some(m) => parse_month(&m),
        None => Ok(Period::of(today())),
    }
}

fn all_transactions(store: &dyn Store) -> Result<Vec<Transaction>> {
    Ok(fetch_all(store, &Query::new().order_by("date", false))?)
}

/// Fetches counts, inventory, promotions and transactions and reduces them to
/// the dashboard headline numbers for `period`.
pub fn build_overview(store: &dyn Store, period: Period, today: NaiveDate) -> Result<Overview> {
    let students = count_records::<Student>(store, &Query::new())?;
    let professors = count_records::<Student>(store, &Query::new().eq("is_professor", true))?;
    let items: Vec<InventoryItem> = fetch_all(store, &Query::new())?;
    let promos: Vec<Promotion> = fetch_all(store, &Query::new())?;
    let txs = all_transactions(store)?;
    tracing::debug!(
        students,
        items = items.len(),
        transactions = txs.len(),
        "dashboard data loaded"
    );
    Ok(Overview {
        students,
        professors,
        active_promotions: promos.iter().filter(|p| p.is_current(today)).count(),
        inventory_items: items.len(),
        low_stock_items: low_stock(&items).len(),
        month: compare_with_previous(&txs, period),
    })
}

fn comparison_rows(c: &MonthComparison) -> Vec<Vec<String>> {
    let line = |label: &str, cur: &Decimal, prev: &Decimal, var: &Decimal| {
        vec![
            label.to_string(),
            fmt_money(cur),
            fmt_money(prev),
            fmt_percent(var),
        ]
    };
    vec![
        line(
            "Income",
            &c.current.income,
            &c.baseline.income,
            &c.income_variance,
        ),
        line(
            "Expense",
            &c.current.expense,
            &c.baseline.expense,
            &c.expense_variance,
        ),
        line(
            "Sales",
            &c.current.sales,
            &c.baseline.sales,
            &c.sales_variance,
        ),
        line(
            "Renewals",
            &c.current.renewals,
            &c.baseline.renewals,
            &c.renewals_variance,
        ),
    ]
}

fn summary(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let ov = build_overview(store, period_arg(sub)?, today())?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ov)? {
        return Ok(());
    }
    let counts = vec![
        vec!["Students".to_string(), ov.students.to_string()],
        vec!["Professors".to_string(), ov.professors.to_string()],
        vec![
            "Active promotions".to_string(),
            ov.active_promotions.to_string(),
        ],
        vec!["Inventory items".to_string(), ov.inventory_items.to_string()],
        vec!["Low stock".to_string(), ov.low_stock_items.to_string()],
        vec![
            format!("Net {}", ov.month.period),
            fmt_money(&ov.month.current.net()),
        ],
    ];
    println!("{}", pretty_table(&["", ""], counts));
    println!(
        "{}",
        pretty_table(
            &["", ov.month.period.as_str(), ov.month.previous.as_str(), "Change"],
            comparison_rows(&ov.month)
        )
    );
    Ok(())
}

fn month(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let txs = all_transactions(store)?;
    let cmp = compare_with_previous(&txs, period_arg(sub)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cmp)? {
        println!(
            "{}",
            pretty_table(
                &["", cmp.period.as_str(), cmp.previous.as_str(), "Change"],
                comparison_rows(&cmp)
            )
        );
    }
    Ok(())
}

fn series(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub
        .get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| today().year());
    let txs = all_transactions(store)?;
    let points = yearly_series(&txs, year);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        let rows = points
            .iter()
            .map(|p| {
                vec![
                    format!("{:04}-{:02}", year, p.month),
                    format!("{:.2}", p.income),
                    format!("{:.2}", p.expense),
                    format!("{:.2}", p.income - p.expense),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], rows)
        );
    }
    Ok(())
}

fn categories(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let txs = all_transactions(store)?;
    let metrics = monthly_metrics(&txs, period_arg(sub)?);
    let mut items: Vec<_> = metrics.income_by_category.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let rows = items
            .into_iter()
            .map(|(cat, amt)| vec![cat, format!("{:.2}", amt)])
            .collect();
        println!("{}", pretty_table(&["Category", "Income"], rows));
    }
    Ok(())
}
