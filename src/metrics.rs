// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard figures computed from fetched rows.

use crate::models::{InventoryItem, Transaction, TransactionKind};
use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Court rentals and kiosk sales.
pub const SALES_KEYWORDS: &[&str] = &[
    "cancha", "court", "padel", "paddle", "snack", "kiosco", "bebida", "drink",
];

/// Pool fees, swimming classes and membership dues.
pub const RENEWAL_KEYWORDS: &[&str] = &[
    "pileta",
    "pool",
    "natacion",
    "natación",
    "swim",
    "cuota",
    "membres",
    "membership",
    "renov",
];

pub const UNCATEGORIZED: &str = "(uncategorized)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Sales,
    Renewals,
    Other,
}

/// Sales keywords are checked before renewal keywords; the first hit wins.
pub fn classify(category: &str) -> Bucket {
    let lower = category.to_lowercase();
    if SALES_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Bucket::Sales
    } else if RENEWAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Bucket::Renewals
    } else {
        Bucket::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Invalid month number {}", month));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
        let year: i32 = y
            .parse()
            .map_err(|_| anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
        let month: u32 = m
            .parse()
            .map_err(|_| anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
        Self::new(year, month)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyMetrics {
    pub income: Decimal,
    pub expense: Decimal,
    pub sales: Decimal,
    pub renewals: Decimal,
    pub income_by_category: BTreeMap<String, Decimal>,
    pub transactions: usize,
}

impl MonthlyMetrics {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

pub fn monthly_metrics(txs: &[Transaction], period: Period) -> MonthlyMetrics {
    let mut m = MonthlyMetrics::default();
    for tx in txs.iter().filter(|t| period.contains(t.date)) {
        m.transactions += 1;
        match tx.kind {
            TransactionKind::Expense => m.expense += tx.amount,
            TransactionKind::Income => {
                m.income += tx.amount;
                match classify(&tx.category) {
                    Bucket::Sales => m.sales += tx.amount,
                    Bucket::Renewals => m.renewals += tx.amount,
                    Bucket::Other => {}
                }
                let key = tx.category.trim();
                let key = if key.is_empty() { UNCATEGORIZED } else { key };
                *m.income_by_category
                    .entry(key.to_string())
                    .or_insert(Decimal::ZERO) += tx.amount;
            }
        }
    }
    m
}

/// Percentage change from `baseline` to `current`; zero when the baseline is
/// zero.
pub fn variance(current: Decimal, baseline: Decimal) -> Decimal {
    if baseline.is_zero() {
        return Decimal::ZERO;
    }
    (current - baseline) / baseline * Decimal::ONE_HUNDRED
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthComparison {
    pub period: String,
    pub previous: String,
    pub current: MonthlyMetrics,
    pub baseline: MonthlyMetrics,
    pub income_variance: Decimal,
    pub expense_variance: Decimal,
    pub sales_variance: Decimal,
    pub renewals_variance: Decimal,
}

pub fn compare_with_previous(txs: &[Transaction], period: Period) -> MonthComparison {
    let prev = period.previous();
    let current = monthly_metrics(txs, period);
    let baseline = monthly_metrics(txs, prev);
    MonthComparison {
        period: period.to_string(),
        previous: prev.to_string(),
        income_variance: variance(current.income, baseline.income),
        expense_variance: variance(current.expense, baseline.expense),
        sales_variance: variance(current.sales, baseline.sales),
        renewals_variance: variance(current.renewals, baseline.renewals),
        current,
        baseline,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Income and expense for each month of `year`, January first, zero-filled.
pub fn yearly_series(txs: &[Transaction], year: i32) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = (1..=12)
        .map(|month| SeriesPoint {
            month,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        })
        .collect();
    for tx in txs.iter().filter(|t| t.date.year() == year) {
        let p = &mut points[tx.date.month0() as usize];
        match tx.kind {
            TransactionKind::Income => p.income += tx.amount,
            TransactionKind::Expense => p.expense += tx.amount,
        }
    }
    points
}

pub fn low_stock(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    items.iter().filter(|i| i.is_low_stock()).collect()
}

/// Headline numbers for the dashboard landing view.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub students: usize,
    pub professors: usize,
    pub active_promotions: usize,
    pub inventory_items: usize,
    pub low_stock_items: usize,
    pub month: MonthComparison,
}
