// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A row type stored in one backend table.
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "ingreso")]
    Income,
    #[serde(alias = "egreso", alias = "gasto")]
    Expense,
}

impl TransactionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Some(Self::Income),
            "expense" | "egreso" | "gasto" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Every stored label that reads back as this kind.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Income => &["income", "ingreso"],
            Self::Expense => &["expense", "egreso", "gasto"],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl Record for Transaction {
    const TABLE: &'static str = "transactions";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub dni: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub is_professor: bool,
    #[serde(default)]
    pub last_payment: Option<NaiveDate>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl Record for Student {
    const TABLE: &'static str = "students";
}

/// Days before expiry during which a student shows as expiring.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Expiring,
    Expired,
    Unpaid,
}

impl MembershipStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expiring => "expiring",
            Self::Expired => "expired",
            Self::Unpaid => "unpaid",
        }
    }
}

impl Student {
    pub fn status(&self, today: NaiveDate) -> MembershipStatus {
        match self.expires_on {
            None => MembershipStatus::Unpaid,
            Some(end) if end < today => MembershipStatus::Expired,
            Some(end) if (end - today).num_days() <= EXPIRY_WARNING_DAYS => {
                MembershipStatus::Expiring
            }
            Some(_) => MembershipStatus::Active,
        }
    }

    /// Records a payment made on `today`. The new expiry is one month after
    /// the later of `today` and the current expiry, so early renewals do not
    /// lose days.
    pub fn renew(&mut self, today: NaiveDate) {
        let start = match self.expires_on {
            Some(end) if end > today => end,
            _ => today,
        };
        self.last_payment = Some(today);
        self.expires_on = start.checked_add_months(Months::new(1)).or(Some(start));
    }
}

/// Current stock below this value counts as low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub initial_stock: i64,
    #[serde(default)]
    pub entries: i64,
    #[serde(default)]
    pub exits: i64,
}

impl Record for InventoryItem {
    const TABLE: &'static str = "inventory";
}

impl InventoryItem {
    pub fn current_stock(&self) -> i64 {
        self.initial_stock + self.entries - self.exits
    }

    pub fn is_low_stock(&self) -> bool {
        self.current_stock() < LOW_STOCK_THRESHOLD
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Record for Promotion {
    const TABLE: &'static str = "promotions";
}

impl Promotion {
    /// Active and inside its validity window (open ends allowed).
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.active
            && self.valid_from.is_none_or(|from| from <= today)
            && self.valid_until.is_none_or(|until| today <= until)
    }
}

pub const SWIMMING_PRICES_KEY: &str = "swimming_prices";
pub const COURT_PRICES_KEY: &str = "court_prices";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    pub key: String,
    pub value: serde_json::Value,
}

impl Record for PriceConfig {
    const TABLE: &'static str = "price_config";
}
