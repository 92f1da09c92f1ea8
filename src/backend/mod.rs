// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Table-oriented access to the hosted backend.
//!
//! Everything the admin tool reads or writes goes through [`Store`]. The
//! production implementation is [`RestStore`], which speaks the PostgREST
//! dialect; [`MemoryStore`] keeps rows in process and is used by tests and
//! offline runs.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::{RestStore, parse_content_range};

use crate::models::Record;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend returned {status} for '{table}': {body}")]
    Http {
        table: String,
        status: u16,
        body: String,
    },
    #[error("request to '{table}' failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not convert '{table}' rows: {source}")]
    Codec {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid backend URL '{0}'")]
    Url(String),
    #[error("no '{table}' row matches {filter}")]
    NotFound { table: String, filter: String },
    #[error("backend not configured: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Value is a parenthesised list, `(a,b)`.
    In,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::In => "in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: String,
}

/// Filters, ordering and limit for one table request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    /// Column and `true` for descending.
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, column: &str, op: Op, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, Op::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, Op::Gte, value)
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, Op::Lte, value)
    }

    /// Matches any of `values`.
    pub fn any_of(self, column: &str, values: &[&str]) -> Self {
        self.filter(column, Op::In, format!("({})", values.join(",")))
    }

    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.order = Some((column.to_string(), descending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            return write!(f, "(all rows)");
        }
        let parts: Vec<String> = self
            .filters
            .iter()
            .map(|flt| format!("{}={}.{}", flt.column, flt.op.as_str(), flt.value))
            .collect();
        write!(f, "{}", parts.join("&"))
    }
}

/// Raw JSON access to backend tables.
pub trait Store {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
    fn insert(&self, table: &str, row: &Value) -> Result<Value, BackendError>;
    /// Inserts or merges on `conflict_column`.
    fn upsert(&self, table: &str, row: &Value, conflict_column: &str)
    -> Result<Value, BackendError>;
    fn update(&self, table: &str, query: &Query, patch: &Value)
    -> Result<Vec<Value>, BackendError>;
    fn delete(&self, table: &str, query: &Query) -> Result<usize, BackendError>;
    fn count(&self, table: &str, query: &Query) -> Result<usize, BackendError>;
}

fn decode<R: Record>(value: Value) -> Result<R, BackendError> {
    serde_json::from_value(value).map_err(|source| BackendError::Codec {
        table: R::TABLE.to_string(),
        source,
    })
}

fn encode<R: Record>(record: &R) -> Result<Value, BackendError> {
    serde_json::to_value(record).map_err(|source| BackendError::Codec {
        table: R::TABLE.to_string(),
        source,
    })
}

pub fn fetch_all<R: Record>(store: &dyn Store, query: &Query) -> Result<Vec<R>, BackendError> {
    store
        .select(R::TABLE, query)?
        .into_iter()
        .map(decode::<R>)
        .collect()
}

pub fn fetch_one<R: Record>(store: &dyn Store, query: &Query) -> Result<R, BackendError> {
    let q = query.clone().limit(1);
    match store.select(R::TABLE, &q)?.into_iter().next() {
        Some(row) => decode(row),
        None => Err(BackendError::NotFound {
            table: R::TABLE.to_string(),
            filter: query.to_string(),
        }),
    }
}

pub fn insert_record<R: Record>(store: &dyn Store, record: &R) -> Result<R, BackendError> {
    let row = encode(record)?;
    decode(store.insert(R::TABLE, &row)?)
}

pub fn upsert_record<R: Record>(
    store: &dyn Store,
    record: &R,
    conflict_column: &str,
) -> Result<R, BackendError> {
    let row = encode(record)?;
    decode(store.upsert(R::TABLE, &row, conflict_column)?)
}

/// Applies `patch` to every matching row; fails when nothing matched.
pub fn update_records<R: Record>(
    store: &dyn Store,
    query: &Query,
    patch: &Value,
) -> Result<Vec<R>, BackendError> {
    let rows = store.update(R::TABLE, query, patch)?;
    if rows.is_empty() {
        return Err(BackendError::NotFound {
            table: R::TABLE.to_string(),
            filter: query.to_string(),
        });
    }
    rows.into_iter().map(decode::<R>).collect()
}

pub fn delete_records<R: Record>(store: &dyn Store, query: &Query) -> Result<usize, BackendError> {
    store.delete(R::TABLE, query)
}

pub fn count_records<R: Record>(store: &dyn Store, query: &Query) -> Result<usize, BackendError> {
    store.count(R::TABLE, query)
}
