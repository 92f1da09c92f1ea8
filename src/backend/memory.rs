// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{BackendError, Filter, Op, Query, Store};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// In-process tables with the same filter, order and limit semantics as the
/// REST backend. Rows without an `id` get the next integer id on insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Snapshot of a table, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    fn object(table: &str, row: &Value) -> Result<Map<String, Value>, BackendError> {
        row.as_object().cloned().ok_or_else(|| BackendError::Http {
            table: table.to_string(),
            status: 400,
            body: "row must be a JSON object".into(),
        })
    }
}

fn compare_raw(field: &Value, raw: &str) -> Option<Ordering> {
    match field {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = raw.parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(raw)),
        Value::Bool(b) => {
            let rhs: bool = raw.parse().ok()?;
            Some(b.cmp(&rhs))
        }
        _ => None,
    }
}

// Like SQL, a null field never satisfies a comparison, `neq` included.
fn matches_filter(row: &Value, f: &Filter) -> bool {
    let field = row.get(&f.column).unwrap_or(&Value::Null);
    if f.op == Op::In {
        let list = f.value.trim_start_matches('(').trim_end_matches(')');
        return list
            .split(',')
            .any(|item| compare_raw(field, item.trim()) == Some(Ordering::Equal));
    }
    let Some(ord) = compare_raw(field, &f.value) else {
        return false;
    };
    match f.op {
        Op::Eq => ord == Ordering::Equal,
        Op::Neq => ord != Ordering::Equal,
        Op::Gt => ord == Ordering::Greater,
        Op::Gte => ord != Ordering::Less,
        Op::Lt => ord == Ordering::Less,
        Op::Lte => ord != Ordering::Greater,
        Op::In => false,
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|f| matches_filter(row, f))
}

// Nulls sort last, like PostgreSQL's default for ascending order.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn next_id(rows: &[Value]) -> i64 {
    rows.iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1
}

impl Store for MemoryStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let tables = self.tables.borrow();
        let mut out: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, query)).cloned().collect())
            .unwrap_or_default();
        if let Some((col, desc)) = &query.order {
            out.sort_by(|a, b| {
                let null = Value::Null;
                let ord = compare_values(a.get(col).unwrap_or(&null), b.get(col).unwrap_or(&null));
                if *desc { ord.reverse() } else { ord }
            });
        }
        if let Some(n) = query.limit {
            out.truncate(n);
        }
        Ok(out)
    }

    fn insert(&self, table: &str, row: &Value) -> Result<Value, BackendError> {
        let mut obj = Self::object(table, row)?;
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table.to_string()).or_default();
        if obj.get("id").is_none_or(Value::is_null) {
            obj.insert("id".into(), Value::from(next_id(rows)));
        }
        let stored = Value::Object(obj);
        rows.push(stored.clone());
        Ok(stored)
    }

    fn upsert(
        &self,
        table: &str,
        row: &Value,
        conflict_column: &str,
    ) -> Result<Value, BackendError> {
        let obj = Self::object(table, row)?;
        let key = obj.get(conflict_column).cloned().unwrap_or(Value::Null);
        {
            let mut tables = self.tables.borrow_mut();
            let rows = tables.entry(table.to_string()).or_default();
            if let Some(existing) = rows
                .iter_mut()
                .find(|r| !key.is_null() && r.get(conflict_column) == Some(&key))
            {
                if let Value::Object(target) = &mut *existing {
                    for (k, v) in obj {
                        target.insert(k, v);
                    }
                }
                return Ok(existing.clone());
            }
        }
        self.insert(table, &Value::Object(obj))
    }

    fn update(
        &self,
        table: &str,
        query: &Query,
        patch: &Value,
    ) -> Result<Vec<Value>, BackendError> {
        let patch = Self::object(table, patch)?;
        let mut tables = self.tables.borrow_mut();
        let mut changed = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, query)) {
                if let Value::Object(target) = &mut *row {
                    for (k, v) in &patch {
                        target.insert(k.clone(), v.clone());
                    }
                }
                changed.push(row.clone());
            }
        }
        Ok(changed)
    }

    fn delete(&self, table: &str, query: &Query) -> Result<usize, BackendError> {
        let mut tables = self.tables.borrow_mut();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !matches(r, query));
        Ok(before - rows.len())
    }

    fn count(&self, table: &str, query: &Query) -> Result<usize, BackendError> {
        Ok(self
            .tables
            .borrow()
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, query)).count())
            .unwrap_or(0))
    }
}
