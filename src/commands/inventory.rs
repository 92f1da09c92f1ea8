// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{
    Query, Store, delete_records, fetch_all, fetch_one, insert_record, update_records,
};
use crate::metrics::low_stock;
use crate::models::InventoryItem;
use crate::utils::{maybe_print_json, pretty_table, required_arg};
use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::json;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub)?,
        Some(("add", sub)) => add(store, sub)?,
        Some(("entry", sub)) => movement(store, sub, Movement::Entry)?,
        Some(("exit", sub)) => movement(store, sub, Movement::Exit)?,
        Some(("low-stock", sub)) => list_low_stock(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct StockRow {
    pub id: Option<i64>,
    pub name: String,
    pub initial_stock: i64,
    pub entries: i64,
    pub exits: i64,
    pub current_stock: i64,
    pub low: bool,
}

impl From<&InventoryItem> for StockRow {
    fn from(i: &InventoryItem) -> Self {
        StockRow {
            id: i.id,
            name: i.name.clone(),
            initial_stock: i.initial_stock,
            entries: i.entries,
            exits: i.exits,
            current_stock: i.current_stock(),
            low: i.is_low_stock(),
        }
    }
}

fn print_rows(sub: &clap::ArgMatches, data: &[StockRow]) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.map(|i| i.to_string()).unwrap_or_default(),
                    r.name.clone(),
                    r.initial_stock.to_string(),
                    r.entries.to_string(),
                    r.exits.to_string(),
                    r.current_stock.to_string(),
                    if r.low { "LOW".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Item", "Initial", "In", "Out", "Stock", ""],
                rows
            )
        );
    }
    Ok(())
}

fn fetch_items(store: &dyn Store) -> Result<Vec<InventoryItem>> {
    Ok(fetch_all(store, &Query::new().order_by("name", false))?)
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let items = fetch_items(store)?;
    let data: Vec<StockRow> = items.iter().map(StockRow::from).collect();
    print_rows(sub, &data)
}

fn list_low_stock(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let items = fetch_items(store)?;
    let data: Vec<StockRow> = low_stock(&items).into_iter().map(StockRow::from).collect();
    print_rows(sub, &data)
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?.to_string();
    if name.is_empty() {
        return Err(anyhow!("Item name must not be empty"));
    }
    let initial = sub.get_one::<i64>("initial").copied().unwrap_or(0);
    if initial < 0 {
        return Err(anyhow!("Initial stock must not be negative"));
    }
    let item = InventoryItem {
        id: None,
        name,
        initial_stock: initial,
        entries: 0,
        exits: 0,
    };
    let saved = insert_record(store, &item)?;
    tracing::info!(id = ?saved.id, name = %saved.name, "inventory item added");
    println!(
        "Added '{}' with {} units (id {})",
        saved.name,
        saved.initial_stock,
        saved.id.map(|i| i.to_string()).unwrap_or_default()
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Entry,
    Exit,
}

/// Adds `qty` units to the entries or exits counter of an item and returns
/// the updated row.
pub fn record_movement(
    store: &dyn Store,
    id: i64,
    qty: i64,
    kind: Movement,
) -> Result<InventoryItem> {
    if qty <= 0 {
        return Err(anyhow!("Quantity must be positive, got {}", qty));
    }
    let by_id = Query::new().eq("id", id);
    let item: InventoryItem =
        fetch_one(store, &by_id).with_context(|| format!("Inventory item {} not found", id))?;
    let patch = match kind {
        Movement::Entry => json!({ "entries": item.entries + qty }),
        Movement::Exit => json!({ "exits": item.exits + qty }),
    };
    let updated = update_records::<InventoryItem>(store, &by_id, &patch)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Inventory item {} not found", id))?;
    if updated.current_stock() < 0 {
        tracing::warn!(id, stock = updated.current_stock(), "stock below zero");
    }
    Ok(updated)
}

fn movement(store: &dyn Store, sub: &clap::ArgMatches, kind: Movement) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing required argument --id"))?;
    let qty = *sub
        .get_one::<i64>("qty")
        .ok_or_else(|| anyhow!("Missing required argument --qty"))?;
    let item = record_movement(store, id, qty, kind)?;
    println!(
        "{}: stock now {}{}",
        item.name,
        item.current_stock(),
        if item.is_low_stock() { " (low)" } else { "" }
    );
    Ok(())
}

fn rm(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing required argument --id"))?;
    let n = delete_records::<InventoryItem>(store, &Query::new().eq("id", id))?;
    if n == 0 {
        return Err(anyhow!("Inventory item {} not found", id));
    }
    tracing::info!(id, "inventory item removed");
    println!("Removed inventory item {}", id);
    Ok(())
}
