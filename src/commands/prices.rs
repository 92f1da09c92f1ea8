// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Query, Store, fetch_all, upsert_record};
use crate::models::PriceConfig;
use crate::pricing::{PriceChange, adjust_prices, price_changes};
use crate::utils::{maybe_print_json, opt_arg, parse_decimal, pretty_table, required_arg};
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub)?,
        Some(("set", sub)) => set(store, sub)?,
        Some(("adjust", sub)) => adjust(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn fetch_configs(store: &dyn Store, keys: &[String]) -> Result<Vec<PriceConfig>> {
    let all: Vec<PriceConfig> = fetch_all(store, &Query::new().order_by("key", false))?;
    if keys.is_empty() {
        return Ok(all);
    }
    for k in keys {
        if !all.iter().any(|c| &c.key == k) {
            return Err(anyhow!("Price configuration '{}' not found", k));
        }
    }
    Ok(all.into_iter().filter(|c| keys.contains(&c.key)).collect())
}

fn show(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let keys: Vec<String> = opt_arg(sub, "key").into_iter().collect();
    let data = fetch_configs(store, &keys)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut rows = Vec::new();
        for c in &data {
            rows.push(vec![c.key.clone(), serde_json::to_string_pretty(&c.value)?]);
        }
        println!("{}", pretty_table(&["Key", "Prices"], rows));
    }
    Ok(())
}

fn set(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let key = required_arg(sub, "key")?.to_string();
    let raw = match (opt_arg(sub, "value"), opt_arg(sub, "file")) {
        (Some(v), _) => v,
        (None, Some(path)) => {
            std::fs::read_to_string(&path).with_context(|| format!("Read {}", path))?
        }
        (None, None) => return Err(anyhow!("Pass --value or --file")),
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON for '{}'", key))?;
    upsert_record(store, &PriceConfig { key: key.clone(), value }, "key")?;
    tracing::info!(%key, "price configuration replaced");
    println!("Saved price configuration '{}'", key);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Adjustment {
    pub config: PriceConfig,
    pub changes: Vec<PriceChange>,
}

/// Adjusted copies of `configs`; the inputs stay untouched.
pub fn plan_adjustment(
    configs: &[PriceConfig],
    percent: Decimal,
    increment: Decimal,
) -> Result<Vec<Adjustment>> {
    configs
        .iter()
        .map(|c| {
            let value = adjust_prices(&c.value, percent, increment)
                .with_context(|| format!("Adjust '{}'", c.key))?;
            let changes = price_changes(&c.value, &value);
            Ok(Adjustment {
                config: PriceConfig {
                    key: c.key.clone(),
                    value,
                },
                changes,
            })
        })
        .collect()
}

fn adjust(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let percent = parse_decimal(required_arg(sub, "percent")?)?;
    let increment = match opt_arg(sub, "round") {
        Some(r) => parse_decimal(&r)?,
        None => Decimal::ONE,
    };
    let keys: Vec<String> = sub
        .get_many::<String>("key")
        .map(|vals| vals.map(|k| k.trim().to_string()).collect())
        .unwrap_or_default();
    let configs = fetch_configs(store, &keys)?;
    let plan = plan_adjustment(&configs, percent, increment)?;

    let mut rows = Vec::new();
    for adj in &plan {
        for ch in &adj.changes {
            rows.push(vec![
                adj.config.key.clone(),
                ch.path.clone(),
                ch.before.to_string(),
                ch.after.to_string(),
            ]);
        }
    }
    if rows.is_empty() {
        println!("No prices change with {}% rounded to {}", percent, increment);
        return Ok(());
    }
    println!("{}", pretty_table(&["Key", "Item", "Before", "After"], rows));

    if sub.get_flag("apply") {
        for adj in plan.iter().filter(|a| !a.changes.is_empty()) {
            upsert_record(store, &adj.config, "key")?;
            tracing::info!(key = %adj.config.key, %percent, %increment, "prices adjusted");
        }
        println!("Saved adjusted prices");
    } else {
        println!("Preview only; pass --apply to save");
    }
    Ok(())
}
