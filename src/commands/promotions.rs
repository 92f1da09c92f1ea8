// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{
    Query, Store, delete_records, fetch_all, fetch_one, insert_record, update_records,
};
use crate::models::Promotion;
use crate::utils::{
    fmt_money, fmt_opt_date, maybe_print_json, opt_arg, parse_date, parse_decimal, pretty_table,
    required_arg, today,
};
use anyhow::{Context, Result, anyhow};
use serde_json::json;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub)?,
        Some(("add", sub)) => add(store, sub)?,
        Some(("toggle", sub)) => toggle(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn id_of(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing required argument --id"))
}

pub fn query_rows(store: &dyn Store, current_only: bool) -> Result<Vec<Promotion>> {
    let all: Vec<Promotion> = fetch_all(store, &Query::new().order_by("name", false))?;
    let today = today();
    Ok(all
        .into_iter()
        .filter(|p| !current_only || p.is_current(today))
        .collect())
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub.get_flag("current"))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let today = today();
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.map(|i| i.to_string()).unwrap_or_default(),
                    p.name.clone(),
                    fmt_money(&p.price),
                    if p.active { "on".into() } else { "off".into() },
                    fmt_opt_date(p.valid_from),
                    fmt_opt_date(p.valid_until),
                    if p.is_current(today) { "yes".into() } else { "no".into() },
                    p.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Price", "Active", "From", "Until", "Current", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?.to_string();
    let price = parse_decimal(required_arg(sub, "price")?)?;
    if price.is_sign_negative() {
        return Err(anyhow!("Price must not be negative"));
    }
    let valid_from = opt_arg(sub, "from").map(|s| parse_date(&s)).transpose()?;
    let valid_until = opt_arg(sub, "until").map(|s| parse_date(&s)).transpose()?;
    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        if until < from {
            return Err(anyhow!(
                "Promotion ends ({}) before it starts ({})",
                until,
                from
            ));
        }
    }
    let promo = Promotion {
        id: None,
        name,
        description: opt_arg(sub, "description"),
        price,
        active: !sub.get_flag("inactive"),
        valid_from,
        valid_until,
    };
    let saved = insert_record(store, &promo)?;
    tracing::info!(id = ?saved.id, name = %saved.name, "promotion created");
    println!("Created promotion '{}' at {}", saved.name, fmt_money(&saved.price));
    Ok(())
}

fn toggle(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_of(sub)?;
    let by_id = Query::new().eq("id", id);
    let promo: Promotion =
        fetch_one(store, &by_id).with_context(|| format!("Promotion {} not found", id))?;
    let active = !promo.active;
    update_records::<Promotion>(store, &by_id, &json!({ "active": active }))?;
    tracing::info!(id, active, "promotion toggled");
    println!(
        "Promotion '{}' is now {}",
        promo.name,
        if active { "active" } else { "inactive" }
    );
    Ok(())
}

fn rm(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_of(sub)?;
    let n = delete_records::<Promotion>(store, &Query::new().eq("id", id))?;
    if n == 0 {
        return Err(anyhow!("Promotion {} not found", id));
    }
    println!("Deleted promotion {}", id);
    Ok(())
}
