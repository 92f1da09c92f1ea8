// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Number, Value};

/// Scales `amount` by `percent` and rounds to the nearest multiple of
/// `increment` (halves away from zero).
pub fn adjust_amount(amount: Decimal, percent: Decimal, increment: Decimal) -> Result<Decimal> {
    let out_of_range = || {
        anyhow!(
            "Adjusted price for {} ({}% rounded to {}) is out of range",
            amount,
            percent,
            increment
        )
    };
    let factor = percent
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|p| Decimal::ONE.checked_add(p))
        .ok_or_else(out_of_range)?;
    let steps = amount
        .checked_mul(factor)
        .and_then(|scaled| scaled.checked_div(increment))
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let rounded = steps.checked_mul(increment).ok_or_else(out_of_range)?;
    Ok(rounded.normalize())
}

/// Returns an adjusted copy of a nested price structure. Every number, at any
/// depth of objects and arrays, is adjusted; other leaves are kept as they
/// are. `prices` itself is not touched.
///
/// A cut of 100% or more is rejected.
pub fn adjust_prices(prices: &Value, percent: Decimal, increment: Decimal) -> Result<Value> {
    if increment <= Decimal::ZERO {
        return Err(anyhow!("Rounding increment must be positive, got {}", increment));
    }
    if percent <= -Decimal::ONE_HUNDRED {
        return Err(anyhow!(
            "Percentage must be above -100, got {}",
            percent
        ));
    }
    let mut copy = prices.clone();
    adjust_in_place(&mut copy, percent, increment)?;
    Ok(copy)
}

fn adjust_in_place(value: &mut Value, percent: Decimal, increment: Decimal) -> Result<()> {
    match value {
        Value::Number(n) => {
            let amount = number_to_decimal(n)?;
            *value = decimal_to_value(adjust_amount(amount, percent, increment)?)?;
        }
        Value::Array(items) => {
            for item in items {
                adjust_in_place(item, percent, increment)?;
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                adjust_in_place(item, percent, increment)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
    Ok(())
}

fn number_to_decimal(n: &Number) -> Result<Decimal> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    let f = n
        .as_f64()
        .ok_or_else(|| anyhow!("Unsupported price value {}", n))?;
    Decimal::try_from(f).map_err(|e| anyhow!("Unsupported price value {}: {}", n, e))
}

fn decimal_to_value(d: Decimal) -> Result<Value> {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return Ok(Value::from(i));
        }
    }
    d.to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("Adjusted price {} is not representable", d))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub path: String,
    pub before: Value,
    pub after: Value,
}

/// Leaf-by-leaf differences between two structures of the same shape, with
/// dotted paths (`plans.2x_week`, `tiers[1]`).
pub fn price_changes(before: &Value, after: &Value) -> Vec<PriceChange> {
    let mut out = Vec::new();
    collect_changes("", before, after, &mut out);
    out
}

fn collect_changes(path: &str, before: &Value, after: &Value, out: &mut Vec<PriceChange>) {
    match (before, after) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, va) in a {
                if let Some(vb) = b.get(k) {
                    let child = if path.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", path, k)
                    };
                    collect_changes(&child, va, vb, out);
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for (i, (va, vb)) in a.iter().zip(b.iter()).enumerate() {
                collect_changes(&format!("{}[{}]", path, i), va, vb, out);
            }
        }
        _ if before != after => out.push(PriceChange {
            path: path.to_string(),
            before: before.clone(),
            after: after.clone(),
        }),
        _ => {}
    }
}
