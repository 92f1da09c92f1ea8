// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{
    Query, Store, delete_records, fetch_all, fetch_one, insert_record, update_records,
};
use crate::models::{
    EXPIRY_WARNING_DAYS, MembershipStatus, Student, Transaction, TransactionKind,
};
use crate::utils::{
    fmt_money, fmt_opt_date, maybe_print_json, normalize_dni, opt_arg, parse_decimal,
    pretty_table, required_arg, today,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_PAYMENT_CATEGORY: &str = "Cuota pileta";

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub)?,
        Some(("add", sub)) => add(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        Some(("pay", sub)) => pay(store, sub)?,
        Some(("expiring", sub)) => expiring(store, sub)?,
        Some(("watch", sub)) => watch(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_status(s: &str) -> Result<MembershipStatus> {
    match s.trim().to_lowercase().as_str() {
        "active" => Ok(MembershipStatus::Active),
        "expiring" => Ok(MembershipStatus::Expiring),
        "expired" => Ok(MembershipStatus::Expired),
        "unpaid" => Ok(MembershipStatus::Unpaid),
        other => Err(anyhow!(
            "Invalid status '{}', expected active|expiring|expired|unpaid",
            other
        )),
    }
}

fn fetch_students(store: &dyn Store) -> Result<Vec<Student>> {
    Ok(fetch_all(store, &Query::new().order_by("name", false))?)
}

pub fn query_rows(store: &dyn Store, sub: &clap::ArgMatches) -> Result<Vec<Student>> {
    let status = opt_arg(sub, "status").map(|s| parse_status(&s)).transpose()?;
    let professors = sub.get_flag("professors");
    let search = opt_arg(sub, "search").map(|s| s.to_lowercase());
    let today = today();
    Ok(fetch_students(store)?
        .into_iter()
        .filter(|s| !professors || s.is_professor)
        .filter(|s| status.is_none_or(|st| s.status(today) == st))
        .filter(|s| {
            search
                .as_ref()
                .is_none_or(|q| s.name.to_lowercase().contains(q) || s.dni.contains(q))
        })
        .collect())
}

fn student_rows(students: &[Student], today: NaiveDate) -> Vec<Vec<String>> {
    students
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.dni.clone(),
                s.plan.clone().unwrap_or_default(),
                if s.is_professor { "yes".into() } else { String::new() },
                fmt_opt_date(s.last_payment),
                fmt_opt_date(s.expires_on),
                s.status(today).label().to_string(),
            ]
        })
        .collect()
}

const HEADERS: [&str; 7] = [
    "Name",
    "DNI",
    "Plan",
    "Professor",
    "Last payment",
    "Expires",
    "Status",
];

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", pretty_table(&HEADERS, student_rows(&data, today())));
    }
    Ok(())
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?.to_string();
    if name.is_empty() {
        return Err(anyhow!("Student name must not be empty"));
    }
    let dni = normalize_dni(required_arg(sub, "dni")?)?;
    let existing: Vec<Student> = fetch_all(store, &Query::new().eq("dni", &dni))?;
    if !existing.is_empty() {
        return Err(anyhow!("A student with DNI {} already exists", dni));
    }
    let student = Student {
        id: None,
        name,
        dni,
        phone: opt_arg(sub, "phone"),
        email: opt_arg(sub, "email"),
        plan: opt_arg(sub, "plan"),
        is_professor: sub.get_flag("professor"),
        last_payment: None,
        expires_on: None,
    };
    let saved = insert_record(store, &student)?;
    tracing::info!(dni = %saved.dni, "student registered");
    println!("Added student '{}' (DNI {})", saved.name, saved.dni);
    Ok(())
}

fn rm(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let dni = normalize_dni(required_arg(sub, "dni")?)?;
    let n = delete_records::<Student>(store, &Query::new().eq("dni", &dni))?;
    if n == 0 {
        return Err(anyhow!("No student with DNI {}", dni));
    }
    tracing::info!(%dni, "student removed");
    println!("Removed student with DNI {}", dni);
    Ok(())
}

fn pay(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let dni = normalize_dni(required_arg(sub, "dni")?)?;
    let amount = opt_arg(sub, "amount")
        .map(|raw| parse_decimal(&raw))
        .transpose()?;
    if amount.is_some_and(|a| a.is_sign_negative()) {
        return Err(anyhow!("Payment amount must not be negative"));
    }
    let category =
        opt_arg(sub, "category").unwrap_or_else(|| DEFAULT_PAYMENT_CATEGORY.to_string());

    let by_dni = Query::new().eq("dni", &dni);
    let mut student: Student =
        fetch_one(store, &by_dni).with_context(|| format!("No student with DNI {}", dni))?;
    let today = today();

    // The income row goes in first so a failed insert leaves the membership
    // untouched.
    if let Some(amount) = amount {
        let tx = Transaction {
            id: None,
            date: today,
            amount,
            kind: TransactionKind::Income,
            category,
            description: Some(format!("{} ({})", student.name, student.dni)),
            payment_method: opt_arg(sub, "method"),
        };
        insert_record(store, &tx).context("Record payment")?;
        println!("Recorded payment of {}", fmt_money(&amount));
    }

    student.renew(today);
    update_records::<Student>(
        store,
        &by_dni,
        &json!({
            "last_payment": student.last_payment,
            "expires_on": student.expires_on,
        }),
    )?;
    tracing::info!(%dni, expires_on = ?student.expires_on, "membership renewed");
    println!(
        "{} is paid until {}",
        student.name,
        fmt_opt_date(student.expires_on)
    );
    Ok(())
}

/// Students whose membership ends within `days` of `today` (already expired
/// ones excluded), soonest first.
pub fn expiring_within(students: &[Student], today: NaiveDate, days: i64) -> Vec<Student> {
    let mut out: Vec<Student> = students
        .iter()
        .filter(|s| {
            s.expires_on
                .is_some_and(|end| end >= today && (end - today).num_days() <= days)
        })
        .cloned()
        .collect();
    out.sort_by_key(|s| s.expires_on);
    out
}

fn expiring(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let days = sub
        .get_one::<i64>("days")
        .copied()
        .unwrap_or(EXPIRY_WARNING_DAYS);
    let today = today();
    let data = expiring_within(&fetch_students(store)?, today, days);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", pretty_table(&HEADERS, student_rows(&data, today)));
    }
    Ok(())
}

/// Refetches the whole list each interval and prints it again when it
/// changed. Returns the number of renders.
pub fn watch_students(
    store: &dyn Store,
    interval: Duration,
    iterations: Option<usize>,
) -> Result<usize> {
    let mut last: Option<Vec<serde_json::Value>> = None;
    let mut renders = 0;
    let mut rounds = 0;
    loop {
        let rows = store.select(
            <Student as crate::models::Record>::TABLE,
            &Query::new().order_by("name", false),
        )?;
        if last.as_ref() != Some(&rows) {
            let students: Vec<Student> = rows
                .iter()
                .cloned()
                .map(serde_json::from_value::<Student>)
                .collect::<Result<Vec<_>, _>>()
                .context("Decode students")?;
            println!("{}", pretty_table(&HEADERS, student_rows(&students, today())));
            tracing::debug!(count = students.len(), "student list changed");
            renders += 1;
            last = Some(rows);
        }
        rounds += 1;
        if iterations.is_some_and(|n| rounds >= n) {
            return Ok(renders);
        }
        std::thread::sleep(interval);
    }
}

fn watch(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let secs = sub.get_one::<u64>("interval").copied().unwrap_or(5);
    let iterations = sub.get_one::<usize>("iterations").copied();
    watch_students(store, Duration::from_secs(secs), iterations)?;
    Ok(())
}
