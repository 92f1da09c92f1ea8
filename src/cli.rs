// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn opt(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn req(id: &'static str, help: &'static str) -> Arg {
    opt(id, help).required(true)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Row id")
}

pub fn build_cli() -> Command {
    Command::new("clubadmin")
        .about("Administration for the club: dashboard, students, prices, promotions, inventory and finances")
        .version(clap::crate_version!())
        .arg(
            Arg::new("url")
                .long("url")
                .global(true)
                .env("CLUBADMIN_URL")
                .help("Backend base URL"),
        )
        .arg(
            Arg::new("api_key")
                .long("api-key")
                .global(true)
                .env("CLUBADMIN_API_KEY")
                .hide_env_values(true)
                .help("Backend API key"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .env("CLUBADMIN_TOKEN")
                .hide_env_values(true)
                .help("Bearer token (defaults to the API key)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(Command::new("init").about("Write the backend settings to the config file"))
        .subcommand(
            Command::new("dashboard")
                .about("Financial and membership overview")
                .subcommand(json_args(
                    Command::new("summary")
                        .about("Counts and current month figures")
                        .arg(opt("month", "Month YYYY-MM (default: current)")),
                ))
                .subcommand(json_args(
                    Command::new("month")
                        .about("Month metrics against the previous month")
                        .arg(opt("month", "Month YYYY-MM (default: current)")),
                ))
                .subcommand(json_args(
                    Command::new("series")
                        .about("Income and expense per month of a year")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32))
                                .help("Year (default: current)"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("categories")
                        .about("Income per category for a month")
                        .arg(opt("month", "Month YYYY-MM (default: current)")),
                )),
        )
        .subcommand(
            Command::new("students")
                .about("Manage students")
                .subcommand(json_args(
                    Command::new("list")
                        .about("List students")
                        .arg(opt("status", "active|expiring|expired|unpaid"))
                        .arg(
                            Arg::new("professors")
                                .long("professors")
                                .action(ArgAction::SetTrue)
                                .help("Only professors"),
                        )
                        .arg(opt("search", "Match name or DNI")),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Register a student")
                        .arg(req("name", "Full name"))
                        .arg(req("dni", "National ID number"))
                        .arg(opt("phone", "Phone"))
                        .arg(opt("email", "Email"))
                        .arg(opt("plan", "Plan type"))
                        .arg(
                            Arg::new("professor")
                                .long("professor")
                                .action(ArgAction::SetTrue)
                                .help("Mark as professor"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a student")
                        .arg(req("dni", "National ID number")),
                )
                .subcommand(
                    Command::new("pay")
                        .about("Record a monthly payment and extend the membership")
                        .arg(req("dni", "National ID number"))
                        .arg(opt("amount", "Amount to record as income"))
                        .arg(opt("method", "Payment method"))
                        .arg(opt("category", "Income category (default: Cuota pileta)")),
                )
                .subcommand(json_args(
                    Command::new("expiring")
                        .about("Students whose membership ends soon")
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(value_parser!(i64))
                                .help("Window in days (default: 7)"),
                        ),
                ))
                .subcommand(
                    Command::new("watch")
                        .about("Re-list students whenever the list changes")
                        .arg(
                            Arg::new("interval")
                                .long("interval")
                                .value_parser(value_parser!(u64))
                                .help("Seconds between refreshes (default: 5)"),
                        )
                        .arg(
                            Arg::new("iterations")
                                .long("iterations")
                                .value_parser(value_parser!(usize))
                                .help("Stop after this many refreshes"),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Financial transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(opt("date", "Date YYYY-MM-DD (default: today)"))
                        .arg(req("amount", "Amount"))
                        .arg(req("type", "income|expense"))
                        .arg(req("category", "Category"))
                        .arg(opt("description", "Description"))
                        .arg(opt("method", "Payment method")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(opt("month", "Month YYYY-MM"))
                        .arg(opt("type", "income|expense"))
                        .arg(opt("category", "Category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Maximum rows"),
                        ),
                ))
                .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg())),
        )
        .subcommand(
            Command::new("inventory")
                .about("Kiosk and equipment stock")
                .subcommand(json_args(Command::new("list").about("List items")))
                .subcommand(
                    Command::new("add")
                        .about("Add an item")
                        .arg(req("name", "Item name"))
                        .arg(
                            Arg::new("initial")
                                .long("initial")
                                .value_parser(value_parser!(i64))
                                .help("Initial stock (default: 0)"),
                        ),
                )
                .subcommand(
                    Command::new("entry")
                        .about("Register incoming units")
                        .arg(id_arg())
                        .arg(
                            Arg::new("qty")
                                .long("qty")
                                .required(true)
                                .value_parser(value_parser!(i64))
                                .help("Units"),
                        ),
                )
                .subcommand(
                    Command::new("exit")
                        .about("Register outgoing units")
                        .arg(id_arg())
                        .arg(
                            Arg::new("qty")
                                .long("qty")
                                .required(true)
                                .value_parser(value_parser!(i64))
                                .help("Units"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("low-stock").about("Items with fewer than 10 units"),
                ))
                .subcommand(Command::new("rm").about("Remove an item").arg(id_arg())),
        )
        .subcommand(
            Command::new("promo")
                .about("Promotions")
                .subcommand(json_args(
                    Command::new("list").about("List promotions").arg(
                        Arg::new("current")
                            .long("current")
                            .action(ArgAction::SetTrue)
                            .help("Only active promotions valid today"),
                    ),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Create a promotion")
                        .arg(req("name", "Name"))
                        .arg(req("price", "Price"))
                        .arg(opt("description", "Description"))
                        .arg(opt("from", "Valid from YYYY-MM-DD"))
                        .arg(opt("until", "Valid until YYYY-MM-DD"))
                        .arg(
                            Arg::new("inactive")
                                .long("inactive")
                                .action(ArgAction::SetTrue)
                                .help("Create disabled"),
                        ),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Enable or disable a promotion")
                        .arg(id_arg()),
                )
                .subcommand(Command::new("rm").about("Delete a promotion").arg(id_arg())),
        )
        .subcommand(
            Command::new("prices")
                .about("Swimming and court price configuration")
                .subcommand(json_args(
                    Command::new("show")
                        .about("Show price configuration")
                        .arg(opt("key", "Configuration key")),
                ))
                .subcommand(
                    Command::new("set")
                        .about("Replace a configuration blob")
                        .arg(req("key", "Configuration key"))
                        .arg(opt("value", "JSON value"))
                        .arg(opt("file", "Read JSON value from file"))
                        .group(
                            clap::ArgGroup::new("source")
                                .args(["value", "file"])
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("adjust")
                        .about("Raise or lower every price by a percentage")
                        .arg(
                            req("percent", "Percentage, e.g. 10 or -5")
                                .allow_negative_numbers(true),
                        )
                        .arg(opt("round", "Round to this increment (default: 1)"))
                        .arg(
                            Arg::new("key")
                                .long("key")
                                .action(ArgAction::Append)
                                .help("Only this key (repeatable; default: all)"),
                        )
                        .arg(
                            Arg::new("apply")
                                .long("apply")
                                .action(ArgAction::SetTrue)
                                .help("Save the adjusted prices (default: preview only)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk import")
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from CSV (date,type,amount,category,description,payment_method)")
                        .arg(req("path", "CSV file")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions")
                        .arg(req("format", "csv|json"))
                        .arg(req("out", "Output path"))
                        .arg(opt("month", "Only this month YYYY-MM")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
