// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use clubadmin::backend::RestStore;
use clubadmin::config::{self, BackendConfig};
use clubadmin::{cli, commands, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    utils::init_tracing(matches.get_count("verbose"));

    if let Some(("init", _)) = matches.subcommand() {
        let path = config::config_path()?;
        let cfg = BackendConfig::with_overrides(BackendConfig::load(&path)?, &matches)?;
        cfg.save(&path)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let cfg = BackendConfig::resolve(&matches)?;
    let store = RestStore::new(&cfg)?;

    match matches.subcommand() {
        Some(("dashboard", sub)) => commands::dashboard::handle(&store, sub)?,
        Some(("students", sub)) => commands::students::handle(&store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&store, sub)?,
        Some(("inventory", sub)) => commands::inventory::handle(&store, sub)?,
        Some(("promo", sub)) => commands::promotions::handle(&store, sub)?,
        Some(("prices", sub)) => commands::prices::handle(&store, sub)?,
        Some(("import", sub)) => commands::importer::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
