// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Polystore CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still raise it
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let target = cli::CatalogTarget {
        config: cli.config,
        store: cli.store,
    };

    match cli.command {
        Commands::Version => {
            println!("{} {}", "Polystore".bold().green(), polystore::VERSION);
            println!("Catalog and snapshot kernel");
            Ok(())
        }

        Commands::Init { force } => cli::handle_init(&target, force),

        Commands::Namespaces { pattern, format } => {
            cli::handle_namespaces(&target, pattern, format)
        }

        Commands::Tables {
            namespace,
            pattern,
            format,
        } => cli::handle_tables(&target, namespace, pattern, format),

        Commands::Adapters { format } => cli::handle_adapters(&target, format),

        Commands::Placements { namespace, table, format } => {
            cli::handle_placements(&target, &namespace, &table, format)
        }

        Commands::DropPlan { namespace, table } => {
            cli::handle_drop_plan(&target, &namespace, table.as_deref())
        }
    }
}
