// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Polystore - inspect and bootstrap a catalog
#[derive(Parser, Debug)]
#[command(name = "polystore")]
#[command(version, about = "Catalog tool for the Polystore kernel", long_about = None)]
pub struct Cli {
    /// Catalog configuration file (JSON)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Catalog file; overrides the store named in the configuration
    #[arg(short = 's', long = "store", global = true)]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Log level
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// Create a catalog file with the default objects
    Init {
        /// Replace an existing catalog file
        #[arg(long)]
        force: bool,
    },

    /// List namespaces
    Namespaces {
        /// SQL LIKE pattern on the namespace name
        #[arg(short, long)]
        pattern: Option<String>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List tables
    Tables {
        /// SQL LIKE pattern on the namespace name
        #[arg(short, long)]
        namespace: Option<String>,

        /// SQL LIKE pattern on the table name
        #[arg(short, long)]
        pattern: Option<String>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List deployed adapters
    Adapters {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show where a table is placed
    Placements {
        /// Namespace name
        namespace: String,

        /// Table name
        table: String,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show what dropping a namespace or table would remove, in drop order
    DropPlan {
        /// Namespace name
        namespace: String,

        /// Table name; the whole namespace when omitted
        table: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "polystore",
            "tables",
            "--namespace",
            "sales%",
            "--store",
            "/tmp/catalog.json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/catalog.json")));
        match cli.command {
            Commands::Tables {
                namespace, format, ..
            } => {
                assert_eq!(namespace.as_deref(), Some("sales%"));
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_drop_plan_and_log_level() {
        let cli =
            Cli::try_parse_from(["polystore", "--log-level", "info", "drop-plan", "public"]).unwrap();
        assert_eq!(
            cli.log_level.map(LogLevel::to_level_filter),
            Some(log::LevelFilter::Info)
        );
        assert!(matches!(
            cli.command,
            Commands::DropPlan { ref namespace, table: None } if namespace == "public"
        ));
    }
}
