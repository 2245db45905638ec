// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for Polystore
//!
//! Bootstraps a persisted catalog and prints the contents of its latest
//! snapshot.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_adapters, handle_drop_plan, handle_init, handle_namespaces, handle_placements,
    handle_tables, CatalogTarget,
};
