// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Process-wide catalog slot
//!
//! Exactly one catalog is installed per process. Installing a second one is a
//! configuration error unless the incoming catalog runs in test mode, in which
//! case it replaces the previous one.

use super::error::{CatalogError, CatalogResult};
use super::manager::CatalogManager;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static INSTALLED: Lazy<RwLock<Option<Arc<CatalogManager>>>> = Lazy::new(|| RwLock::new(None));

/// Install `catalog` as the process-wide catalog
///
/// # Returns
/// * `Ok(Arc<CatalogManager>)` - the installed handle
/// * `Err(CatalogError::AlreadyInstalled)` if another catalog is installed and
///   `catalog` is not in test mode
pub fn install(catalog: Arc<CatalogManager>) -> CatalogResult<Arc<CatalogManager>> {
    let mut slot = INSTALLED.write();
    if let Some(current) = slot.as_ref() {
        if Arc::ptr_eq(current, &catalog) {
            return Ok(catalog);
        }
        if !catalog.config().test_mode {
            return Err(CatalogError::AlreadyInstalled);
        }
        log::info!("Replacing installed catalog (test mode)");
    }
    *slot = Some(Arc::clone(&catalog));
    log::info!("Installed catalog at generation {}", catalog.snapshot().id());
    Ok(catalog)
}

/// The installed catalog, if any
pub fn installed() -> Option<Arc<CatalogManager>> {
    INSTALLED.read().clone()
}

/// Empty the slot and return what was installed
pub fn uninstall() -> Option<Arc<CatalogManager>> {
    INSTALLED.write().take()
}

/// Empty the slot if it holds `catalog`
pub(crate) fn release(catalog: &CatalogManager) {
    let mut slot = INSTALLED.write();
    let holds = slot
        .as_ref()
        .map_or(false, |current| std::ptr::eq(Arc::as_ptr(current), catalog));
    if holds {
        *slot = None;
    }
}
