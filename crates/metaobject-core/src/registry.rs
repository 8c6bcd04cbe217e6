// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Process-wide schema registry.
//!
//! Populated once during initialization and immutable afterwards. Code that
//! cannot thread a [`Schema`] through explicitly reads it from here.
//!
//! ```rust,ignore
//! metaobject_core::registry::install(Schema::from_toml_str(SOURCE)?)?;
//! let schema = metaobject_core::registry::schema()?;
//! ```

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
    error::{Error, Result},
    schema::Schema
};

static REGISTRY: OnceCell<Schema> = OnceCell::new();

/// Install the process-wide schema.
///
/// # Errors
///
/// Returns the rejected schema when one is already installed.
pub fn install(schema: Schema) -> std::result::Result<&'static Schema, Schema> {
    let installed = REGISTRY.try_insert(schema).map_err(|(_, rejected)| rejected)?;
    debug!(types = installed.len(), "schema registry installed");
    Ok(installed)
}

/// The installed schema.
///
/// # Errors
///
/// [`Error::Config`] when nothing was installed yet.
pub fn schema() -> Result<&'static Schema> {
    REGISTRY
        .get()
        .ok_or_else(|| Error::Config("schema registry is not initialized".into()))
}

/// Check if a schema has been installed.
pub fn is_installed() -> bool {
    REGISTRY.get().is_some()
}
