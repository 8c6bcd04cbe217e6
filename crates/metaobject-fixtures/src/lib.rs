// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Types generated from `schema.toml` at build time.
//!
//! Integration tests decode runtime records into these types, so a
//! divergence between the generator and the runtime fails to compile or
//! fails a test.

use metaobject_core::{Result, Schema};

/// Fixture schema source.
pub const SCHEMA_SOURCE: &str = include_str!("../schema.toml");

/// Parse the fixture schema.
pub fn schema() -> Result<Schema> {
    Schema::from_toml_str(SCHEMA_SOURCE)
}

include!(concat!(env!("OUT_DIR"), "/metaobjects.rs"));
