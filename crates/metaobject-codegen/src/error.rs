// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Code generation errors.

use thiserror::Error;

/// Error returned by [`crate::generate`].
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema lookup or path enumeration failed.
    #[error(transparent)]
    Schema(#[from] metaobject_core::Error),

    /// Generated source did not parse.
    #[error("generated source is not valid rust: {0}")]
    Syntax(#[from] syn::Error),

    /// Runtime crate path is not a valid path.
    #[error("invalid crate path `{0}`")]
    InvalidCratePath(String),

    /// Two generated items or variants share a name.
    #[error("generated name `{name}` is produced twice (from `{source_name}`)")]
    NameCollision {
        /// Colliding Rust name.
        name:        String,
        /// Schema name that produced it second.
        source_name: String
    },

    /// A field key maps onto a name the generated struct already uses.
    #[error("field `{field}` of `{entity}` collides with the reserved `system` field")]
    ReservedField {
        /// Entity type.
        entity: String,
        /// Field key.
        field:  String
    }
}
