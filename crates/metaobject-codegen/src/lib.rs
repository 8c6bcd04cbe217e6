// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rust source generation for metaobject schemas.
//!
//! [`generate`] turns a [`Schema`] into a Rust module that mirrors what the
//! runtime derives dynamically:
//!
//! | Generated item | Runtime counterpart |
//! |----------------|---------------------|
//! | `struct Baz<GenericObj = MetaobjectId>` | `shape_of(schema, "baz", {})` |
//! | `Baz<Bar>` (type substitution) | `shape_of(schema, "baz", {"genericObj"})` |
//! | `enum BazPopulatePath` | `valid_populate_paths(schema, "baz", depth)` |
//! | `struct BazSettings` | embedded JSON schema of `baz.settings` |
//! | `impl FromRecord` / `impl FromFieldValue` | `Record` decoding |
//!
//! The output is parsed with `syn` before it is returned. Formatting is left
//! to `rustfmt`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let schema = Schema::from_toml_str(SOURCE)?;
//! let source = metaobject_codegen::generate(&schema, &CodegenOptions::default())?;
//! std::fs::write(out_dir.join("metaobjects.rs"), source)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod entity;
pub mod error;
mod json;
mod naming;
mod populate;

pub use error::CodegenError;
use metaobject_core::{
    config::DEFAULT_MAX_POPULATE_DEPTH,
    paths::PopulateSet,
    schema::Schema,
    shape::shape_of
};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use tracing::debug;

use crate::naming::Names;

/// First line of every generated file.
pub const HEADER: &str = "// @generated by metaobject-codegen. Do not edit.\n";

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Path of the runtime crate as seen from the generated module.
    pub crate_path:         String,
    /// Depth bound of the populate path enums.
    pub max_populate_depth: usize
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            crate_path:         "::metaobject_core".into(),
            max_populate_depth: DEFAULT_MAX_POPULATE_DEPTH
        }
    }
}

impl CodegenOptions {
    /// Set the runtime crate path (`::metaobject_orm` behind the facade).
    #[must_use]
    pub fn with_crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    /// Set the populate path depth bound.
    #[must_use]
    pub fn with_max_populate_depth(mut self, depth: usize) -> Self {
        self.max_populate_depth = depth;
        self
    }
}

/// State shared by the generators of one file.
pub(crate) struct Context {
    krate:      syn::Path,
    krate_path: String,
    names:      Names,
    items:      Vec<TokenStream>
}

impl Context {
    fn new(crate_path: &str) -> Result<Self, CodegenError> {
        let krate = syn::parse_str::<syn::Path>(crate_path)
            .map_err(|_| CodegenError::InvalidCratePath(crate_path.to_string()))?;
        Ok(Self {
            krate,
            krate_path: crate_path.to_string(),
            names: Names::default(),
            items: Vec::new()
        })
    }

    #[cfg(test)]
    fn for_tests() -> Self {
        Self {
            krate:      syn::parse_quote!(::metaobject_core),
            krate_path: "::metaobject_core".into(),
            names:      Names::default(),
            items:      Vec::new()
        }
    }
}

/// Generate the token stream of `schema`.
///
/// # Errors
///
/// See [`generate`].
pub fn generate_tokens(schema: &Schema, options: &CodegenOptions) -> Result<TokenStream, CodegenError> {
    let mut ctx = Context::new(&options.crate_path)?;
    let mut items = Vec::with_capacity(schema.len() * 2);
    for definition in schema.definitions() {
        let shape = shape_of(schema, &definition.entity_type, &PopulateSet::new())?;
        items.push(entity::generate(definition, &shape, &mut ctx)?);
        items.push(populate::generate(
            schema,
            &definition.entity_type,
            options.max_populate_depth,
            &mut ctx
        )?);
    }
    let json_items = ctx.items;
    Ok(quote! {
        #(#items)*
        #(#json_items)*
    })
}

/// Generate Rust source for every entity of `schema`.
///
/// # Errors
///
/// - [`CodegenError::InvalidCratePath`] for an unparsable `crate_path`
/// - [`CodegenError::NameCollision`] when two schema names map onto one Rust name
/// - [`CodegenError::ReservedField`] for a field named `system`
/// - [`CodegenError::Syntax`] if the output does not parse
pub fn generate(schema: &Schema, options: &CodegenOptions) -> Result<String, CodegenError> {
    let tokens = generate_tokens(schema, options)?;
    let file = syn::parse_file(&tokens.to_string())?;
    debug!(entities = schema.len(), items = file.items.len(), "generated metaobject types");
    Ok(format!("{HEADER}{}", file.into_token_stream()))
}
