// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # metaobject-orm
//!
//! One crate, all features. Re-exports:
//! - everything from `metaobject-core` ([`Schema`], [`Repository`],
//!   [`DefinitionManager`], [`QueryBuilder`], ...)
//! - `metaobject-codegen` as [`codegen`] behind the default `codegen` feature
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use metaobject_orm::prelude::*;
//!
//! let schema = Schema::from_toml_str(include_str!("metaobjects.toml"))?;
//! DefinitionManager::new(transport.clone()).provision(&schema).await?;
//!
//! let stores = Repository::new(transport, &schema, "store")?;
//! let page = stores.find(&FindParams::new().first(10), &FindOptions::new()).await?;
//! ```

pub use metaobject_core::*;

/// Rust source generation from a schema.
#[cfg(feature = "codegen")]
#[cfg_attr(docsrs, doc(cfg(feature = "codegen")))]
pub mod codegen {
    pub use metaobject_codegen::*;
}
