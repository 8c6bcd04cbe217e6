// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Schema model, query construction and repositories for metaobjects.
//!
//! A metaobject is a record of a user-defined type stored by the platform
//! and reached over its GraphQL API. This crate keeps a local [`Schema`] of
//! those types and derives everything else from it.
//!
//! # Overview
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Entity and field definitions, TOML source |
//! | [`paths`] | Populate paths through reference fields |
//! | [`shape`] | Result shape of a fetch with a populate set |
//! | [`query`] | Selection sets and GraphQL documents |
//! | [`transform`] | Wire serialization and response normalization |
//! | [`repository`] | Typed CRUD over one entity type |
//! | [`definitions`] | Remote definition provisioning |
//! | [`decode`] | Conversion of records into typed structs |
//!
//! # Usage
//!
//! ```rust,ignore
//! use metaobject_core::prelude::*;
//!
//! let schema = Schema::from_toml_str(SOURCE)?;
//! DefinitionManager::new(transport.clone()).provision(&schema).await?;
//!
//! let stores = Repository::new(transport, &schema, "store")?;
//! let store = stores
//!     .find_by_handle_or_fail("main", &FindOptions::new().populate("storeType"))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod decode;
pub mod definitions;
pub mod error;
pub mod field_type;
pub mod id;
pub mod paths;
pub mod prelude;
pub mod query;
pub mod record;
pub mod registry;
pub mod repository;
pub mod schema;
pub mod shape;
#[cfg(any(test, feature = "testing"))]
#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
pub mod testing;
pub mod transform;
pub mod transport;
pub mod value;

/// Re-export async_trait for transport implementations.
pub use async_trait::async_trait;
/// Re-exports for generated code.
pub use chrono;
pub use serde;
pub use serde_json;
pub use config::OrmConfig;
pub use decode::{FromFieldValue, FromRecord, MetaobjectId};
pub use definitions::{DefinitionManager, ProvisionReport};
pub use error::{DecodeError, Error, Result, UserError, UserErrors};
pub use field_type::{FieldKind, FieldType};
pub use paths::PopulateSet;
pub use query::{QueryBuilder, QueryExtensions, SelectionSet};
pub use record::{DynamicFields, Record, SystemFields};
pub use repository::{Connection, FindOptions, FindParams, PageInfo, RecordInput, Repository};
pub use schema::{EntityDefinition, FieldDefinition, Schema, Validation};
pub use shape::Shape;
pub use transport::{GraphQlResponse, Transport, TransportError};
pub use value::FieldValue;
