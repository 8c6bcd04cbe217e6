// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use metaobject_core::prelude::*;
//! ```

pub use crate::{
    DefinitionManager, EntityDefinition, Error, FieldDefinition, FieldKind, FieldType, FieldValue,
    FindOptions, FindParams, FromFieldValue, FromRecord, MetaobjectId, OrmConfig, PopulateSet,
    QueryExtensions, Record, RecordInput, Repository, Result, Schema, Transport, async_trait
};
