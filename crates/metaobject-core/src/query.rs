// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Nested query construction.
//!
//! [`QueryBuilder::build`] turns an entity type and a [`PopulateSet`] into the
//! selection set of one record. Population only ever *adds* nested
//! sub-selections: the flat field list is always present.
//!
//! # Selection layout
//!
//! ```text
//! {
//!   id type handle displayName updatedAt createdAt
//!   fields { key value type jsonValue }
//!   capabilities { publishable { status } }          # only if declared
//!   thumbnailField { ... }                           # only if a field qualifies
//!   genericObj: field(key: "generic_obj") {          # populated single reference
//!     reference { ... on Metaobject { id type handle fields { ... } } }
//!   }
//!   gallery: field(key: "gallery") {                 # populated list reference
//!     references(first: 50) { nodes { ... on File { ... } } }
//!   }
//! }
//! ```
//!
//! # Extension hooks
//!
//! [`QueryExtensions`] maps a full populate path to a hook that writes the
//! payload of that reference. When the hook selects at least one field its
//! selection replaces the defaults; an empty contribution keeps them.
//! Nested population below a hooked metaobject path is still applied.

pub mod defaults;
pub mod documents;
mod selection;

use std::{collections::HashMap, fmt, sync::Arc};

pub use selection::{Selection, SelectionSet};
use tracing::trace;

use crate::{
    config::{DEFAULT_MAX_POPULATE_DEPTH, DEFAULT_REFERENCE_PAGE_SIZE, OrmConfig},
    error::Result,
    paths::{PATH_SEPARATOR, PopulateSet, schema_targets, validate_populate_set},
    schema::{EntityDefinition, FieldDefinition, Schema}
};

/// Hook writing the payload selection of one populated reference.
pub type ExtensionHook = Arc<dyn Fn(&mut SelectionSet) + Send + Sync>;

/// Extension hooks keyed by full populate path.
#[derive(Clone, Default)]
pub struct QueryExtensions {
    hooks: HashMap<String, ExtensionHook>
}

impl QueryExtensions {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for `path`, replacing any previous one.
    pub fn insert<F>(&mut self, path: impl Into<String>, hook: F)
    where
        F: Fn(&mut SelectionSet) + Send + Sync + 'static
    {
        self.hooks.insert(path.into(), Arc::new(hook));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with<F>(mut self, path: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut SelectionSet) + Send + Sync + 'static
    {
        self.insert(path, hook);
        self
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run the hook of `path`; `None` if absent or if it selected nothing.
    fn apply(&self, path: &str) -> Option<SelectionSet> {
        let hook = self.hooks.get(path)?;
        let mut set = SelectionSet::new();
        hook(&mut set);
        (!set.is_empty()).then_some(set)
    }
}

impl fmt::Debug for QueryExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.hooks.keys().collect();
        paths.sort();
        f.debug_struct("QueryExtensions")
            .field("paths", &paths)
            .finish()
    }
}

/// Builds record selections for entities of one schema.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    schema:              &'a Schema,
    reference_page_size: u32,
    max_populate_depth:  usize
}

impl<'a> QueryBuilder<'a> {
    /// Builder over `schema` with the default page size and depth bound.
    pub const fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            reference_page_size: DEFAULT_REFERENCE_PAGE_SIZE,
            max_populate_depth:  DEFAULT_MAX_POPULATE_DEPTH
        }
    }

    /// Builder using the page size and depth bound of `config`.
    pub const fn with_config(schema: &'a Schema, config: &OrmConfig) -> Self {
        Self {
            schema,
            reference_page_size: config.reference_page_size,
            max_populate_depth:  config.max_populate_depth
        }
    }

    /// Page size of list-reference connections.
    pub const fn reference_page_size(&self) -> u32 {
        self.reference_page_size
    }

    /// Selection set of one `entity_type` record with `paths` populated.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::SchemaLookup`] for an unknown type
    /// - [`crate::Error::InvalidPopulatePath`] for any invalid path or one
    ///   deeper than the configured bound, before anything is built
    pub fn build(
        &self,
        entity_type: &str,
        paths: &PopulateSet,
        extensions: &QueryExtensions
    ) -> Result<SelectionSet> {
        validate_populate_set(self.schema, entity_type, paths, self.max_populate_depth)?;
        let definition = self.schema.definition_by_type(entity_type)?;

        let mut set = SelectionSet::leaves([
            "id",
            "type",
            "handle",
            "displayName",
            "updatedAt",
            "createdAt"
        ])
        .with(defaults::flat_fields());
        set.merge(record_extras(definition));
        self.populate(&mut set, definition, paths, "", extensions)?;

        trace!(
            entity = entity_type,
            populate = paths.len(),
            hooks = !extensions.is_empty(),
            "built record selection"
        );
        Ok(set)
    }

    fn populate(
        &self,
        set: &mut SelectionSet,
        definition: &EntityDefinition,
        paths: &PopulateSet,
        prefix: &str,
        extensions: &QueryExtensions
    ) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        for field in definition.reference_fields() {
            let Some(rest) = paths.partition(field.camel_key()) else {
                continue;
            };
            let path = if prefix.is_empty() {
                field.camel_key().to_string()
            } else {
                format!("{prefix}{PATH_SEPARATOR}{}", field.camel_key())
            };
            let payload = self.payload(field, &rest, &path, extensions)?;
            let wrapper = if field.is_list() {
                Selection::field("references")
                    .arg("first", self.reference_page_size.to_string())
                    .with_children(
                        SelectionSet::new().with(Selection::field("nodes").with_children(payload))
                    )
            } else {
                Selection::field("reference").with_children(payload)
            };
            set.push(
                Selection::field("field")
                    .alias(field.camel_key())
                    .string_arg("key", field.key())
                    .with_children(SelectionSet::new().with(wrapper))
            );
        }
        Ok(())
    }

    fn payload(
        &self,
        field: &FieldDefinition,
        rest: &PopulateSet,
        path: &str,
        extensions: &QueryExtensions
    ) -> Result<SelectionSet> {
        let hooked = extensions.apply(path);
        if !field.kind().is_metaobject_reference() {
            return Ok(hooked.unwrap_or_else(|| defaults::foreign(field)));
        }

        let targets = schema_targets(field).unwrap_or_default();
        let mut payload = match hooked {
            Some(set) => set,
            None => {
                let mut inner = defaults::metaobject_identity();
                for target in &targets {
                    inner.merge(record_extras(self.schema.definition_by_type(target)?));
                }
                SelectionSet::new().with(Selection::fragment("Metaobject", inner))
            }
        };

        let mut nested = SelectionSet::new();
        for target in &targets {
            let definition = self.schema.definition_by_type(target)?;
            self.populate(&mut nested, definition, rest, path, extensions)?;
        }
        if !nested.is_empty() {
            payload.push(Selection::fragment("Metaobject", nested));
        }
        Ok(payload)
    }
}

/// Capability and thumbnail sub-selections declared by `definition`.
fn record_extras(definition: &EntityDefinition) -> SelectionSet {
    let mut set = SelectionSet::new();
    let capabilities = &definition.capabilities;
    if capabilities.has_record_state() {
        let mut children = SelectionSet::new();
        if capabilities.publishable {
            children.push(Selection::field("publishable").with_children(SelectionSet::leaves(["status"])));
        }
        if capabilities.online_store.is_some() {
            children.push(
                Selection::field("onlineStore").with_children(SelectionSet::leaves(["templateSuffix"]))
            );
        }
        set.push(Selection::field("capabilities").with_children(children));
    }
    if definition.has_thumbnail_field() {
        let file = SelectionSet::leaves(["id", "alt"]).with(
            Selection::field("preview").with_children(
                SelectionSet::new()
                    .with(Selection::field("image").with_children(SelectionSet::leaves(["url"])))
            )
        );
        set.push(
            Selection::field("thumbnailField").with_children(
                SelectionSet::new().with(
                    Selection::field("thumbnail").with_children(
                        SelectionSet::leaves(["hex"]).with(Selection::field("file").with_children(file))
                    )
                )
            )
        );
    }
    set
}
