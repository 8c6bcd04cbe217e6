// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Result shape derivation.
//!
//! [`shape_of`] describes what a record of a given type looks like after a
//! fetch with a given populate set. It is pure and deterministic, so results
//! can be memoized per `(type, sorted paths)` with [`ShapeCache`].
//!
//! ```text
//! shape_of(baz, {})             -> Record { name: String, genericObj: Identifier }
//! shape_of(baz, {"genericObj"}) -> Record { name: String, genericObj: Record(bar) { name: String } }
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::{
    config::DEFAULT_MAX_POPULATE_DEPTH,
    error::Result,
    field_type::FieldKind,
    paths::{PopulateSet, validate_populate_set},
    schema::{FieldDefinition, Schema}
};

/// Shape of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Camel-cased field key.
    pub key:      String,
    /// Value shape.
    pub shape:    Shape,
    /// Whether a value is always present.
    pub required: bool
}

/// Structural description of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `true` / `false`.
    Boolean,
    /// Text.
    String,
    /// Whole number.
    Integer,
    /// Decimal number.
    Decimal,
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
    /// Amount with currency.
    Money,
    /// Weight, volume or dimension with unit.
    Measurement,
    /// Link with text.
    Link,
    /// Rating on a scale.
    Rating,
    /// Arbitrary JSON.
    Json,
    /// Object implied by an embedded JSON schema.
    Object(Vec<FieldShape>),
    /// Unpopulated reference: an identifier.
    Identifier,
    /// Populated metaobject of a schema entity.
    Record {
        /// Entity type.
        entity: String,
        /// Field shapes in declaration order.
        fields: Vec<FieldShape>
    },
    /// Populated mixed reference: one of several records.
    OneOf(Vec<Shape>),
    /// Populated reference without schema target: a record discriminated by
    /// its type tag, fields untyped.
    DefaultReference,
    /// Populated reference to a non-metaobject resource.
    ForeignPayload(&'static str),
    /// Sequence of the inner shape.
    List(Box<Shape>),
    /// Unknown wire type, passed through untouched.
    Passthrough
}

impl Shape {
    /// Field shapes of a record or object shape.
    pub fn fields(&self) -> Option<&[FieldShape]> {
        match self {
            Self::Record {
                fields, ..
            }
            | Self::Object(fields) => Some(fields),
            _ => None
        }
    }

    /// Shape of a field by camel key.
    pub fn field(&self, key: &str) -> Option<&Shape> {
        self.fields()?
            .iter()
            .find(|f| f.key == key)
            .map(|f| &f.shape)
    }

    /// Derive a shape from a JSON schema document.
    pub fn from_json_schema(schema: &Value) -> Self {
        let ty = match schema.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None
        };
        match ty {
            Some("object") => {
                let required: Vec<&str> = schema
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let fields = schema
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(key, sub)| FieldShape {
                                key:      key.clone(),
                                shape:    Self::from_json_schema(sub),
                                required: required.contains(&key.as_str())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Self::Object(fields)
            }
            Some("array") => Self::List(Box::new(
                schema
                    .get("items")
                    .map(Self::from_json_schema)
                    .unwrap_or(Self::Json)
            )),
            Some("string") => Self::String,
            Some("integer") => Self::Integer,
            Some("number") => Self::Decimal,
            Some("boolean") => Self::Boolean,
            _ => Self::Json
        }
    }
}

/// Derive the shape of `entity_type` populated with `paths`, under the
/// default depth bound.
///
/// # Errors
///
/// - [`crate::Error::SchemaLookup`] for an unknown type
/// - [`crate::Error::InvalidPopulatePath`] for a path that is not valid
pub fn shape_of(schema: &Schema, entity_type: &str, paths: &PopulateSet) -> Result<Shape> {
    bounded_shape_of(schema, entity_type, paths, DEFAULT_MAX_POPULATE_DEPTH)
}

/// [`shape_of`] with paths limited to `max_depth` segments.
///
/// # Errors
///
/// As [`shape_of`].
pub fn bounded_shape_of(
    schema: &Schema,
    entity_type: &str,
    paths: &PopulateSet,
    max_depth: usize
) -> Result<Shape> {
    validate_populate_set(schema, entity_type, paths, max_depth)?;
    record_shape(schema, entity_type, paths)
}

fn record_shape(schema: &Schema, entity_type: &str, paths: &PopulateSet) -> Result<Shape> {
    let definition = schema.definition_by_type(entity_type)?;
    let fields = definition
        .fields
        .iter()
        .map(|field| {
            Ok(FieldShape {
                key:      field.camel_key().to_string(),
                shape:    field_shape(schema, field, paths.partition(field.camel_key()))?,
                required: field.required
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Shape::Record {
        entity: entity_type.to_string(),
        fields
    })
}

fn field_shape(schema: &Schema, field: &FieldDefinition, nested: Option<PopulateSet>) -> Result<Shape> {
    let element = match (field.kind(), nested) {
        (kind, _) if !kind.is_reference() => scalar_shape(field),
        (_, None) => Shape::Identifier,
        (FieldKind::MetaobjectReference | FieldKind::MixedReference, Some(rest)) => {
            match crate::paths::schema_targets(field) {
                None => Shape::DefaultReference,
                Some(targets) if targets.len() == 1 => record_shape(schema, targets[0], &rest)?,
                Some(targets) => Shape::OneOf(
                    targets
                        .into_iter()
                        .map(|t| record_shape(schema, t, &rest))
                        .collect::<Result<_>>()?
                )
            }
        }
        (kind, Some(_)) => kind
            .graphql_type()
            .map_or(Shape::Passthrough, Shape::ForeignPayload)
    };
    Ok(if field.is_list() {
        Shape::List(Box::new(element))
    } else {
        element
    })
}

fn scalar_shape(field: &FieldDefinition) -> Shape {
    match field.kind() {
        FieldKind::Boolean => Shape::Boolean,
        FieldKind::NumberInteger => Shape::Integer,
        FieldKind::NumberDecimal => Shape::Decimal,
        FieldKind::Date => Shape::Date,
        FieldKind::DateTime => Shape::DateTime,
        FieldKind::Money => Shape::Money,
        FieldKind::Weight | FieldKind::Volume | FieldKind::Dimension => Shape::Measurement,
        FieldKind::Link => Shape::Link,
        FieldKind::Rating => Shape::Rating,
        FieldKind::Json => field
            .json_schema()
            .map_or(Shape::Json, |s| Shape::from_json_schema(&s)),
        FieldKind::RichTextField => Shape::Json,
        FieldKind::Color
        | FieldKind::Id
        | FieldKind::MultiLineTextField
        | FieldKind::SingleLineTextField
        | FieldKind::Url => Shape::String,
        _ => Shape::Passthrough
    }
}

/// Memoized [`shape_of`], keyed by `(type, sorted paths)`.
///
/// Misses are computed without holding any lock, so concurrent callers may
/// compute the same entry twice; the last write wins with an identical value.
/// Use one cache per schema.
#[derive(Debug)]
pub struct ShapeCache {
    entries:   DashMap<(String, Vec<String>), Arc<Shape>>,
    max_depth: usize
}

impl Default for ShapeCache {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_POPULATE_DEPTH)
    }
}

impl ShapeCache {
    /// Empty cache with the default depth bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache accepting paths of up to `max_depth` segments.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_depth
        }
    }

    /// Cached or freshly computed shape.
    pub fn shape_of(&self, schema: &Schema, entity_type: &str, paths: &PopulateSet) -> Result<Arc<Shape>> {
        let key = (entity_type.to_string(), paths.cache_key());
        if let Some(hit) = self.entries.get(&key).map(|entry| Arc::clone(entry.value())) {
            return Ok(hit);
        }
        let shape = Arc::new(bounded_shape_of(schema, entity_type, paths, self.max_depth)?);
        self.entries.insert(key, Arc::clone(&shape));
        Ok(shape)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
