// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declarative TOML schema source.
//!
//! # Format
//!
//! ```toml
//! [config]
//! reference_page_size = 25
//!
//! [[metaobjects]]
//! type = "baz"
//! name = "Baz"
//! capabilities = { publishable = true }
//!
//! [[metaobjects.fields]]
//! key = "generic_obj"
//! type = "metaobject_reference"
//! target = "bar"
//! ```
//!
//! Arrays of tables keep declaration order, which is also the order of the
//! generated record fields.

use serde::Deserialize;

use super::{
    Access, Capabilities, EntityDefinition, FieldDefinition, ReferenceTarget, Schema, Validation
};
use crate::{config::OrmConfig, error::Result, field_type::FieldType};

/// Parsed schema file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Optional runtime limits.
    #[serde(default)]
    pub config:      Option<OrmConfig>,
    /// Entity definitions in declaration order.
    #[serde(default)]
    pub metaobjects: Vec<EntitySpec>
}

/// One `[[metaobjects]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    /// Type identifier.
    #[serde(rename = "type")]
    pub entity_type:      String,
    /// Display name.
    pub name:             Option<String>,
    /// Description.
    pub description:      Option<String>,
    /// Field used as display name.
    pub display_name_key: Option<String>,
    /// Access policy.
    #[serde(default)]
    pub access:           Access,
    /// Capabilities.
    #[serde(default)]
    pub capabilities:     Capabilities,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields:           Vec<FieldSpec>
}

/// One `[[metaobjects.fields]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Wire key.
    pub key:         String,
    /// Display name.
    pub name:        Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Wire type tag.
    #[serde(rename = "type")]
    pub field_type:  FieldType,
    /// Whether a value is mandatory.
    #[serde(default)]
    pub required:    bool,
    /// Single metaobject target.
    pub target:      Option<String>,
    /// Mixed metaobject targets.
    pub targets:     Option<Vec<String>>,
    /// Additional validations.
    #[serde(default)]
    pub validations: Vec<ValidationSpec>
}

/// Validation entry; values may be written as TOML strings, numbers or arrays.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationSpec {
    /// Validation name.
    pub name:  String,
    /// Validation value.
    pub value: toml::Value
}

impl SchemaFile {
    /// Parse TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Convert into a validated [`Schema`].
    pub fn into_schema(self) -> Result<Schema> {
        if let Some(config) = &self.config {
            config.validate()?;
        }
        Schema::new(self.metaobjects.into_iter().map(EntitySpec::into_definition).collect())
    }
}

impl EntitySpec {
    /// Convert into a definition.
    pub fn into_definition(self) -> EntityDefinition {
        let mut builder = EntityDefinition::builder(self.entity_type)
            .access(self.access)
            .capabilities(self.capabilities);
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(key) = self.display_name_key {
            builder = builder.display_name_key(key);
        }
        self.fields
            .into_iter()
            .fold(builder, |b, f| b.field(f.into_definition()))
            .build()
    }
}

impl FieldSpec {
    /// Convert into a definition.
    pub fn into_definition(self) -> FieldDefinition {
        let mut field = FieldDefinition::new(self.key, self.field_type);
        if let Some(name) = self.name {
            field = field.name(name);
        }
        if let Some(description) = self.description {
            field = field.description(description);
        }
        if self.required {
            field = field.required();
        }
        field.target = match (self.target, self.targets) {
            (_, Some(many)) => Some(ReferenceTarget::Many(many)),
            (Some(one), None) => Some(ReferenceTarget::Single(one)),
            (None, None) => None
        };
        for spec in self.validations {
            field = field.validation(Validation::new(spec.name, toml_to_json(spec.value)));
        }
        field
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => i.into(),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => b.into(),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Table(table) => table
            .into_iter()
            .map(|(k, v)| (k, toml_to_json(v)))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}
