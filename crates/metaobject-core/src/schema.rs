// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory schema model.
//!
//! A [`Schema`] is an immutable, internally consistent set of
//! [`EntityDefinition`]s. Every downstream component assumes consistency, so
//! construction validates that types are unique and that reference targets
//! name types of the same schema.
//!
//! # Building a schema in code
//!
//! ```rust
//! use metaobject_core::{EntityDefinition, FieldDefinition, FieldKind, FieldType, Schema};
//!
//! let bar = EntityDefinition::builder("bar")
//!     .name("Bar")
//!     .field(FieldDefinition::new("name", FieldKind::SingleLineTextField))
//!     .build();
//! let baz = EntityDefinition::builder("baz")
//!     .name("Baz")
//!     .field(FieldDefinition::new("name", FieldKind::SingleLineTextField))
//!     .field(FieldDefinition::new("generic_obj", FieldKind::MetaobjectReference).target("bar"))
//!     .build();
//!
//! let schema = Schema::new(vec![bar, baz]).unwrap();
//! assert!(schema.definition_by_type("baz").is_ok());
//! assert!(schema.definition_by_type("qux").is_err());
//! ```

mod source;

use std::collections::HashMap;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
pub use source::{EntitySpec, FieldSpec, SchemaFile};

use crate::{
    error::{Error, Result},
    field_type::{FieldKind, FieldType}
};

/// Validation name carrying a single metaobject target.
pub const TARGET_VALIDATION: &str = "metaobject_definition_id";

/// Validation name carrying several metaobject targets.
pub const TARGETS_VALIDATION: &str = "metaobject_definition_ids";

/// Validation name restricting allowed file kinds.
pub const FILE_TYPES_VALIDATION: &str = "file_type_options";

/// Validation name embedding a JSON schema.
pub const JSON_SCHEMA_VALIDATION: &str = "schema";

/// Camel-case a wire key (`generic_obj` -> `genericObj`).
pub fn camel_key(key: &str) -> String {
    key.to_case(Case::Camel)
}

/// Snake-case a camel key (`genericObj` -> `generic_obj`).
pub fn snake_key(key: &str) -> String {
    key.to_case(Case::Snake)
}

/// Named validation attached to a field.
///
/// Values are kept as JSON because their shape depends on the field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// Validation name (`min`, `max`, `regex`, `file_type_options`, ...).
    pub name:  String,
    /// Validation payload.
    pub value: serde_json::Value
}

impl Validation {
    /// Create a validation.
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name:  name.into(),
            value: value.into()
        }
    }

    /// Wire form: the platform expects every value as a string.
    pub fn wire_value(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string()
        }
    }
}

/// Entity type(s) a metaobject reference may point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// `metaobject_reference`: exactly one type.
    Single(String),
    /// `mixed_reference`: any of several types.
    Many(Vec<String>)
}

impl ReferenceTarget {
    /// All target types.
    pub fn types(&self) -> Vec<&str> {
        match self {
            Self::Single(t) => vec![t.as_str()],
            Self::Many(ts) => ts.iter().map(String::as_str).collect()
        }
    }
}

/// Field of an entity definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    key:             String,
    camel_key:       String,
    /// Display name.
    pub name:        String,
    /// Optional description.
    pub description: Option<String>,
    /// Wire type.
    pub field_type:  FieldType,
    /// Whether a value is mandatory.
    pub required:    bool,
    /// Type-dependent validations (targets excluded).
    pub validations: Vec<Validation>,
    /// Reference target, only for metaobject reference kinds.
    pub target:      Option<ReferenceTarget>
}

impl FieldDefinition {
    /// Create a field; the display name defaults to the key.
    pub fn new(key: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        let key = key.into();
        Self {
            camel_key:   camel_key(&key),
            name:        key.clone(),
            key,
            description: None,
            field_type:  field_type.into(),
            required:    false,
            validations: Vec::new(),
            target:      None
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Turn the field into its `list.*` variant.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.field_type.list = true;
        self
    }

    /// Point a `metaobject_reference` at one entity type.
    #[must_use]
    pub fn target(mut self, entity_type: impl Into<String>) -> Self {
        self.target = Some(ReferenceTarget::Single(entity_type.into()));
        self
    }

    /// Point a `mixed_reference` at several entity types.
    #[must_use]
    pub fn targets<I, S>(mut self, entity_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.target = Some(ReferenceTarget::Many(
            entity_types.into_iter().map(Into::into).collect()
        ));
        self
    }

    /// Add a validation.
    #[must_use]
    pub fn validation(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    /// Wire key (`generic_obj`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Camel-cased key used in records and populate paths (`genericObj`).
    pub fn camel_key(&self) -> &str {
        &self.camel_key
    }

    /// Element kind.
    pub const fn kind(&self) -> &FieldKind {
        &self.field_type.kind
    }

    /// Check if this field is a list.
    pub const fn is_list(&self) -> bool {
        self.field_type.list
    }

    /// Check if this field references another resource.
    pub const fn is_reference(&self) -> bool {
        self.field_type.is_reference()
    }

    /// Find a validation by name.
    pub fn find_validation(&self, name: &str) -> Option<&Validation> {
        self.validations.iter().find(|v| v.name == name)
    }

    /// Allowed file kinds (`Image`, `Video`, ...) for file references.
    ///
    /// Accepts both a JSON array and a JSON-encoded string of an array.
    pub fn file_type_options(&self) -> Option<Vec<String>> {
        let value = &self.find_validation(FILE_TYPES_VALIDATION)?.value;
        let parsed = match value {
            serde_json::Value::String(s) => serde_json::from_str(s).ok()?,
            other => other.clone()
        };
        serde_json::from_value(parsed).ok()
    }

    /// Embedded JSON schema of a `json` field.
    pub fn json_schema(&self) -> Option<serde_json::Value> {
        if self.field_type.kind != FieldKind::Json {
            return None;
        }
        match &self.find_validation(JSON_SCHEMA_VALIDATION)?.value {
            serde_json::Value::String(s) => serde_json::from_str(s).ok(),
            other => Some(other.clone())
        }
    }
}

/// Admin and storefront access levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    /// Admin access (`MERCHANT_READ`, `MERCHANT_READ_WRITE`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin:      Option<String>,
    /// Storefront access (`NONE`, `PUBLIC_READ`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storefront: Option<String>
}

/// Configuration of the `renderable` capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableConfig {
    /// Field key used as SEO title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title_key:       Option<String>,
    /// Field key used as SEO description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description_key: Option<String>
}

/// Configuration of the `online_store` capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineStoreConfig {
    /// URL handle prefix for rendered pages.
    pub url_handle: String
}

/// Optional features of an entity definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Records carry a draft/active publishing status.
    pub publishable:  bool,
    /// Records can be translated.
    pub translatable: bool,
    /// Records have SEO metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderable:   Option<RenderableConfig>,
    /// Records are rendered as online store pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_store: Option<OnlineStoreConfig>
}

impl Capabilities {
    /// Check if any capability contributes state to records.
    pub const fn has_record_state(&self) -> bool {
        self.publishable || self.online_store.is_some()
    }
}

/// Declared remote record type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    /// Unique type identifier.
    pub entity_type:      String,
    /// Display name.
    pub name:             String,
    /// Optional description.
    pub description:      Option<String>,
    /// Field used as display name of records.
    pub display_name_key: Option<String>,
    /// Access policy.
    pub access:           Access,
    /// Capability flags.
    pub capabilities:     Capabilities,
    /// Fields in declaration order.
    pub fields:           Vec<FieldDefinition>
}

impl EntityDefinition {
    /// Start building a definition for `entity_type`.
    pub fn builder(entity_type: impl Into<String>) -> EntityDefinitionBuilder {
        EntityDefinitionBuilder::new(entity_type)
    }

    /// Find a field by wire key.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Find a field by camel-cased key.
    pub fn field_by_camel_key(&self, camel: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.camel_key() == camel)
    }

    /// Reference fields in declaration order.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Check if records of this type can expose a thumbnail.
    pub fn has_thumbnail_field(&self) -> bool {
        self.fields.iter().any(|f| f.kind().can_be_thumbnail())
    }
}

/// Builder for [`EntityDefinition`].
#[derive(Debug, Clone)]
pub struct EntityDefinitionBuilder {
    definition: EntityDefinition
}

impl EntityDefinitionBuilder {
    fn new(entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        Self {
            definition: EntityDefinition {
                name: entity_type.to_case(Case::Title),
                entity_type,
                description: None,
                display_name_key: None,
                access: Access::default(),
                capabilities: Capabilities::default(),
                fields: Vec::new()
            }
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.definition.name = name.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    /// Set the field used as display name.
    #[must_use]
    pub fn display_name_key(mut self, key: impl Into<String>) -> Self {
        self.definition.display_name_key = Some(key.into());
        self
    }

    /// Set the access policy.
    #[must_use]
    pub fn access(mut self, access: Access) -> Self {
        self.definition.access = access;
        self
    }

    /// Set the capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.definition.capabilities = capabilities;
        self
    }

    /// Enable the `publishable` capability.
    #[must_use]
    pub fn publishable(mut self) -> Self {
        self.definition.capabilities.publishable = true;
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.definition.fields.push(field);
        self
    }

    /// Finish the definition.
    pub fn build(self) -> EntityDefinition {
        self.definition
    }
}

/// Validated set of entity definitions.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    definitions: Vec<EntityDefinition>,
    index:       HashMap<String, usize>
}

impl Schema {
    /// Build a schema, rejecting duplicate types and unknown targets.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateType`] when two definitions share a type
    /// - [`Error::SchemaLookup`] when a reference target is not declared
    pub fn new(definitions: Vec<EntityDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (position, definition) in definitions.iter().enumerate() {
            if index.insert(definition.entity_type.clone(), position).is_some() {
                return Err(Error::DuplicateType(definition.entity_type.clone()));
            }
        }

        for definition in &definitions {
            for field in &definition.fields {
                let Some(target) = &field.target else {
                    continue;
                };
                for target_type in target.types() {
                    if !index.contains_key(target_type) {
                        return Err(Error::SchemaLookup {
                            subject: "reference target",
                            name:    format!(
                                "{target_type} (from {}.{})",
                                definition.entity_type,
                                field.key()
                            )
                        });
                    }
                }
            }
        }

        Ok(Self {
            definitions,
            index
        })
    }

    /// Parse and validate a TOML schema source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        SchemaFile::from_toml_str(source)?.into_schema()
    }

    /// Look up a definition by type.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaLookup`] when the type is not declared.
    pub fn definition_by_type(&self, entity_type: &str) -> Result<&EntityDefinition> {
        self.get(entity_type)
            .ok_or_else(|| Error::unknown_type(entity_type))
    }

    /// Look up a definition by type, returning `None` when absent.
    pub fn get(&self, entity_type: &str) -> Option<&EntityDefinition> {
        self.index.get(entity_type).map(|&i| &self.definitions[i])
    }

    /// Check if a type is declared.
    pub fn contains(&self, entity_type: &str) -> bool {
        self.index.contains_key(entity_type)
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> &[EntityDefinition] {
        &self.definitions
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
