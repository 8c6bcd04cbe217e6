// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime records.
//!
//! A [`Record`] is built by the transformer from a response and never mutated
//! afterwards by the repository; writes produce a new record from a fresh
//! response.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Publishing status snapshot of the `publishable` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishableState {
    /// `ACTIVE` or `DRAFT`.
    pub status: String
}

/// Online store snapshot of the `online_store` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStoreState {
    /// Template suffix used for rendering.
    #[serde(default)]
    pub template_suffix: Option<String>
}

/// Capability state of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityState {
    /// Publishing status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishable:  Option<PublishableState>,
    /// Online store state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_store: Option<OnlineStoreState>
}

/// System metadata of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemFields {
    /// Fully-qualified identifier.
    pub id:           String,
    /// Entity type, when selected.
    pub entity_type:  Option<String>,
    /// Handle, when selected.
    pub handle:       Option<String>,
    /// Display name, when selected.
    pub display_name: Option<String>,
    /// Capability snapshot.
    pub capabilities: Option<CapabilityState>,
    /// Creation timestamp.
    pub created_at:   Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    pub updated_at:   Option<DateTime<FixedOffset>>,
    /// Thumbnail payload (color hex or file).
    pub thumbnail:    Option<serde_json::Value>
}

impl SystemFields {
    /// System fields carrying only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Explicit key-value container of field values keyed by camel-cased key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicFields {
    values: BTreeMap<String, FieldValue>
}

impl DynamicFields {
    /// Empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Set `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Check if `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove(key)
    }

    /// `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for DynamicFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        }
    }
}

/// One metaobject instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// System metadata.
    pub system: SystemFields,
    /// Field values keyed by camel-cased key.
    pub fields: DynamicFields
}

impl Record {
    /// Id of the record.
    pub fn id(&self) -> &str {
        &self.system.id
    }

    /// Shorthand for `fields.get`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}
