// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Wire format conversion.
//!
//! # Serialization
//!
//! | Value | Wire value |
//! |-------|------------|
//! | null, empty list, `{}` / `[]` | `""` (clears the field) |
//! | text | unchanged |
//! | populated record | its id |
//! | date / date-time | ISO 8601 string |
//! | anything else | JSON with snake-cased object keys |
//!
//! An empty text value and "no value" both serialize to `""`; the platform
//! cannot tell them apart and neither can this module.
//!
//! # Deserialization
//!
//! A response node carries the flat `fields` list plus one aliased entry per
//! populated reference:
//!
//! ```text
//! { "id": "...", "fields": [{ "key": "generic_obj", "type": "metaobject_reference", "value": "gid://..." }],
//!   "genericObj": { "reference": { "id": "...", "fields": [...] } } }
//! ```
//!
//! Populated entries override the flat value. A referenced payload that looks
//! like a record (an `id` and a `fields` list) becomes a nested [`Record`];
//! any other payload is passed through as JSON.

use chrono::{DateTime, NaiveDate};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    error::{Error, Result},
    field_type::{FieldKind, FieldType},
    record::{CapabilityState, DynamicFields, Record, SystemFields},
    schema::{EntityDefinition, camel_key},
    value::FieldValue
};

/// Node keys holding system metadata rather than populated references.
const SYSTEM_KEYS: &[&str] = &[
    "id",
    "type",
    "handle",
    "displayName",
    "createdAt",
    "updatedAt",
    "capabilities",
    "thumbnailField",
    "fields"
];

/// One `{ key, value }` input pair of a write mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireField {
    /// Snake-cased field key.
    pub key:   String,
    /// Encoded value.
    pub value: String
}

/// Encode one value for the wire.
pub fn serialize_value(value: &FieldValue) -> String {
    if value.is_empty() {
        return String::new();
    }
    match value {
        FieldValue::String(s) => s.clone(),
        FieldValue::Record(record) => record.id().to_string(),
        FieldValue::Date(_) | FieldValue::DateTime(_) => match value.to_json() {
            Value::String(s) => s,
            other => other.to_string()
        },
        other => snake_keys(other.to_json()).to_string()
    }
}

/// Encode the fields of a write against `definition`.
///
/// # Errors
///
/// [`Error::SchemaLookup`] when a key is not a field of the definition.
pub fn serialize_fields(definition: &EntityDefinition, fields: &DynamicFields) -> Result<Vec<WireField>> {
    fields
        .iter()
        .map(|(key, value)| {
            let field = definition
                .field_by_camel_key(key)
                .ok_or_else(|| Error::SchemaLookup {
                    subject: "field",
                    name:    format!("{}.{key}", definition.entity_type)
                })?;
            Ok(WireField {
                key:   field.key().to_string(),
                value: serialize_value(value)
            })
        })
        .collect()
}

/// Response node for `record`, as the platform would return it.
///
/// Populated references are written back as ids; only the flat field list is
/// produced.
pub fn wire_node(definition: &EntityDefinition, record: &Record) -> Result<Value> {
    let fields = record
        .fields
        .iter()
        .map(|(key, value)| {
            let field = definition
                .field_by_camel_key(key)
                .ok_or_else(|| Error::SchemaLookup {
                    subject: "field",
                    name:    format!("{}.{key}", definition.entity_type)
                })?;
            let json_value = snake_keys(value.to_json());
            let wire = serialize_value(value);
            let wire = if wire.is_empty() {
                Value::Null
            } else {
                Value::String(wire)
            };
            Ok(serde_json::json!({
                "key": field.key(),
                "type": field.field_type.to_string(),
                "value": wire,
                "jsonValue": json_value
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    let system = &record.system;
    let mut node = Map::new();
    node.insert("id".into(), Value::String(system.id.clone()));
    node.insert(
        "type".into(),
        Value::String(system.entity_type.clone().unwrap_or_else(|| definition.entity_type.clone()))
    );
    if let Some(handle) = &system.handle {
        node.insert("handle".into(), Value::String(handle.clone()));
    }
    if let Some(name) = &system.display_name {
        node.insert("displayName".into(), Value::String(name.clone()));
    }
    node.insert("fields".into(), Value::Array(fields));
    Ok(Value::Object(node))
}

/// Build a record from a response node.
///
/// # Errors
///
/// [`Error::MalformedResponse`] when the node is not an object with an `id`.
pub fn deserialize_record(node: &Value) -> Result<Record> {
    let object = node
        .as_object()
        .ok_or_else(|| Error::MalformedResponse(format!("expected a record object, got {node}")))?;
    let system = system_fields(object)?;

    let mut fields = DynamicFields::new();
    for entry in object
        .get("fields")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let Some(key) = entry.get("key").and_then(Value::as_str) else {
            continue;
        };
        let field_type = entry
            .get("type")
            .and_then(Value::as_str)
            .map(FieldType::parse)
            .unwrap_or_else(|| FieldType::single(FieldKind::Unknown(String::new())));
        let value = decode_entry(key, &field_type, entry.get("value"), entry.get("jsonValue"));
        fields.set(camel_key(key), value);
    }

    for (key, payload) in object {
        if SYSTEM_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = populated(payload)? {
            fields.set(key.clone(), value);
        }
    }

    Ok(Record {
        system,
        fields
    })
}

fn system_fields(object: &Map<String, Value>) -> Result<SystemFields> {
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
    let timestamp = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    };
    let id = text("id").ok_or_else(|| Error::MalformedResponse("record without `id`".into()))?;
    Ok(SystemFields {
        id,
        entity_type: text("type"),
        handle: text("handle"),
        display_name: text("displayName"),
        capabilities: object
            .get("capabilities")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value::<CapabilityState>(v.clone()).ok()),
        created_at: timestamp("createdAt"),
        updated_at: timestamp("updatedAt"),
        thumbnail: object
            .get("thumbnailField")
            .and_then(|t| t.get("thumbnail"))
            .filter(|v| !v.is_null())
            .cloned()
    })
}

/// Resolve an aliased `{ reference }` / `{ references { nodes } }` entry.
fn populated(payload: &Value) -> Result<Option<FieldValue>> {
    if let Some(reference) = payload.get("reference") {
        return resolve_reference(reference).map(Some);
    }
    if let Some(references) = payload.get("references") {
        let nodes = references
            .get("nodes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        return nodes
            .iter()
            .map(resolve_reference)
            .collect::<Result<Vec<_>>>()
            .map(|items| Some(FieldValue::List(items)));
    }
    Ok(None)
}

fn resolve_reference(reference: &Value) -> Result<FieldValue> {
    if reference.is_null() {
        return Ok(FieldValue::Null);
    }
    if looks_like_record(reference) {
        return deserialize_record(reference).map(FieldValue::from);
    }
    Ok(FieldValue::Json(reference.clone()))
}

fn looks_like_record(value: &Value) -> bool {
    value.get("id").is_some_and(Value::is_string) && value.get("fields").is_some_and(Value::is_array)
}

fn decode_entry(key: &str, field_type: &FieldType, value: Option<&Value>, json_value: Option<&Value>) -> FieldValue {
    let raw = match (json_value, value) {
        (Some(json), _) if !json.is_null() => json.clone(),
        (_, Some(Value::String(s))) if field_type.list || is_structured(&field_type.kind) => {
            serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
        }
        (_, Some(v)) => v.clone(),
        (_, None) => Value::Null
    };
    if raw.is_null() {
        return FieldValue::Null;
    }
    if field_type.list {
        return match raw {
            Value::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| decode_scalar(key, &field_type.kind, item))
                    .collect()
            ),
            other => passthrough(key, field_type, other)
        };
    }
    decode_scalar(key, &field_type.kind, &raw)
}

fn is_structured(kind: &FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Json
            | FieldKind::RichTextField
            | FieldKind::Money
            | FieldKind::Weight
            | FieldKind::Volume
            | FieldKind::Dimension
            | FieldKind::Link
            | FieldKind::Rating
    )
}

fn decode_scalar(key: &str, kind: &FieldKind, raw: &Value) -> FieldValue {
    let decoded = match (kind, raw) {
        (_, Value::Null) => Some(FieldValue::Null),
        (FieldKind::Boolean, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        (FieldKind::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(FieldValue::Bool(true)),
            "false" => Some(FieldValue::Bool(false)),
            _ => None
        },
        (FieldKind::NumberInteger, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
        (FieldKind::NumberInteger, Value::String(s)) => s.parse().ok().map(FieldValue::Integer),
        (FieldKind::NumberDecimal, Value::Number(n)) => n.as_f64().map(FieldValue::Decimal),
        (FieldKind::NumberDecimal, Value::String(s)) => s.parse().ok().map(FieldValue::Decimal),
        (FieldKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(FieldValue::Date),
        (FieldKind::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(FieldValue::DateTime),
        (FieldKind::Money, _) => compound(raw).map(FieldValue::Money),
        (FieldKind::Weight | FieldKind::Volume | FieldKind::Dimension, _) => {
            compound(raw).map(FieldValue::Measurement)
        }
        (FieldKind::Link, _) => compound(raw).map(FieldValue::Link),
        (FieldKind::Rating, _) => compound(raw).map(FieldValue::Rating),
        // Untyped entry: text stays text.
        (FieldKind::Unknown(tag), Value::String(s)) if tag.is_empty() => {
            Some(FieldValue::String(s.clone()))
        }
        (FieldKind::Json | FieldKind::RichTextField | FieldKind::Unknown(_), other) => {
            Some(FieldValue::Json(other.clone()))
        }
        (_, Value::String(s)) => Some(FieldValue::String(s.clone())),
        _ => None
    };
    decoded.unwrap_or_else(|| passthrough(key, &FieldType::single(kind.clone()), raw.clone()))
}

fn passthrough(key: &str, field_type: &FieldType, raw: Value) -> FieldValue {
    warn!(field = key, field_type = %field_type, "value does not match its wire type, passing through");
    FieldValue::Json(raw)
}

fn compound<T: DeserializeOwned>(raw: &Value) -> Option<T> {
    let value = match raw {
        Value::String(s) => serde_json::from_str(s).ok()?,
        other => other.clone()
    };
    serde_json::from_value(camel_keys(value)).ok()
}

fn convert_keys(value: Value, case: Case) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_case(case), convert_keys(v, case)))
                .collect()
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| convert_keys(v, case)).collect()),
        other => other
    }
}

/// Snake-case every object key, recursively.
pub fn snake_keys(value: Value) -> Value {
    convert_keys(value, Case::Snake)
}

/// Camel-case every object key, recursively.
pub fn camel_keys(value: Value) -> Value {
    convert_keys(value, Case::Camel)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{
        schema::FieldDefinition,
        value::{Link, Measurement, Money, Rating}
    };

    fn definition() -> EntityDefinition {
        EntityDefinition::builder("product_info")
            .field(FieldDefinition::new("title", FieldKind::SingleLineTextField))
            .field(FieldDefinition::new("active", FieldKind::Boolean))
            .field(FieldDefinition::new("count", FieldKind::NumberInteger))
            .field(FieldDefinition::new("ratio", FieldKind::NumberDecimal))
            .field(FieldDefinition::new("launch", FieldKind::Date))
            .field(FieldDefinition::new("updated", FieldKind::DateTime))
            .field(FieldDefinition::new("price", FieldKind::Money))
            .field(FieldDefinition::new("weight", FieldKind::Weight))
            .field(FieldDefinition::new("docs", FieldKind::Link))
            .field(FieldDefinition::new("score", FieldKind::Rating))
            .field(FieldDefinition::new("tags", FieldKind::SingleLineTextField).list())
            .field(FieldDefinition::new("related", FieldKind::MetaobjectReference))
            .build()
    }

    fn scalar_record() -> Record {
        Record {
            system: SystemFields {
                entity_type: Some("product_info".into()),
                handle: Some("first".into()),
                ..SystemFields::with_id("gid://shopify/Metaobject/1")
            },
            fields: DynamicFields::new()
                .with("title", "Lamp")
                .with("active", true)
                .with("count", 3_i64)
                .with("ratio", 0.5_f64)
                .with("launch", NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
                .with(
                    "updated",
                    DateTime::parse_from_rfc3339("2024-03-01T08:00:00+02:00").unwrap()
                )
                .with("price", Money {
                    amount:        "19.99".into(),
                    currency_code: "EUR".into()
                })
                .with("weight", Measurement {
                    unit:  "KILOGRAMS".into(),
                    value: 1.5
                })
                .with("docs", Link {
                    text: "Manual".into(),
                    url:  "https://example.com".into()
                })
                .with("score", Rating {
                    value:     "4.5".into(),
                    scale_min: "1.0".into(),
                    scale_max: "5.0".into()
                })
                .with("tags", vec!["a", "b"])
        }
    }

    #[test]
    fn scalar_records_round_trip() {
        let record = scalar_record();
        let node = wire_node(&definition(), &record).unwrap();
        assert_eq!(deserialize_record(&node).unwrap(), record);
    }

    #[test]
    fn serialization_rules() {
        assert_eq!(serialize_value(&FieldValue::from("plain text")), "plain text");
        assert_eq!(serialize_value(&FieldValue::Bool(true)), "true");
        assert_eq!(serialize_value(&FieldValue::Integer(7)), "7");
        assert_eq!(
            serialize_value(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())),
            "2024-01-02"
        );
        assert_eq!(
            serialize_value(&FieldValue::Money(Money {
                amount:        "1.00".into(),
                currency_code: "USD".into()
            })),
            r#"{"amount":"1.00","currency_code":"USD"}"#
        );
        assert_eq!(serialize_value(&FieldValue::from(vec!["x", "y"])), r#"["x","y"]"#);
    }

    #[test]
    fn json_values_are_snake_cased() {
        let value = FieldValue::Json(json!({ "backgroundColor": "red", "layers": [{ "zIndex": 2 }] }));
        assert_eq!(
            serialize_value(&value),
            r#"{"background_color":"red","layers":[{"z_index":2}]}"#
        );
        let definition = EntityDefinition::builder("theme")
            .field(FieldDefinition::new("settings", FieldKind::Json))
            .build();
        let wire = serialize_fields(&definition, &DynamicFields::new().with("settings", value)).unwrap();
        assert_eq!(wire[0].value, r#"{"background_color":"red","layers":[{"z_index":2}]}"#);
    }

    #[test]
    fn untyped_entries_keep_text_and_structure() {
        let node = json!({
            "id": "gid://shopify/Metaobject/5",
            "fields": [
                { "key": "name", "jsonValue": "X" },
                { "key": "meta", "jsonValue": { "a": 1 } }
            ]
        });
        let record = deserialize_record(&node).unwrap();
        assert_eq!(record.get("name"), Some(&FieldValue::String("X".into())));
        assert_eq!(record.get("meta"), Some(&FieldValue::Json(json!({ "a": 1 }))));
    }

    #[test]
    fn populated_records_serialize_to_id() {
        let nested = Record {
            system: SystemFields::with_id("gid://shopify/Metaobject/9"),
            fields: DynamicFields::new()
        };
        assert_eq!(serialize_value(&FieldValue::from(nested)), "gid://shopify/Metaobject/9");
    }

    #[test]
    fn serialize_fields_uses_wire_keys() {
        let fields = DynamicFields::new().with("title", "Lamp").with("tags", Vec::<String>::new());
        let wire = serialize_fields(&definition(), &fields).unwrap();
        assert_eq!(wire, vec![
            WireField {
                key:   "tags".into(),
                value: String::new()
            },
            WireField {
                key:   "title".into(),
                value: "Lamp".into()
            },
        ]);
    }

    #[test]
    fn serialize_fields_rejects_unknown_keys() {
        let fields = DynamicFields::new().with("nope", "x");
        assert!(matches!(
            serialize_fields(&definition(), &fields),
            Err(Error::SchemaLookup { subject: "field", .. })
        ));
    }

    #[test]
    fn booleans_from_strings() {
        let node = json!({
            "id": "gid://shopify/Metaobject/1",
            "fields": [
                { "key": "active", "type": "boolean", "value": "false", "jsonValue": null },
                { "key": "count", "type": "number_integer", "value": "12" }
            ]
        });
        let record = deserialize_record(&node).unwrap();
        assert_eq!(record.get("active"), Some(&FieldValue::Bool(false)));
        assert_eq!(record.get("count"), Some(&FieldValue::Integer(12)));
    }

    #[test]
    fn populated_reference_becomes_record() {
        let node = json!({
            "id": "gid://shopify/Metaobject/2",
            "fields": [
                { "key": "name", "type": "single_line_text_field", "value": "Outer" },
                { "key": "generic_obj", "type": "metaobject_reference", "value": "gid://shopify/Metaobject/1" }
            ],
            "genericObj": { "reference": {
                "id": "1",
                "fields": [{ "key": "name", "jsonValue": "X" }]
            } }
        });
        let record = deserialize_record(&node).unwrap();
        let nested = record.get("genericObj").and_then(FieldValue::as_record).unwrap();
        assert_eq!(nested.id(), "1");
        assert_eq!(nested.get("name").and_then(FieldValue::as_str), Some("X"));
        assert_eq!(record.get("name").and_then(FieldValue::as_str), Some("Outer"));
    }

    #[test]
    fn unpopulated_references_stay_identifiers() {
        let node = json!({
            "id": "gid://shopify/Metaobject/2",
            "fields": [
                { "key": "generic_obj", "type": "metaobject_reference", "value": "gid://shopify/Metaobject/1" },
                { "key": "items", "type": "list.metaobject_reference", "value": "[\"gid://shopify/Metaobject/3\"]" }
            ]
        });
        let record = deserialize_record(&node).unwrap();
        assert_eq!(
            record.get("genericObj").and_then(FieldValue::as_str),
            Some("gid://shopify/Metaobject/1")
        );
        assert_eq!(
            record.get("items"),
            Some(&FieldValue::List(vec![FieldValue::from("gid://shopify/Metaobject/3")]))
        );
    }

    #[test]
    fn reference_lists_and_foreign_payloads() {
        let node = json!({
            "id": "gid://shopify/Metaobject/2",
            "fields": [],
            "gallery": { "references": { "nodes": [
                { "id": "gid://shopify/MediaImage/1", "image": { "url": "https://cdn/x.png" } }
            ] } },
            "children": { "references": { "nodes": [
                { "id": "gid://shopify/Metaobject/5", "fields": [] }
            ] } },
            "missing": { "reference": null }
        });
        let record = deserialize_record(&node).unwrap();
        let gallery = record.get("gallery").and_then(FieldValue::as_list).unwrap();
        assert!(matches!(&gallery[0], FieldValue::Json(v) if v["image"]["url"] == "https://cdn/x.png"));
        let children = record.get("children").and_then(FieldValue::as_list).unwrap();
        assert_eq!(children[0].as_record().unwrap().id(), "gid://shopify/Metaobject/5");
        assert_eq!(record.get("missing"), Some(&FieldValue::Null));
    }

    #[test]
    fn unknown_types_pass_through() {
        let node = json!({
            "id": "gid://shopify/Metaobject/2",
            "fields": [{ "key": "future", "type": "hologram", "value": "x", "jsonValue": { "beam": 1 } }]
        });
        let record = deserialize_record(&node).unwrap();
        assert_eq!(record.get("future"), Some(&FieldValue::Json(json!({ "beam": 1 }))));
    }

    #[test]
    fn system_fields_are_read() {
        let node = json!({
            "id": "gid://shopify/Metaobject/2",
            "type": "page",
            "handle": "home",
            "displayName": "Home",
            "createdAt": "2024-01-01T00:00:00Z",
            "capabilities": { "publishable": { "status": "ACTIVE" } },
            "thumbnailField": { "thumbnail": { "hex": "#fff" } },
            "fields": []
        });
        let record = deserialize_record(&node).unwrap();
        assert_eq!(record.system.handle.as_deref(), Some("home"));
        assert_eq!(
            record.system.capabilities.unwrap().publishable.unwrap().status,
            "ACTIVE"
        );
        assert_eq!(record.system.thumbnail, Some(json!({ "hex": "#fff" })));
        assert!(record.system.created_at.is_some());
    }

    #[test]
    fn nodes_without_id_are_malformed() {
        assert!(matches!(
            deserialize_record(&json!({ "fields": [] })),
            Err(Error::MalformedResponse(_))
        ));
        assert!(deserialize_record(&json!("x")).is_err());
    }

    fn empty_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            Just(FieldValue::Null),
            Just(FieldValue::List(Vec::new())),
            Just(FieldValue::Json(json!([]))),
            Just(FieldValue::Json(json!({}))),
            Just(FieldValue::Json(Value::Null)),
        ]
    }

    proptest! {
        #[test]
        fn empty_values_serialize_to_empty_string(value in empty_value(), key in "[a-z]{1,8}") {
            let definition = EntityDefinition::builder("any")
                .field(FieldDefinition::new(key.clone(), FieldKind::Json))
                .build();
            let fields = DynamicFields::new().with(camel_key(&key), value);
            let wire = serialize_fields(&definition, &fields).unwrap();
            prop_assert_eq!(&wire[0].value, "");
        }
    }
}
