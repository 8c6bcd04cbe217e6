// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Creation payloads with placeholder targets.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value, json};

use crate::{
    error::{Error, Result},
    schema::{
        Capabilities, EntityDefinition, FieldDefinition, ReferenceTarget, TARGET_VALIDATION,
        TARGETS_VALIDATION
    }
};

/// Prefix marking a target type that still has to be resolved to an id.
pub const PLACEHOLDER_PREFIX: &str = "$definition:";

/// `MetaobjectDefinitionCreateInput` of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionPayload {
    entity_type: String,
    input:       Value
}

impl DefinitionPayload {
    /// Build the payload of `definition`.
    pub fn from_definition(definition: &EntityDefinition) -> Self {
        let mut input = Map::new();
        input.insert("type".into(), Value::String(definition.entity_type.clone()));
        input.insert("name".into(), Value::String(definition.name.clone()));
        if let Some(description) = &definition.description {
            input.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(key) = &definition.display_name_key {
            input.insert("displayNameKey".into(), Value::String(key.clone()));
        }
        if definition.access.admin.is_some() || definition.access.storefront.is_some() {
            input.insert("access".into(), json!(definition.access));
        }
        input.insert("capabilities".into(), capabilities(&definition.capabilities));
        input.insert(
            "fieldDefinitions".into(),
            Value::Array(definition.fields.iter().map(field).collect())
        );
        Self {
            entity_type: definition.entity_type.clone(),
            input:       Value::Object(input)
        }
    }

    /// Entity type of the payload.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Unresolved input, placeholders included.
    pub const fn input(&self) -> &Value {
        &self.input
    }

    /// Types referenced through placeholders.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for validation in target_validations(&self.input) {
            let Some(value) = validation.get("value").and_then(Value::as_str) else {
                continue;
            };
            out.extend(placeholder_types(value));
        }
        out
    }

    /// Input with every placeholder replaced by the id in `ids`.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaLookup`] when a referenced type has no id.
    pub fn resolve(&self, ids: &HashMap<String, String>) -> Result<Value> {
        let mut input = self.input.clone();
        let fields = input
            .get_mut("fieldDefinitions")
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten();
        for field in fields {
            let validations = field
                .get_mut("validations")
                .and_then(Value::as_array_mut)
                .into_iter()
                .flatten();
            for validation in validations {
                let name = validation.get("name").and_then(Value::as_str).unwrap_or_default();
                if name != TARGET_VALIDATION && name != TARGETS_VALIDATION {
                    continue;
                }
                let Some(value) = validation.get("value").and_then(Value::as_str) else {
                    continue;
                };
                let resolved = placeholder_types(value)
                    .into_iter()
                    .map(|t| {
                        ids.get(&t).cloned().ok_or(Error::SchemaLookup {
                            subject: "definition id of",
                            name:    t
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let wire = if name == TARGET_VALIDATION {
                    resolved.into_iter().next().unwrap_or_default()
                } else {
                    Value::from(resolved).to_string()
                };
                validation["value"] = Value::String(wire);
            }
        }
        Ok(input)
    }
}

fn target_validations(input: &Value) -> impl Iterator<Item = &Value> {
    input
        .get("fieldDefinitions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|f| f.get("validations").and_then(Value::as_array))
        .flatten()
        .filter(|v| {
            matches!(
                v.get("name").and_then(Value::as_str),
                Some(TARGET_VALIDATION | TARGETS_VALIDATION)
            )
        })
}

/// Types named by a single placeholder or a JSON array of placeholders.
fn placeholder_types(value: &str) -> Vec<String> {
    if let Some(single) = value.strip_prefix(PLACEHOLDER_PREFIX) {
        return vec![single.to_string()];
    }
    serde_json::from_str::<Vec<String>>(value)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.strip_prefix(PLACEHOLDER_PREFIX).map(str::to_string))
        .collect()
}

fn field(field: &FieldDefinition) -> Value {
    let mut validations: Vec<Value> = field
        .validations
        .iter()
        .filter(|v| v.name != TARGET_VALIDATION && v.name != TARGETS_VALIDATION)
        .map(|v| json!({ "name": v.name, "value": v.wire_value() }))
        .collect();
    match &field.target {
        Some(ReferenceTarget::Single(target)) => validations.push(json!({
            "name": TARGET_VALIDATION,
            "value": format!("{PLACEHOLDER_PREFIX}{target}")
        })),
        Some(ReferenceTarget::Many(targets)) => {
            let placeholders: Vec<String> = targets
                .iter()
                .map(|t| format!("{PLACEHOLDER_PREFIX}{t}"))
                .collect();
            validations.push(json!({
                "name": TARGETS_VALIDATION,
                "value": Value::from(placeholders).to_string()
            }));
        }
        None => {}
    }

    let mut out = Map::new();
    out.insert("key".into(), Value::String(field.key().to_string()));
    out.insert("name".into(), Value::String(field.name.clone()));
    if let Some(description) = &field.description {
        out.insert("description".into(), Value::String(description.clone()));
    }
    out.insert("type".into(), Value::String(field.field_type.to_string()));
    out.insert("required".into(), Value::Bool(field.required));
    out.insert("validations".into(), Value::Array(validations));
    Value::Object(out)
}

fn capabilities(capabilities: &Capabilities) -> Value {
    let mut out = Map::new();
    out.insert("publishable".into(), json!({ "enabled": capabilities.publishable }));
    out.insert("translatable".into(), json!({ "enabled": capabilities.translatable }));
    if let Some(renderable) = &capabilities.renderable {
        out.insert(
            "renderable".into(),
            json!({
                "enabled": true,
                "data": {
                    "metaTitleKey": renderable.meta_title_key,
                    "metaDescriptionKey": renderable.meta_description_key
                }
            })
        );
    }
    if let Some(online_store) = &capabilities.online_store {
        out.insert(
            "onlineStore".into(),
            json!({ "enabled": true, "data": { "urlHandle": online_store.url_handle } })
        );
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        field_type::FieldKind,
        schema::{FieldDefinition, Validation}
    };

    fn definition() -> EntityDefinition {
        EntityDefinition::builder("store")
            .description("A store")
            .publishable()
            .field(
                FieldDefinition::new("title", FieldKind::SingleLineTextField)
                    .required()
                    .validation(Validation::new("max", 10))
            )
            .field(FieldDefinition::new("kind", FieldKind::MetaobjectReference).target("store_type"))
            .field(FieldDefinition::new("related", FieldKind::MixedReference).list().targets(["a", "b"]))
            .build()
    }

    #[test]
    fn payload_carries_placeholders() {
        let payload = DefinitionPayload::from_definition(&definition());
        let input = payload.input();
        assert_eq!(input["type"], "store");
        assert_eq!(input["capabilities"]["publishable"]["enabled"], true);
        let fields = input["fieldDefinitions"].as_array().unwrap();
        assert_eq!(fields[0]["validations"][0], json!({ "name": "max", "value": "10" }));
        assert_eq!(fields[1]["validations"][0]["value"], "$definition:store_type");
        assert_eq!(fields[2]["type"], "list.mixed_reference");
    }

    #[test]
    fn dependencies_are_target_types() {
        let payload = DefinitionPayload::from_definition(&definition());
        let deps: Vec<String> = payload.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["a", "b", "store_type"]);
    }

    #[test]
    fn resolve_substitutes_ids() {
        let payload = DefinitionPayload::from_definition(&definition());
        let ids: HashMap<String, String> = [("store_type", "gid://1"), ("a", "gid://2"), ("b", "gid://3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let input = payload.resolve(&ids).unwrap();
        let fields = input["fieldDefinitions"].as_array().unwrap();
        assert_eq!(fields[1]["validations"][0]["value"], "gid://1");
        assert_eq!(fields[2]["validations"][0]["value"], r#"["gid://2","gid://3"]"#);
        assert!(payload.input()["fieldDefinitions"][1]["validations"][0]["value"]
            .as_str()
            .unwrap()
            .starts_with(PLACEHOLDER_PREFIX));
    }

    #[test]
    fn placeholder_arrays_are_parsed_as_json() {
        let many = Value::from(vec!["$definition:a,b", "$definition:c"]).to_string();
        assert_eq!(placeholder_types(&many), vec!["a,b", "c"]);
        assert_eq!(placeholder_types("$definition:x"), vec!["x"]);
        assert!(placeholder_types(r#"["gid://1"]"#).is_empty());
        assert!(placeholder_types("gid://1").is_empty());
    }

    #[test]
    fn resolve_requires_every_id() {
        let payload = DefinitionPayload::from_definition(&definition());
        assert!(matches!(
            payload.resolve(&HashMap::new()),
            Err(Error::SchemaLookup { .. })
        ));
    }
}
