// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory platform answering the documents the crate sends.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex
};

use metaobject_orm::{GraphQlResponse, Schema, Transport, TransportError, async_trait};
use serde_json::{Value, json};

pub const SCHEMA: &str = r#"
[[metaobjects]]
type = "store"
name = "Store"
capabilities = { publishable = true }

[[metaobjects.fields]]
key = "title"
type = "single_line_text_field"
required = true

[[metaobjects.fields]]
key = "store_type"
type = "metaobject_reference"
target = "store_type"

[[metaobjects.fields]]
key = "floors"
type = "number_integer"

[[metaobjects]]
type = "store_type"
name = "Store type"

[[metaobjects.fields]]
key = "label"
type = "single_line_text_field"
required = true
"#;

#[derive(Default)]
struct State {
    definitions: BTreeMap<String, String>,
    records:     BTreeMap<String, Value>,
    next_id:     u64
}

/// Platform keeping definitions and records in memory.
pub struct InMemoryPlatform {
    field_types: HashMap<(String, String), String>,
    state:       Mutex<State>
}

impl InMemoryPlatform {
    pub fn new(schema: &Schema) -> Self {
        let field_types = schema
            .definitions()
            .iter()
            .flat_map(|d| {
                d.fields.iter().map(|f| {
                    ((d.entity_type.clone(), f.key().to_string()), f.field_type.to_string())
                })
            })
            .collect();
        Self {
            field_types,
            state: Mutex::new(State::default())
        }
    }

    pub fn definition_types(&self) -> Vec<String> {
        self.state.lock().unwrap().definitions.keys().cloned().collect()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    fn handle(&self, query: &str, vars: &Value) -> Value {
        let mut state = self.state.lock().unwrap();
        match operation(query) {
            "DefinitionByType" => {
                let entity_type = vars["type"].as_str().unwrap_or_default();
                let found = state
                    .definitions
                    .get(entity_type)
                    .map_or(Value::Null, |id| json!({ "id": id, "type": entity_type }));
                json!({ "metaobjectDefinitionByType": found })
            }
            "MetaobjectDefinitionCreate" => {
                let entity_type = vars["definition"]["type"].as_str().unwrap_or_default().to_string();
                state.next_id += 1;
                let id = format!("gid://shopify/MetaobjectDefinition/{}", state.next_id);
                state.definitions.insert(entity_type.clone(), id.clone());
                json!({ "metaobjectDefinitionCreate": {
                    "metaobjectDefinition": { "id": id, "type": entity_type },
                    "userErrors": []
                } })
            }
            "MetaobjectCreate" => {
                let input = &vars["metaobject"];
                let entity_type = input["type"].as_str().unwrap_or_default();
                let handle = input["handle"].as_str().unwrap_or_default();
                if find_by_handle(&state, entity_type, handle).is_some() {
                    return json!({ "metaobjectCreate": {
                        "metaobject": null,
                        "userErrors": [{ "field": ["metaobject", "handle"], "message": "Handle has already been taken", "code": "TAKEN" }]
                    } });
                }
                let node = self.insert(&mut state, entity_type, handle, input);
                json!({ "metaobjectCreate": { "metaobject": node, "userErrors": [] } })
            }
            "MetaobjectUpdate" => {
                let id = vars["id"].as_str().unwrap_or_default();
                let node = state.records.get_mut(id).map(|node| {
                    self.merge_fields(node, &vars["metaobject"]);
                    node.clone()
                });
                json!({ "metaobjectUpdate": { "metaobject": node, "userErrors": [] } })
            }
            "MetaobjectUpsert" => {
                let entity_type = vars["handle"]["type"].as_str().unwrap_or_default();
                let handle = vars["handle"]["handle"].as_str().unwrap_or_default();
                let node = match find_by_handle(&state, entity_type, handle) {
                    Some(id) => {
                        let node = state.records.get_mut(&id).map(|node| {
                            self.merge_fields(node, &vars["metaobject"]);
                            node.clone()
                        });
                        node.unwrap_or(Value::Null)
                    }
                    None => self.insert(&mut state, entity_type, handle, &vars["metaobject"])
                };
                json!({ "metaobjectUpsert": { "metaobject": node, "userErrors": [] } })
            }
            "MetaobjectDelete" => {
                let id = vars["id"].as_str().unwrap_or_default();
                let deleted = state.records.remove(id).map(|_| id.to_string());
                json!({ "metaobjectDelete": { "deletedId": deleted, "userErrors": [] } })
            }
            "MetaobjectByHandle" => {
                let entity_type = vars["handle"]["type"].as_str().unwrap_or_default();
                let handle = vars["handle"]["handle"].as_str().unwrap_or_default();
                let node = find_by_handle(&state, entity_type, handle)
                    .and_then(|id| state.records.get(&id).cloned())
                    .unwrap_or(Value::Null);
                json!({ "metaobjectByHandle": node })
            }
            "MetaobjectById" => {
                let id = vars["id"].as_str().unwrap_or_default();
                json!({ "metaobject": state.records.get(id).cloned().unwrap_or(Value::Null) })
            }
            "Metaobjects" => {
                let entity_type = vars["type"].as_str().unwrap_or_default();
                let nodes: Vec<Value> = state
                    .records
                    .values()
                    .filter(|n| n["type"] == entity_type)
                    .cloned()
                    .collect();
                json!({ "metaobjects": {
                    "nodes": nodes,
                    "pageInfo": { "hasNextPage": false, "hasPreviousPage": false }
                } })
            }
            other => panic!("unexpected operation {other}")
        }
    }

    fn insert(&self, state: &mut State, entity_type: &str, handle: &str, input: &Value) -> Value {
        state.next_id += 1;
        let id = format!("gid://shopify/Metaobject/{}", state.next_id);
        let mut node = json!({
            "id": id,
            "type": entity_type,
            "handle": handle,
            "displayName": handle,
            "fields": []
        });
        self.merge_fields(&mut node, input);
        state.records.insert(id, node.clone());
        node
    }

    fn merge_fields(&self, node: &mut Value, input: &Value) {
        let entity_type = node["type"].as_str().unwrap_or_default().to_string();
        let fields = node["fields"].as_array_mut().unwrap();
        for field in input["fields"].as_array().into_iter().flatten() {
            let key = field["key"].as_str().unwrap_or_default();
            let value = match field["value"].as_str() {
                Some("") => Value::Null,
                _ => field["value"].clone()
            };
            let field_type = self
                .field_types
                .get(&(entity_type.clone(), key.to_string()))
                .cloned()
                .unwrap_or_default();
            fields.retain(|f| f["key"] != key);
            fields.push(json!({ "key": key, "type": field_type, "value": value }));
        }
    }
}

fn operation(query: &str) -> &str {
    query
        .split('(')
        .next()
        .and_then(|head| head.split_whitespace().nth(1))
        .unwrap_or_default()
}

fn find_by_handle(state: &State, entity_type: &str, handle: &str) -> Option<String> {
    state
        .records
        .iter()
        .find(|(_, n)| n["type"] == entity_type && n["handle"] == handle)
        .map(|(id, _)| id.clone())
}

#[async_trait]
impl Transport for InMemoryPlatform {
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
        Ok(GraphQlResponse::data(self.handle(query, &variables)))
    }
}
