// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Remote definition provisioning.
//!
//! Reference fields name their targets by *type*, but the platform wants
//! definition *ids*. Provisioning therefore runs in dependency order:
//!
//! ```text
//! 1. payloads      every definition, targets as placeholders
//! 2. lookup        type -> existing id (read-through cache)
//! 3. to create     types without an id
//! 4. layers        Kahn's algorithm over the to-create subset
//! 5. per layer     resolve placeholders, create concurrently, settle, inspect
//! ```
//!
//! A cycle among the definitions to create aborts before anything is sent.
//! An existing definition is treated as satisfied and never diffed. A
//! `TAKEN` conflict during provisioning means another process created the
//! definition first; its id is looked up again and provisioning continues.

mod payload;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dashmap::DashMap;
use futures::future::join_all;
pub use payload::{DefinitionPayload, PLACEHOLDER_PREFIX};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    error::{BatchFailure, Error, Result, UserErrors},
    query::documents,
    schema::{EntityDefinition, Schema},
    transport::Transport
};

/// Platform code of a uniqueness conflict.
pub const TAKEN_CODE: &str = "TAKEN";

/// Split `payloads` into creation layers.
///
/// Edges only exist between members of `payloads`; dependencies outside the
/// set are assumed to exist already. Types within a layer are sorted and
/// independent of each other.
///
/// # Errors
///
/// [`Error::CircularDependency`] naming the types left on a cycle.
pub fn dependency_layers(payloads: &[DefinitionPayload]) -> Result<Vec<Vec<String>>> {
    let members: BTreeSet<&str> = payloads.iter().map(DefinitionPayload::entity_type).collect();
    let mut in_degree: BTreeMap<&str, usize> = members.iter().map(|t| (*t, 0)).collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for payload in payloads {
        let from = payload.entity_type();
        for dependency in payload.dependencies() {
            let Some(to) = members.get(dependency.as_str()) else {
                continue;
            };
            dependents.entry(*to).or_default().push(from);
            if let Some(degree) = in_degree.get_mut(from) {
                *degree += 1;
            }
        }
    }

    let mut layers = Vec::new();
    let mut ready: Vec<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(t, _)| *t)
        .collect();
    while !ready.is_empty() {
        let mut next = Vec::new();
        for done in &ready {
            in_degree.remove(done);
            for dependent in dependents.get(done).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(*dependent);
                    }
                }
            }
        }
        layers.push(ready.iter().map(|t| t.to_string()).collect());
        next.sort_unstable();
        next.dedup();
        ready = next;
    }

    if in_degree.is_empty() {
        Ok(layers)
    } else {
        Err(Error::CircularDependency(
            in_degree.into_keys().map(str::to_string).collect()
        ))
    }
}

/// Outcome of [`DefinitionManager::provision`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Types that already existed (including `TAKEN` conflicts).
    pub existing: Vec<String>,
    /// Types created by this run, in creation order.
    pub created:  Vec<String>,
    /// Creation layers as planned.
    pub layers:   Vec<Vec<String>>,
    /// Definition id of every type of the schema.
    pub ids:      BTreeMap<String, String>
}

/// Creates remote definitions from a schema.
pub struct DefinitionManager<T> {
    transport: T,
    ids:       DashMap<String, Option<String>>
}

impl<T: Transport> DefinitionManager<T> {
    /// Manager over `transport` with an empty id cache.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            ids: DashMap::new()
        }
    }

    /// Borrow the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Drop every cached lookup.
    pub fn clear_cache(&self) {
        self.ids.clear();
    }

    /// Remote definition id of `entity_type`, if it exists.
    ///
    /// Results, including absence, are cached. Concurrent callers may look up
    /// the same type twice.
    pub async fn definition_id(&self, entity_type: &str) -> Result<Option<String>> {
        if let Some(cached) = self.ids.get(entity_type).map(|e| e.value().clone()) {
            return Ok(cached);
        }
        let id = self.fetch_definition_id(entity_type).await?;
        self.ids.insert(entity_type.to_string(), id.clone());
        Ok(id)
    }

    async fn fetch_definition_id(&self, entity_type: &str) -> Result<Option<String>> {
        debug!(entity = entity_type, "looking up definition id");
        let data = self
            .transport
            .execute(&documents::definition_by_type(), json!({ "type": entity_type }))
            .await?
            .into_data()?;
        Ok(data
            .get(documents::DEFINITION_BY_TYPE_ROOT)
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Create the definition of one entity.
    ///
    /// Reference targets must already exist remotely.
    ///
    /// # Errors
    ///
    /// - [`Error::DefinitionTaken`] when the definition already exists
    /// - [`Error::SchemaLookup`] when a reference target has no remote id
    /// - [`Error::UserErrors`] for any other rejection
    pub async fn create_definition(&self, definition: &EntityDefinition) -> Result<String> {
        let payload = DefinitionPayload::from_definition(definition);
        let mut ids = HashMap::new();
        for dependency in payload.dependencies() {
            if let Some(id) = self.definition_id(&dependency).await? {
                ids.insert(dependency, id);
            }
        }
        self.create(&payload, &ids).await
    }

    async fn create(&self, payload: &DefinitionPayload, ids: &HashMap<String, String>) -> Result<String> {
        let entity_type = payload.entity_type();
        let input = payload.resolve(ids)?;
        debug!(entity = entity_type, "creating definition");
        let mut data = self
            .transport
            .execute(&documents::create_definition(), json!({ "definition": input }))
            .await?
            .into_data()?;
        let result = data
            .get_mut(documents::DEFINITION_CREATE_ROOT)
            .map(Value::take)
            .unwrap_or_default();
        if let Some(errors) = UserErrors::from_payload(&result) {
            if errors.has_code(TAKEN_CODE) {
                return Err(Error::DefinitionTaken(entity_type.to_string()));
            }
            return Err(errors.into());
        }
        let id = result
            .get("metaobjectDefinition")
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse("definition create returned no id".into()))?;
        self.ids.insert(entity_type.to_string(), Some(id.clone()));
        Ok(id)
    }

    /// Make every definition of `schema` exist remotely.
    ///
    /// # Errors
    ///
    /// - [`Error::CircularDependency`] before any creation
    /// - [`Error::Batch`] with the failures of the first failing layer; later
    ///   layers are not started
    pub async fn provision(&self, schema: &Schema) -> Result<ProvisionReport> {
        let payloads: Vec<DefinitionPayload> = schema
            .definitions()
            .iter()
            .map(DefinitionPayload::from_definition)
            .collect();

        let lookups = join_all(payloads.iter().map(|p| self.definition_id(p.entity_type()))).await;
        let mut report = ProvisionReport::default();
        let mut ids = HashMap::new();
        let mut pending = Vec::new();
        for (payload, lookup) in payloads.into_iter().zip(lookups) {
            match lookup? {
                Some(id) => {
                    report.existing.push(payload.entity_type().to_string());
                    ids.insert(payload.entity_type().to_string(), id);
                }
                None => pending.push(payload)
            }
        }

        report.layers = dependency_layers(&pending)?;
        info!(
            existing = report.existing.len(),
            to_create = pending.len(),
            layers = report.layers.len(),
            "provisioning definitions"
        );

        let by_type: HashMap<&str, &DefinitionPayload> =
            pending.iter().map(|p| (p.entity_type(), p)).collect();
        for (depth, layer) in report.layers.iter().enumerate() {
            info!(layer = depth, types = ?layer, "creating definition layer");
            let members: Vec<&DefinitionPayload> =
                layer.iter().filter_map(|t| by_type.get(t.as_str()).copied()).collect();
            let settled = join_all(members.iter().map(|p| self.create(p, &ids))).await;

            let mut failures = Vec::new();
            for (index, (payload, result)) in members.iter().zip(settled).enumerate() {
                let entity_type = payload.entity_type().to_string();
                match result {
                    Ok(id) => {
                        report.created.push(entity_type.clone());
                        ids.insert(entity_type, id);
                    }
                    Err(Error::DefinitionTaken(_)) => {
                        warn!(entity = %entity_type, "definition already exists, resolving its id");
                        self.ids.remove(&entity_type);
                        match self.definition_id(&entity_type).await {
                            Ok(Some(id)) => {
                                report.existing.push(entity_type.clone());
                                ids.insert(entity_type, id);
                            }
                            Ok(None) => failures.push(BatchFailure {
                                index,
                                error: Error::NotFound {
                                    entity: "metaobject definition".into(),
                                    lookup: entity_type
                                }
                            }),
                            Err(error) => failures.push(BatchFailure {
                                index,
                                error
                            })
                        }
                    }
                    Err(error) => failures.push(BatchFailure {
                        index,
                        error
                    })
                }
            }
            if !failures.is_empty() {
                warn!(layer = depth, failed = failures.len(), "definition layer failed");
                return Err(Error::Batch {
                    total: members.len(),
                    failures
                });
            }
        }

        report.ids = ids.into_iter().collect();
        Ok(report)
    }
}
