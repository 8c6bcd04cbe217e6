// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Record repository.
//!
//! A [`Repository`] serves one entity type of a [`Schema`] over a
//! [`Transport`]. Every read goes through the [`QueryBuilder`], so populate
//! paths are validated before anything is sent.
//!
//! # Operations
//!
//! | Method | Remote operation | Result |
//! |--------|------------------|--------|
//! | [`find_by_id`](Repository::find_by_id) | `metaobject(id:)` | `Option<Record>` |
//! | [`find_by_handle`](Repository::find_by_handle) | `metaobjectByHandle` | `Option<Record>` |
//! | [`find_all`](Repository::find_all) | `metaobjects(first: 250)` | `Vec<Record>` |
//! | [`find`](Repository::find) | `metaobjects` (cursor) | [`Connection`] |
//! | [`create`](Repository::create) | `metaobjectCreate` | `Record` |
//! | [`create_many`](Repository::create_many) | concurrent creates | `Vec<Record>` |
//! | [`update`](Repository::update) | `metaobjectUpdate` | `Record` |
//! | [`upsert`](Repository::upsert) | `metaobjectUpsert` | `Record` |
//! | [`delete`](Repository::delete) | `metaobjectDelete` | deleted id |
//! | [`bulk_delete`](Repository::bulk_delete) | `metaobjectBulkDelete` | [`Job`] |
//!
//! Mutations that report `userErrors` fail with [`Error::UserErrors`]; a
//! partially applied write is never returned as a success.
//!
//! # Example
//!
//! ```rust,ignore
//! let repo = Repository::new(transport, &schema, "baz")?;
//! let options = FindOptions::new().populate("genericObj");
//! let baz = repo.find_by_handle_or_fail("first", &options).await?;
//! ```

mod page;

use futures::future::join_all;
pub use page::{Connection, FindParams, PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::{
    config::OrmConfig,
    error::{BatchFailure, Error, Result, UserErrors},
    id::normalize_metaobject_id,
    paths::PopulateSet,
    query::{QueryBuilder, QueryExtensions, SelectionSet, documents},
    record::{CapabilityState, DynamicFields, Record},
    schema::{EntityDefinition, Schema},
    transform::{deserialize_record, serialize_fields},
    transport::Transport,
    value::FieldValue
};

/// Population and query extensions of a read.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Paths to populate.
    pub populate:   PopulateSet,
    /// Per-path selection hooks.
    pub extensions: QueryExtensions
}

impl FindOptions {
    /// Nothing populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a populate path.
    #[must_use]
    pub fn populate(mut self, path: impl Into<String>) -> Self {
        self.populate.insert(path);
        self
    }

    /// Replace the extension hooks.
    #[must_use]
    pub fn extensions(mut self, extensions: QueryExtensions) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Handle, field values and capability state of a write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordInput {
    /// Handle; generated by the platform on create when absent.
    pub handle:       Option<String>,
    /// Field values keyed by camel-cased key.
    pub fields:       DynamicFields,
    /// Capability state to apply.
    pub capabilities: Option<CapabilityState>
}

impl RecordInput {
    /// Empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handle.
    #[must_use]
    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Set a field value.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.set(key, value);
        self
    }

    /// Set the capability state.
    #[must_use]
    pub fn capabilities(mut self, capabilities: CapabilityState) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    fn to_wire(&self, definition: &EntityDefinition, with_type: bool, with_handle: bool) -> Result<Value> {
        let mut input = Map::new();
        if with_type {
            input.insert("type".into(), Value::String(definition.entity_type.clone()));
        }
        if with_handle && let Some(handle) = &self.handle {
            input.insert("handle".into(), Value::String(handle.clone()));
        }
        input.insert(
            "fields".into(),
            serde_json::to_value(serialize_fields(definition, &self.fields)?)?
        );
        if let Some(capabilities) = &self.capabilities {
            input.insert("capabilities".into(), serde_json::to_value(capabilities)?);
        }
        Ok(Value::Object(input))
    }
}

/// Asynchronous bulk deletion handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Fully-qualified job id.
    pub id:   String,
    /// Whether the job already finished.
    pub done: bool
}

/// Repository of one entity type.
pub struct Repository<'s, T> {
    transport:   T,
    schema:      &'s Schema,
    definition:  &'s EntityDefinition,
    entity_type: String,
    config:      OrmConfig
}

impl<'s, T: Transport> Repository<'s, T> {
    /// Repository of `entity_type` with default configuration.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaLookup`] when `entity_type` is not in `schema`.
    pub fn new(transport: T, schema: &'s Schema, entity_type: impl Into<String>) -> Result<Self> {
        let entity_type = entity_type.into();
        let definition = schema.definition_by_type(&entity_type)?;
        Ok(Self {
            transport,
            schema,
            definition,
            entity_type,
            config: OrmConfig::default()
        })
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when a limit is out of range.
    pub fn with_config(mut self, config: OrmConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Entity type served by this repository.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Definition of the served entity type.
    pub const fn definition(&self) -> &'s EntityDefinition {
        self.definition
    }

    /// Active configuration.
    pub const fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// Borrow the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn selection(&self, options: &FindOptions) -> Result<SelectionSet> {
        QueryBuilder::with_config(self.schema, &self.config).build(
            &self.entity_type,
            &options.populate,
            &options.extensions
        )
    }

    async fn execute(&self, operation: &'static str, query: String, variables: Value) -> Result<Value> {
        debug!(operation, entity = %self.entity_type, "executing operation");
        let response = self.transport.execute(&query, variables).await?;
        response.into_data().inspect_err(|e| {
            warn!(operation, entity = %self.entity_type, error = %e, "operation failed");
        })
    }

    async fn mutate(&self, operation: &'static str, root: &str, query: String, variables: Value) -> Result<Value> {
        let mut data = self.execute(operation, query, variables).await?;
        let payload = data
            .get_mut(root)
            .map(Value::take)
            .filter(|p| !p.is_null())
            .ok_or_else(|| Error::MalformedResponse(format!("missing `{root}` payload")))?;
        if let Some(errors) = UserErrors::from_payload(&payload) {
            warn!(operation, entity = %self.entity_type, errors = errors.errors().len(), "mutation rejected");
            return Err(errors.into());
        }
        Ok(payload)
    }

    fn not_found(&self, lookup: impl Into<String>) -> Error {
        Error::NotFound {
            entity: self.entity_type.clone(),
            lookup: lookup.into()
        }
    }

    /// Record with `id`, or `None`.
    pub async fn find_by_id(&self, id: &str, options: &FindOptions) -> Result<Option<Record>> {
        let query = documents::find_by_id(&self.selection(options)?);
        let id = normalize_metaobject_id(id);
        let data = self.execute("find_by_id", query, json!({ "id": id })).await?;
        optional_record(&data, documents::BY_ID_ROOT)
    }

    /// Record with `id`, or [`Error::NotFound`].
    pub async fn find_by_id_or_fail(&self, id: &str, options: &FindOptions) -> Result<Record> {
        self.find_by_id(id, options)
            .await?
            .ok_or_else(|| self.not_found(normalize_metaobject_id(id)))
    }

    /// Record with `handle`, or `None`.
    pub async fn find_by_handle(&self, handle: &str, options: &FindOptions) -> Result<Option<Record>> {
        let query = documents::find_by_handle(&self.selection(options)?);
        let variables = json!({ "handle": { "type": self.entity_type, "handle": handle } });
        let data = self.execute("find_by_handle", query, variables).await?;
        optional_record(&data, documents::BY_HANDLE_ROOT)
    }

    /// Record with `handle`, or [`Error::NotFound`].
    pub async fn find_by_handle_or_fail(&self, handle: &str, options: &FindOptions) -> Result<Record> {
        self.find_by_handle(handle, options)
            .await?
            .ok_or_else(|| self.not_found(handle))
    }

    /// Up to `find_all_limit` records, without pagination.
    pub async fn find_all(&self, options: &FindOptions) -> Result<Vec<Record>> {
        let params = FindParams::new().first(self.config.find_all_limit);
        Ok(self.find(&params, options).await?.nodes)
    }

    /// One page of records.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPagination`] when forward and backward arguments are
    /// combined, before anything is sent.
    pub async fn find(&self, params: &FindParams, options: &FindOptions) -> Result<Connection<Record>> {
        let page = PageRequest::from_params(params, self.config.default_page_size)?;
        let query = documents::list(&self.selection(options)?);
        let mut variables = page.variables();
        variables.insert("type".into(), Value::String(self.entity_type.clone()));
        if let Some(sort_key) = &params.sort_key {
            variables.insert("sortKey".into(), Value::String(sort_key.clone()));
        }
        if let Some(reverse) = params.reverse {
            variables.insert("reverse".into(), Value::Bool(reverse));
        }
        if let Some(filter) = &params.query {
            variables.insert("query".into(), Value::String(filter.clone()));
        }

        let data = self.execute("find", query, Value::Object(variables)).await?;
        let connection = data
            .get(documents::LIST_ROOT)
            .ok_or_else(|| Error::MalformedResponse(format!("missing `{}`", documents::LIST_ROOT)))?;
        let nodes = connection
            .get("nodes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(deserialize_record)
            .collect::<Result<Vec<_>>>()?;
        let page_info: PageInfo = connection
            .get("pageInfo")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();
        Ok(Connection {
            nodes,
            page_info
        })
    }

    /// Create one record.
    pub async fn create(&self, input: &RecordInput, options: &FindOptions) -> Result<Record> {
        let query = documents::create(&self.selection(options)?);
        let variables = json!({ "metaobject": input.to_wire(self.definition, true, true)? });
        let payload = self
            .mutate("create", documents::CREATE_ROOT, query, variables)
            .await?;
        payload_record(&payload)
    }

    /// Create up to `create_many_limit` records concurrently.
    ///
    /// Every create runs to completion; only then are failures inspected.
    ///
    /// # Errors
    ///
    /// - [`Error::BatchTooLarge`] before anything is sent
    /// - [`Error::Batch`] listing every failed member once all have settled
    pub async fn create_many(&self, inputs: &[RecordInput], options: &FindOptions) -> Result<Vec<Record>> {
        if inputs.len() > self.config.create_many_limit {
            return Err(Error::BatchTooLarge {
                len: inputs.len(),
                max: self.config.create_many_limit
            });
        }
        debug!(entity = %self.entity_type, count = inputs.len(), "creating batch");
        let settled = join_all(inputs.iter().map(|input| self.create(input, options))).await;

        let total = settled.len();
        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (index, result) in settled.into_iter().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(error) => failures.push(BatchFailure {
                    index,
                    error
                })
            }
        }
        if failures.is_empty() {
            Ok(records)
        } else {
            warn!(entity = %self.entity_type, failed = failures.len(), total, "batch create partially failed");
            Err(Error::Batch {
                total,
                failures
            })
        }
    }

    /// Update the record with `id`.
    pub async fn update(&self, id: &str, input: &RecordInput, options: &FindOptions) -> Result<Record> {
        let query = documents::update(&self.selection(options)?);
        let variables = json!({
            "id": normalize_metaobject_id(id),
            "metaobject": input.to_wire(self.definition, false, true)?
        });
        let payload = self
            .mutate("update", documents::UPDATE_ROOT, query, variables)
            .await?;
        payload_record(&payload)
    }

    /// Create or update the record with `handle`.
    pub async fn upsert(&self, handle: &str, input: &RecordInput, options: &FindOptions) -> Result<Record> {
        let query = documents::upsert(&self.selection(options)?);
        let variables = json!({
            "handle": { "type": self.entity_type, "handle": handle },
            "metaobject": input.to_wire(self.definition, false, false)?
        });
        let payload = self
            .mutate("upsert", documents::UPSERT_ROOT, query, variables)
            .await?;
        payload_record(&payload)
    }

    /// Delete the record with `id`, returning the deleted id.
    pub async fn delete(&self, id: &str) -> Result<String> {
        let variables = json!({ "id": normalize_metaobject_id(id) });
        let payload = self
            .mutate("delete", documents::DELETE_ROOT, documents::delete(), variables)
            .await?;
        payload
            .get("deletedId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse("missing `deletedId`".into()))
    }

    /// Delete the records with `ids` in the background.
    pub async fn bulk_delete<I, S>(&self, ids: I) -> Result<Job>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| normalize_metaobject_id(id.as_ref()))
            .collect();
        self.bulk(json!({ "ids": ids })).await
    }

    /// Delete every record of the served type in the background.
    pub async fn bulk_delete_all(&self) -> Result<Job> {
        self.bulk(json!({ "type": self.entity_type })).await
    }

    async fn bulk(&self, condition: Value) -> Result<Job> {
        let payload = self
            .mutate(
                "bulk_delete",
                documents::BULK_DELETE_ROOT,
                documents::bulk_delete(),
                json!({ "where": condition })
            )
            .await?;
        let job = payload
            .get("job")
            .filter(|j| !j.is_null())
            .cloned()
            .ok_or_else(|| Error::MalformedResponse("missing `job`".into()))?;
        Ok(serde_json::from_value(job)?)
    }
}

fn optional_record(data: &Value, root: &str) -> Result<Option<Record>> {
    match data.get(root) {
        None | Some(Value::Null) => Ok(None),
        Some(node) => deserialize_record(node).map(Some)
    }
}

fn payload_record(payload: &Value) -> Result<Record> {
    let node = payload
        .get("metaobject")
        .filter(|n| !n.is_null())
        .ok_or_else(|| Error::MalformedResponse("mutation returned no metaobject".into()))?;
    deserialize_record(node)
}
