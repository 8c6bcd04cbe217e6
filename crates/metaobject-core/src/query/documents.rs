// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Operation documents.
//!
//! Each function wraps a record selection into a complete query or mutation
//! and names the root field the response is read from.

use super::{SelectionSet, defaults};

/// Root field of `metaobject(id:)`.
pub const BY_ID_ROOT: &str = "metaobject";
/// Root field of `metaobjectByHandle(handle:)`.
pub const BY_HANDLE_ROOT: &str = "metaobjectByHandle";
/// Root field of `metaobjects(...)`.
pub const LIST_ROOT: &str = "metaobjects";
/// Root field of `metaobjectCreate`.
pub const CREATE_ROOT: &str = "metaobjectCreate";
/// Root field of `metaobjectUpdate`.
pub const UPDATE_ROOT: &str = "metaobjectUpdate";
/// Root field of `metaobjectUpsert`.
pub const UPSERT_ROOT: &str = "metaobjectUpsert";
/// Root field of `metaobjectDelete`.
pub const DELETE_ROOT: &str = "metaobjectDelete";
/// Root field of `metaobjectBulkDelete`.
pub const BULK_DELETE_ROOT: &str = "metaobjectBulkDelete";
/// Root field of `metaobjectDefinitionByType`.
pub const DEFINITION_BY_TYPE_ROOT: &str = "metaobjectDefinitionByType";
/// Root field of `metaobjectDefinitionCreate`.
pub const DEFINITION_CREATE_ROOT: &str = "metaobjectDefinitionCreate";

/// Lookup by id.
pub fn find_by_id(record: &SelectionSet) -> String {
    format!("query MetaobjectById($id: ID!) {{ {BY_ID_ROOT}(id: $id) {record} }}")
}

/// Lookup by `{ type, handle }`.
pub fn find_by_handle(record: &SelectionSet) -> String {
    format!(
        "query MetaobjectByHandle($handle: MetaobjectHandleInput!) {{ {BY_HANDLE_ROOT}(handle: $handle) {record} }}"
    )
}

/// Connection over all records of a type.
pub fn list(record: &SelectionSet) -> String {
    format!(
        "query Metaobjects($type: String!, $first: Int, $after: String, $last: Int, $before: String, \
         $sortKey: String, $reverse: Boolean, $query: String) {{ \
         {LIST_ROOT}(type: $type, first: $first, after: $after, last: $last, before: $before, \
         sortKey: $sortKey, reverse: $reverse, query: $query) {{ nodes {record} {} }} }}",
        defaults::page_info()
    )
}

fn mutation(name: &str, params: &str, root: &str, args: &str, payload: &str) -> String {
    format!(
        "mutation {name}({params}) {{ {root}({args}) {{ {payload} {} }} }}",
        defaults::user_errors()
    )
}

/// Create one record.
pub fn create(record: &SelectionSet) -> String {
    mutation(
        "MetaobjectCreate",
        "$metaobject: MetaobjectCreateInput!",
        CREATE_ROOT,
        "metaobject: $metaobject",
        &format!("metaobject {record}")
    )
}

/// Update one record by id.
pub fn update(record: &SelectionSet) -> String {
    mutation(
        "MetaobjectUpdate",
        "$id: ID!, $metaobject: MetaobjectUpdateInput!",
        UPDATE_ROOT,
        "id: $id, metaobject: $metaobject",
        &format!("metaobject {record}")
    )
}

/// Create or update one record by handle.
pub fn upsert(record: &SelectionSet) -> String {
    mutation(
        "MetaobjectUpsert",
        "$handle: MetaobjectHandleInput!, $metaobject: MetaobjectUpsertInput!",
        UPSERT_ROOT,
        "handle: $handle, metaobject: $metaobject",
        &format!("metaobject {record}")
    )
}

/// Delete one record by id.
pub fn delete() -> String {
    mutation("MetaobjectDelete", "$id: ID!", DELETE_ROOT, "id: $id", "deletedId")
}

/// Delete records asynchronously.
pub fn bulk_delete() -> String {
    mutation(
        "MetaobjectBulkDelete",
        "$where: MetaobjectBulkDeleteWhereCondition!",
        BULK_DELETE_ROOT,
        "where: $where",
        "job { id done }"
    )
}

/// Existing definition id of a type.
pub fn definition_by_type() -> String {
    format!("query DefinitionByType($type: String!) {{ {DEFINITION_BY_TYPE_ROOT}(type: $type) {{ id type }} }}")
}

/// Create one definition.
pub fn create_definition() -> String {
    mutation(
        "MetaobjectDefinitionCreate",
        "$definition: MetaobjectDefinitionCreateInput!",
        DEFINITION_CREATE_ROOT,
        "definition: $definition",
        "metaobjectDefinition { id type }"
    )
}
