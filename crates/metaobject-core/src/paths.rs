// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Populate path derivation.
//!
//! A populate path is a dot-separated chain of camel-cased reference field
//! keys (`"storeType.another"`). Schemas may be cyclic, so two strategies are
//! offered:
//!
//! - [`validate_populate_path`] checks one path lazily, in time proportional
//!   to its length. It terminates on any schema.
//! - [`valid_populate_paths`] enumerates every path eagerly and therefore
//!   requires an explicit depth bound.
//!
//! The query builder validates with [`validate_populate_set`] under the same
//! depth bound, so a path is accepted at runtime exactly when enumeration
//! with that bound lists it.
//!
//! # Prefix partitioning
//!
//! ```text
//! requested = {"icon", "storeType", "storeType.another"}
//! partition("storeType") = Some({"another"})
//! partition("icon")      = Some({})          // terminal population
//! partition("owner")     = None              // not populated
//! ```

use std::collections::BTreeSet;

use crate::{
    error::{Error, Result},
    schema::{FieldDefinition, Schema}
};

/// Segment separator.
pub const PATH_SEPARATOR: char = '.';

/// Sorted, deduplicated set of populate paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PopulateSet {
    paths: BTreeSet<String>
}

impl PopulateSet {
    /// Empty set: nothing is populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the exact path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Add a path.
    pub fn insert(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Nested request set for field `key`.
    ///
    /// Returns `None` when `key` is neither requested nor a prefix of a
    /// requested path. An exact match contributes no remainder.
    pub fn partition(&self, key: &str) -> Option<Self> {
        let mut matched = false;
        let mut rest = BTreeSet::new();
        for path in &self.paths {
            if path == key {
                matched = true;
            } else if let Some(tail) = path
                .strip_prefix(key)
                .and_then(|t| t.strip_prefix(PATH_SEPARATOR))
            {
                matched = true;
                rest.insert(tail.to_string());
            }
        }
        matched.then_some(Self {
            paths: rest
        })
    }

    /// Stable cache key: the sorted paths.
    pub fn cache_key(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PopulateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect()
        }
    }
}

impl<'a> IntoIterator for &'a PopulateSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Check a single path against the schema.
///
/// Every segment must name a reference field on the entity reached so far;
/// every non-terminal segment must additionally point at entity types of the
/// schema. For mixed references a segment is accepted when at least one
/// target declares it.
///
/// # Errors
///
/// - [`Error::SchemaLookup`] when `entity_type` itself is unknown
/// - [`Error::InvalidPopulatePath`] otherwise
pub fn validate_populate_path(schema: &Schema, entity_type: &str, path: &str) -> Result<()> {
    schema.definition_by_type(entity_type)?;
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid(entity_type, path, "path contains an empty segment".into()));
    }
    walk(schema, entity_type, &segments).map_err(|reason| invalid(entity_type, path, reason))
}

/// Validate every path of a set, rejecting paths of more than `max_depth`
/// segments.
///
/// # Errors
///
/// As [`validate_populate_path`], plus [`Error::InvalidPopulatePath`] for a
/// path deeper than `max_depth`.
pub fn validate_populate_set(
    schema: &Schema,
    entity_type: &str,
    paths: &PopulateSet,
    max_depth: usize
) -> Result<()> {
    paths.iter().try_for_each(|path| {
        let depth = path.split(PATH_SEPARATOR).count();
        if depth > max_depth {
            schema.definition_by_type(entity_type)?;
            return Err(invalid(
                entity_type,
                path,
                format!("path has {depth} segments, the limit is {max_depth}")
            ));
        }
        validate_populate_path(schema, entity_type, path)
    })
}

fn walk(schema: &Schema, entity_type: &str, segments: &[&str]) -> std::result::Result<(), String> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    let definition = schema
        .get(entity_type)
        .ok_or_else(|| format!("entity `{entity_type}` is not in the schema"))?;
    let field = definition
        .field_by_camel_key(head)
        .ok_or_else(|| format!("`{head}` is not a field of `{entity_type}`"))?;
    if !field.is_reference() {
        return Err(format!("`{head}` on `{entity_type}` is not a reference field"));
    }
    if rest.is_empty() {
        return Ok(());
    }

    let targets = schema_targets(field)
        .ok_or_else(|| format!("`{head}` on `{entity_type}` has no resolvable target"))?;
    let mut last_error = String::new();
    for target in targets {
        match walk(schema, target, rest) {
            Ok(()) => return Ok(()),
            Err(reason) => last_error = reason
        }
    }
    Err(last_error)
}

/// Target entity types of a metaobject reference field, if declared.
pub(crate) fn schema_targets(field: &FieldDefinition) -> Option<Vec<&str>> {
    if !field.kind().is_metaobject_reference() {
        return None;
    }
    field.target.as_ref().map(|t| t.types())
}

fn invalid(entity_type: &str, path: &str, reason: String) -> Error {
    Error::InvalidPopulatePath {
        entity: entity_type.to_string(),
        path: path.to_string(),
        reason
    }
}

/// Enumerate all populate paths of `entity_type` up to `max_depth` segments.
///
/// The result contains every reference field key and, for reference fields
/// with schema targets, `key.p` for every path `p` of the target, recursively.
///
/// # Errors
///
/// [`Error::SchemaLookup`] when `entity_type` is unknown.
pub fn valid_populate_paths(
    schema: &Schema,
    entity_type: &str,
    max_depth: usize
) -> Result<BTreeSet<String>> {
    schema.definition_by_type(entity_type)?;
    let mut out = BTreeSet::new();
    enumerate(schema, entity_type, "", max_depth, &mut out);
    Ok(out)
}

fn enumerate(
    schema: &Schema,
    entity_type: &str,
    prefix: &str,
    depth: usize,
    out: &mut BTreeSet<String>
) {
    if depth == 0 {
        return;
    }
    let Some(definition) = schema.get(entity_type) else {
        return;
    };
    for field in definition.reference_fields() {
        let path = if prefix.is_empty() {
            field.camel_key().to_string()
        } else {
            format!("{prefix}{PATH_SEPARATOR}{}", field.camel_key())
        };
        if let Some(targets) = schema_targets(field) {
            for target in targets {
                enumerate(schema, target, &path, depth - 1, out);
            }
        }
        out.insert(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        field_type::FieldKind,
        schema::{EntityDefinition, FieldDefinition}
    };

    fn bar_baz() -> Schema {
        Schema::new(vec![
            EntityDefinition::builder("bar")
                .field(FieldDefinition::new("name", FieldKind::SingleLineTextField))
                .build(),
            EntityDefinition::builder("baz")
                .field(FieldDefinition::new("name", FieldKind::SingleLineTextField))
                .field(
                    FieldDefinition::new("generic_obj", FieldKind::MetaobjectReference)
                        .target("bar")
                )
                .build(),
        ])
        .unwrap()
    }

    fn store() -> Schema {
        Schema::new(vec![
            EntityDefinition::builder("another")
                .field(FieldDefinition::new("label", FieldKind::SingleLineTextField))
                .build(),
            EntityDefinition::builder("store_type")
                .field(FieldDefinition::new("another", FieldKind::MetaobjectReference).target("another"))
                .field(FieldDefinition::new("logo", FieldKind::FileReference))
                .build(),
            EntityDefinition::builder("store")
                .field(FieldDefinition::new("icon", FieldKind::FileReference))
                .field(
                    FieldDefinition::new("store_type", FieldKind::MetaobjectReference)
                        .target("store_type")
                )
                .field(FieldDefinition::new("title", FieldKind::SingleLineTextField))
                .build(),
        ])
        .unwrap()
    }

    fn cyclic() -> Schema {
        Schema::new(vec![
            EntityDefinition::builder("author")
                .field(FieldDefinition::new("books", FieldKind::MetaobjectReference).list().target("book"))
                .build(),
            EntityDefinition::builder("book")
                .field(FieldDefinition::new("author", FieldKind::MetaobjectReference).target("author"))
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn scalar_fields_do_not_extend_paths() {
        let paths = valid_populate_paths(&bar_baz(), "baz", 5).unwrap();
        assert_eq!(paths.into_iter().collect::<Vec<_>>(), vec!["genericObj"]);
        assert!(valid_populate_paths(&bar_baz(), "bar", 5).unwrap().is_empty());
    }

    #[test]
    fn nested_paths_follow_targets() {
        let paths = valid_populate_paths(&store(), "store", 3).unwrap();
        let expected: BTreeSet<String> =
            ["icon", "storeType", "storeType.another", "storeType.logo"]
                .into_iter()
                .map(String::from)
                .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn cyclic_enumeration_is_bounded() {
        let paths = valid_populate_paths(&cyclic(), "author", 3).unwrap();
        assert!(paths.contains("books.author.books"));
        assert!(!paths.contains("books.author.books.author"));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn lazy_validation_handles_deep_cycles() {
        let deep = "books.author.books.author.books.author";
        assert!(validate_populate_path(&cyclic(), "author", deep).is_ok());
    }

    #[test]
    fn bounded_validation_rejects_deep_paths() {
        let deep: PopulateSet = ["books.author.books.author"].into_iter().collect();
        let err = validate_populate_set(&cyclic(), "author", &deep, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidPopulatePath { reason, .. } if reason.contains("limit is 3")));
        assert!(validate_populate_set(&cyclic(), "author", &deep, 4).is_ok());
    }

    #[test]
    fn enumeration_matches_bounded_validation() {
        let schema = Schema::new(vec![
            EntityDefinition::builder("a")
                .field(FieldDefinition::new("b", FieldKind::MetaobjectReference).target("b"))
                .build(),
            EntityDefinition::builder("b")
                .field(FieldDefinition::new("c", FieldKind::MetaobjectReference).target("c"))
                .build(),
            EntityDefinition::builder("c")
                .field(FieldDefinition::new("d", FieldKind::MetaobjectReference).target("d"))
                .build(),
            EntityDefinition::builder("d")
                .field(FieldDefinition::new("e", FieldKind::MetaobjectReference).target("e"))
                .build(),
            EntityDefinition::builder("e")
                .field(FieldDefinition::new("title", FieldKind::SingleLineTextField))
                .build(),
        ])
        .unwrap();
        let max_depth = 3;
        let enumerated = valid_populate_paths(&schema, "a", max_depth).unwrap();
        let candidates = ["b", "b.c", "b.c.d", "b.c.d.e", "b.title", "c"];
        let accepted: BTreeSet<String> = candidates
            .into_iter()
            .filter(|path| {
                let set: PopulateSet = [*path].into_iter().collect();
                validate_populate_set(&schema, "a", &set, max_depth).is_ok()
            })
            .map(String::from)
            .collect();
        assert_eq!(accepted, enumerated);
        assert!(!accepted.contains("b.c.d.e"));
    }

    #[test]
    fn enumerated_paths_all_validate() {
        let schema = store();
        for path in valid_populate_paths(&schema, "store", 4).unwrap() {
            assert!(validate_populate_path(&schema, "store", &path).is_ok(), "{path}");
        }
    }

    #[test]
    fn rejects_scalar_prefix() {
        let err = validate_populate_path(&bar_baz(), "baz", "genericObj.name").unwrap_err();
        assert!(matches!(err, Error::InvalidPopulatePath { .. }));
        let err = validate_populate_path(&bar_baz(), "baz", "name").unwrap_err();
        assert!(matches!(err, Error::InvalidPopulatePath { .. }));
    }

    #[test]
    fn rejects_descending_into_foreign_references() {
        let err = validate_populate_path(&store(), "store", "icon.image").unwrap_err();
        assert!(matches!(err, Error::InvalidPopulatePath { reason, .. } if reason.contains("no resolvable target")));
    }

    #[test]
    fn rejects_empty_segments_and_unknown_roots() {
        assert!(validate_populate_path(&store(), "store", "storeType..another").is_err());
        assert!(matches!(
            validate_populate_path(&store(), "nope", "icon"),
            Err(Error::SchemaLookup { .. })
        ));
    }

    #[test]
    fn partition_strips_prefix() {
        let set: PopulateSet = ["icon", "storeType", "storeType.another", "storeTypes.x"]
            .into_iter()
            .collect();
        assert_eq!(
            set.partition("storeType").unwrap().cache_key(),
            vec!["another".to_string()]
        );
        assert!(set.partition("icon").unwrap().is_empty());
        assert!(set.partition("owner").is_none());
        assert!(set.partition("store").is_none());
    }

    #[test]
    fn descendant_implies_ancestor() {
        let set: PopulateSet = ["storeType.another"].into_iter().collect();
        assert!(set.partition("storeType").is_some());
    }
}
