// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types for metaobject operations.
//!
//! Local validation failures (schema lookups, populate paths, pagination) are
//! raised before any transport call. Remote failures always keep the original
//! structured payload.
//!
//! # Taxonomy
//!
//! | Variant | Raised by | Retry |
//! |---------|-----------|-------|
//! | [`Error::SchemaLookup`] | schema model | never |
//! | [`Error::InvalidPopulatePath`] | query builder | never |
//! | [`Error::CircularDependency`] | definition manager | never |
//! | [`Error::UserErrors`] | mutations | after fixing input |
//! | [`Error::NotFound`] | `*_or_fail` lookups | no |
//! | [`Error::DefinitionTaken`] | definition creation | tolerated in bulk |

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::{GraphQlError, TransportError};

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for all metaobject operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity type or field is not declared in the schema.
    #[error("schema lookup failed: {subject} `{name}` is not defined")]
    SchemaLookup {
        /// What was looked up (`entity type`, `field`, `reference target`).
        subject: &'static str,
        /// The missing name.
        name:    String
    },

    /// Two definitions share the same type identifier.
    #[error("entity type `{0}` is defined more than once")]
    DuplicateType(String),

    /// Requested populate path does not follow reference fields.
    #[error("invalid populate path `{path}` on `{entity}`: {reason}")]
    InvalidPopulatePath {
        /// Root entity type of the request.
        entity: String,
        /// The rejected path.
        path:   String,
        /// Why the path was rejected.
        reason: String
    },

    /// Definitions to create reference each other in a cycle.
    #[error("circular dependency between definitions: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// Mutation returned field-level validation errors.
    #[error(transparent)]
    UserErrors(#[from] UserErrors),

    /// Lookup found nothing.
    #[error("{entity} not found: {lookup}")]
    NotFound {
        /// Entity type that was queried.
        entity: String,
        /// Identifier or handle used for the lookup.
        lookup: String
    },

    /// Remote definition already exists for this type.
    #[error("metaobject definition `{0}` already exists")]
    DefinitionTaken(String),

    /// Pagination arguments are contradictory.
    #[error("invalid pagination: {0}")]
    InvalidPagination(&'static str),

    /// Batch exceeds the configured maximum.
    #[error("batch of {len} exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Requested batch size.
        len: usize,
        /// Configured maximum.
        max: usize
    },

    /// Some members of a settled batch failed.
    #[error(
        "{} of {total} batch operations failed; first: {}",
        .failures.len(),
        .failures.first().map(|f| f.error.to_string()).unwrap_or_default()
    )]
    Batch {
        /// Number of operations in the batch.
        total:    usize,
        /// Failed members, in input order.
        failures: Vec<BatchFailure>
    },

    /// Top-level GraphQL `errors` array.
    #[error("graphql request failed: {}", .0.first().map(|e| e.message.as_str()).unwrap_or("unknown error"))]
    GraphQl(Vec<GraphQlError>),

    /// Transport collaborator failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Record could not be decoded into a typed value.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Declarative schema source could not be parsed.
    #[error("schema source error: {0}")]
    SchemaSource(#[from] toml::de::Error),

    /// Configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String)
}

impl Error {
    /// Shorthand for a missing entity type.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::SchemaLookup {
            subject: "entity type",
            name:    name.into()
        }
    }

    /// Check if this is a not-found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a definition-taken error.
    pub const fn is_definition_taken(&self) -> bool {
        matches!(self, Self::DefinitionTaken(_))
    }

    /// Check if this carries remote user errors.
    pub const fn is_user_errors(&self) -> bool {
        matches!(self, Self::UserErrors(_))
    }

    /// Check if this error was raised before any network call.
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::SchemaLookup { .. }
                | Self::DuplicateType(_)
                | Self::InvalidPopulatePath { .. }
                | Self::CircularDependency(_)
                | Self::InvalidPagination(_)
                | Self::BatchTooLarge { .. }
                | Self::Config(_)
        )
    }
}

/// One failed member of a settled batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the member in the submitted batch.
    pub index: usize,
    /// The member's error.
    pub error: Error
}

/// Field-level error reported by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field.
    #[serde(default)]
    pub field:   Option<Vec<String>>,
    /// Human readable message.
    pub message: String,
    /// Machine readable code (e.g. `TAKEN`).
    #[serde(default)]
    pub code:    Option<String>
}

/// Non-empty list of [`UserError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserErrors {
    errors: Vec<UserError>
}

impl UserErrors {
    /// Wrap a list of errors; returns `None` when the list is empty.
    pub fn new(errors: Vec<UserError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self {
                errors
            })
        }
    }

    /// Errors of a mutation payload's `userErrors` member, if any.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let errors = payload
            .get("userErrors")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self::new(errors)
    }

    /// The first error, surfaced in `Display`.
    pub fn first(&self) -> &UserError {
        &self.errors[0]
    }

    /// All errors in the order the platform reported them.
    pub fn errors(&self) -> &[UserError] {
        &self.errors
    }

    /// Check if any error carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code.as_deref() == Some(code))
    }
}

impl fmt::Display for UserErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.first();
        match &first.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), first.message)?,
            _ => write!(f, "{}", first.message)?
        }
        if self.errors.len() > 1 {
            write!(f, " (and {} more)", self.errors.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for UserErrors {}

/// Error decoding a record or field value into a typed Rust value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Required field has no value.
    #[error("missing required field `{0}`")]
    Missing(String),

    /// Value has a different kind than the target type.
    #[error("field `{field}`: expected {expected}, found {found}")]
    Mismatch {
        /// Field key (camel-cased).
        field:    String,
        /// Expected kind.
        expected: &'static str,
        /// Kind actually found.
        found:    &'static str
    },

    /// Embedded JSON did not match the expected structure.
    #[error("field `{field}`: {message}")]
    Json {
        /// Field key (camel-cased).
        field:   String,
        /// Parser message.
        message: String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_error(message: &str, code: Option<&str>) -> UserError {
        UserError {
            field:   Some(vec!["metaobject".into(), "fields".into()]),
            message: message.into(),
            code:    code.map(Into::into)
        }
    }

    #[test]
    fn user_errors_requires_entries() {
        assert!(UserErrors::new(vec![]).is_none());
    }

    #[test]
    fn user_errors_display_surfaces_first() {
        let errors = UserErrors::new(vec![
            user_error("Value is too long", Some("TOO_LONG")),
            user_error("Handle taken", Some("TAKEN")),
        ])
        .unwrap();
        assert_eq!(
            errors.to_string(),
            "metaobject.fields: Value is too long (and 1 more)"
        );
        assert!(errors.has_code("TAKEN"));
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn error_predicates() {
        let not_found = Error::NotFound {
            entity: "baz".into(),
            lookup: "gid://shopify/Metaobject/1".into()
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_local());
        assert!(Error::DefinitionTaken("baz".into()).is_definition_taken());
        assert!(Error::unknown_type("nope").is_local());
        assert!(Error::InvalidPagination("both directions").is_local());
    }

    #[test]
    fn circular_dependency_lists_types() {
        let err = Error::CircularDependency(vec!["a".into(), "b".into()]);
        assert_eq!(
            err.to_string(),
            "circular dependency between definitions: a, b"
        );
    }
}
