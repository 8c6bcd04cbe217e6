// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Transport seam.
//!
//! The crate never opens sockets or handles authentication. A [`Transport`]
//! executes one GraphQL document with variables and returns the parsed
//! response; timeouts, retries and rate limiting belong to the implementor.
//!
//! # Example
//!
//! ```rust,ignore
//! use metaobject_core::prelude::*;
//!
//! struct HttpTransport { client: reqwest::Client, endpoint: String }
//!
//! #[async_trait]
//! impl Transport for HttpTransport {
//!     async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
//!         let body = serde_json::json!({ "query": query, "variables": variables });
//!         let response = self.client.post(&self.endpoint).json(&body).send().await
//!             .map_err(TransportError::new)?;
//!         response.json().await.map_err(TransportError::new)
//!     }
//! }
//! ```

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Executes GraphQL documents against the platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `query` with `variables`.
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
        (**self).execute(query, variables).await
    }
}

/// Parsed GraphQL response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// `data` member.
    #[serde(default)]
    pub data:   Option<Value>,
    /// Top-level `errors` member.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>
}

impl GraphQlResponse {
    /// Successful response carrying `data`.
    pub fn data(data: Value) -> Self {
        Self {
            data:   Some(data),
            errors: Vec::new()
        }
    }

    /// The `data` member, or the top-level errors as [`Error::GraphQl`].
    ///
    /// # Errors
    ///
    /// - [`Error::GraphQl`] when `errors` is non-empty
    /// - [`Error::MalformedResponse`] when `data` is missing
    pub fn into_data(self) -> Result<Value, Error> {
        if !self.errors.is_empty() {
            return Err(Error::GraphQl(self.errors));
        }
        self.data
            .filter(|d| !d.is_null())
            .ok_or_else(|| Error::MalformedResponse("response without `data`".into()))
    }
}

/// Entry of the top-level `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Error message.
    pub message:    String,
    /// Response path of the failing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path:       Option<Vec<Value>>,
    /// Vendor extensions (error codes, cost information).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>
}

/// Failure of the transport itself (network, HTTP status, decoding).
#[derive(Debug)]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    /// Wrap any error.
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(error.into())
    }

    /// Borrow the wrapped error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}
