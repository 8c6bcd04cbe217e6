// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Scripted transport for tests.
//!
//! Enabled with the `testing` feature. Every call is recorded; responses come
//! from a responder closure that sees the query and variables.
//!
//! ```rust,ignore
//! let transport = MockTransport::new(|query, _vars| {
//!     if query.contains("metaobjectByHandle") {
//!         Ok(GraphQlResponse::data(json!({ "metaobjectByHandle": null })))
//!     } else {
//!         Err(TransportError::new("unexpected query"))
//!     }
//! });
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{GraphQlResponse, Transport, TransportError};

type Responder =
    Box<dyn Fn(&str, &Value) -> Result<GraphQlResponse, TransportError> + Send + Sync>;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// GraphQL document.
    pub query:     String,
    /// Variables.
    pub variables: Value
}

/// Transport answering from a closure and recording every call.
pub struct MockTransport {
    responder: Responder,
    calls:     Mutex<Vec<RecordedCall>>
}

impl MockTransport {
    /// Transport answering with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<GraphQlResponse, TransportError> + Send + Sync + 'static
    {
        Self {
            responder: Box::new(responder),
            calls:     Mutex::new(Vec::new())
        }
    }

    /// Transport answering every call with the same `data`.
    pub fn with_data(data: Value) -> Self {
        Self::new(move |_, _| Ok(GraphQlResponse::data(data.clone())))
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }

    /// Last recorded call.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls().pop()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
        let response = (self.responder)(query, &variables);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                query: query.to_string(),
                variables
            });
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn records_calls() {
        let transport = MockTransport::with_data(json!({"ok": true}));
        let response = transport.execute("query { ok }", json!({"a": 1})).await.unwrap();
        assert_eq!(response.data, Some(json!({"ok": true})));
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.last_call().unwrap().variables, json!({"a": 1}));
    }
}
