// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cursor pagination.
//!
//! A page is read either forward (`first` / `after`) or backward (`last` /
//! `before`), never both. [`PageRequest`] makes the mix unrepresentable;
//! [`FindParams`] carries raw arguments and is validated into one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    config::PLATFORM_MAX_PAGE_SIZE,
    error::{Error, Result}
};

/// Raw listing arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindParams {
    /// Forward page size.
    pub first:    Option<u32>,
    /// Forward cursor.
    pub after:    Option<String>,
    /// Backward page size.
    pub last:     Option<u32>,
    /// Backward cursor.
    pub before:   Option<String>,
    /// Platform sort key (`id`, `type`, `updated_at`, `display_name`).
    pub sort_key: Option<String>,
    /// Reverse the sort order.
    pub reverse:  Option<bool>,
    /// Platform search query.
    pub query:    Option<String>
}

impl FindParams {
    /// No arguments: the first page with the default size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `first`.
    #[must_use]
    pub fn first(mut self, first: u32) -> Self {
        self.first = Some(first);
        self
    }

    /// Set `after`.
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Set `last`.
    #[must_use]
    pub fn last(mut self, last: u32) -> Self {
        self.last = Some(last);
        self
    }

    /// Set `before`.
    #[must_use]
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Set the sort key.
    #[must_use]
    pub fn sort_key(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    /// Set the sort direction.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    /// Set the search query.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Validated page direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// `first` records after `after`.
    Forward {
        /// Page size.
        first: u32,
        /// Exclusive start cursor.
        after: Option<String>
    },
    /// `last` records before `before`.
    Backward {
        /// Page size.
        last:   u32,
        /// Exclusive end cursor.
        before: Option<String>
    }
}

impl PageRequest {
    /// Validate raw arguments, defaulting to `first = default_first`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPagination`] when forward and backward arguments are
    /// both present or a page size is outside `1..=250`.
    pub fn from_params(params: &FindParams, default_first: u32) -> Result<Self> {
        let forward = params.first.is_some() || params.after.is_some();
        let backward = params.last.is_some() || params.before.is_some();
        let page = match (forward, backward) {
            (true, true) => {
                return Err(Error::InvalidPagination(
                    "forward (first/after) and backward (last/before) arguments are mutually exclusive"
                ));
            }
            (false, true) => Self::Backward {
                last:   params.last.unwrap_or(default_first),
                before: params.before.clone()
            },
            _ => Self::Forward {
                first: params.first.unwrap_or(default_first),
                after: params.after.clone()
            }
        };
        if !(1..=PLATFORM_MAX_PAGE_SIZE).contains(&page.size()) {
            return Err(Error::InvalidPagination("page size must be between 1 and 250"));
        }
        Ok(page)
    }

    /// Requested page size.
    pub const fn size(&self) -> u32 {
        match self {
            Self::Forward {
                first, ..
            } => *first,
            Self::Backward {
                last, ..
            } => *last
        }
    }

    /// Variables of this direction only.
    pub fn variables(&self) -> Map<String, Value> {
        let mut vars = Map::new();
        match self {
            Self::Forward {
                first,
                after
            } => {
                vars.insert("first".into(), Value::from(*first));
                if let Some(after) = after {
                    vars.insert("after".into(), Value::String(after.clone()));
                }
            }
            Self::Backward {
                last,
                before
            } => {
                vars.insert("last".into(), Value::from(*last));
                if let Some(before) = before {
                    vars.insert("before".into(), Value::String(before.clone()));
                }
            }
        }
        vars
    }
}

/// Cursor position of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    /// More records follow.
    pub has_next_page:     bool,
    /// More records precede.
    pub has_previous_page: bool,
    /// Cursor of the first node.
    pub start_cursor:      Option<String>,
    /// Cursor of the last node.
    pub end_cursor:        Option<String>
}

/// One page of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<N> {
    /// Nodes of the page.
    pub nodes:     Vec<N>,
    /// Cursor position.
    pub page_info: PageInfo
}
