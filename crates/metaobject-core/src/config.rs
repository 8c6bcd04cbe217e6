// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime limits shared by the query builder and repositories.
//!
//! Every limit is an explicit value on [`OrmConfig`]; the `DEFAULT_*`
//! constants are the platform defaults used when nothing is configured.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{Error, Result};

/// Page size of list-reference connections inside nested selections.
pub const DEFAULT_REFERENCE_PAGE_SIZE: u32 = 50;

/// `first` used by `find` when no pagination is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound for `find_all`.
pub const DEFAULT_FIND_ALL_LIMIT: u32 = 250;

/// Upper bound for `create_many`.
pub const DEFAULT_CREATE_MANY_LIMIT: usize = 25;

/// Depth bound for eager populate path enumeration.
pub const DEFAULT_MAX_POPULATE_DEPTH: usize = 3;

/// Largest page the platform accepts for any connection.
pub const PLATFORM_MAX_PAGE_SIZE: u32 = 250;

/// Limits applied to queries and batch operations.
///
/// # Example
///
/// ```rust
/// use metaobject_core::OrmConfig;
///
/// let config = OrmConfig::new().with_reference_page_size(25);
/// assert_eq!(config.reference_page_size, 25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrmConfig {
    /// Page size for `references(first: N)` in nested selections.
    pub reference_page_size: u32,
    /// Default `first` for cursor pagination.
    pub default_page_size:   u32,
    /// Maximum records returned by `find_all`.
    pub find_all_limit:      u32,
    /// Maximum records accepted by `create_many`.
    pub create_many_limit:   usize,
    /// Maximum segments when enumerating populate paths.
    pub max_populate_depth:  usize
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            reference_page_size: DEFAULT_REFERENCE_PAGE_SIZE,
            default_page_size:   DEFAULT_PAGE_SIZE,
            find_all_limit:      DEFAULT_FIND_ALL_LIMIT,
            create_many_limit:   DEFAULT_CREATE_MANY_LIMIT,
            max_populate_depth:  DEFAULT_MAX_POPULATE_DEPTH
        }
    }
}

impl OrmConfig {
    /// Create a configuration with platform defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nested list-reference page size.
    #[must_use]
    pub fn with_reference_page_size(mut self, size: u32) -> Self {
        trace!(reference_page_size = size, "setting reference page size");
        self.reference_page_size = size;
        self
    }

    /// Set the default page size for `find`.
    #[must_use]
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        trace!(default_page_size = size, "setting default page size");
        self.default_page_size = size;
        self
    }

    /// Set the `find_all` limit.
    #[must_use]
    pub fn with_find_all_limit(mut self, limit: u32) -> Self {
        trace!(find_all_limit = limit, "setting find_all limit");
        self.find_all_limit = limit;
        self
    }

    /// Set the `create_many` batch limit.
    #[must_use]
    pub fn with_create_many_limit(mut self, limit: usize) -> Self {
        trace!(create_many_limit = limit, "setting create_many limit");
        self.create_many_limit = limit;
        self
    }

    /// Set the depth bound for populate path enumeration.
    #[must_use]
    pub fn with_max_populate_depth(mut self, depth: usize) -> Self {
        trace!(max_populate_depth = depth, "setting max populate depth");
        self.max_populate_depth = depth;
        self
    }

    /// Check every limit is within what the platform accepts.
    pub fn validate(&self) -> Result<()> {
        let pages = [
            ("reference_page_size", self.reference_page_size),
            ("default_page_size", self.default_page_size),
            ("find_all_limit", self.find_all_limit)
        ];
        for (name, value) in pages {
            if value == 0 || value > PLATFORM_MAX_PAGE_SIZE {
                warn!(setting = name, value, "configuration out of range");
                return Err(Error::Config(format!(
                    "{name} must be between 1 and {PLATFORM_MAX_PAGE_SIZE}, got {value}"
                )));
            }
        }
        if self.create_many_limit == 0 {
            return Err(Error::Config("create_many_limit must be greater than 0".into()));
        }
        if self.max_populate_depth == 0 {
            return Err(Error::Config("max_populate_depth must be greater than 0".into()));
        }
        Ok(())
    }
}
