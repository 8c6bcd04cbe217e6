// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Identifier normalization.
//!
//! Write and delete operations accept raw ids (`"123"`) as well as
//! fully-qualified ones (`"gid://shopify/Metaobject/123"`). Normalization is
//! idempotent.

/// Prefix shared by all platform identifiers.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Resource name of metaobjects.
pub const METAOBJECT_RESOURCE: &str = "Metaobject";

/// Resource name of metaobject definitions.
pub const DEFINITION_RESOURCE: &str = "MetaobjectDefinition";

/// Resource name of background jobs.
pub const JOB_RESOURCE: &str = "Job";

/// Qualify `id` with `resource` unless it already is a platform id.
pub fn normalize(resource: &str, id: &str) -> String {
    if id.starts_with(GID_PREFIX) {
        id.to_string()
    } else {
        format!("{GID_PREFIX}{resource}/{id}")
    }
}

/// Qualify a metaobject id.
pub fn normalize_metaobject_id(id: &str) -> String {
    normalize(METAOBJECT_RESOURCE, id)
}

/// Qualify a metaobject definition id.
pub fn normalize_definition_id(id: &str) -> String {
    normalize(DEFINITION_RESOURCE, id)
}

/// Raw numeric part of a qualified id (`.../Metaobject/123` -> `123`).
pub fn raw_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn qualifies_raw_ids() {
        assert_eq!(normalize_metaobject_id("123"), "gid://shopify/Metaobject/123");
        assert_eq!(
            normalize_definition_id("9"),
            "gid://shopify/MetaobjectDefinition/9"
        );
    }

    #[test]
    fn keeps_qualified_ids() {
        let id = "gid://shopify/Metaobject/123";
        assert_eq!(normalize_metaobject_id(id), id);
    }

    #[test]
    fn extracts_raw_part() {
        assert_eq!(raw_id("gid://shopify/Metaobject/123"), "123");
        assert_eq!(raw_id("123"), "123");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(id in "[a-zA-Z0-9/:]{0,24}") {
            let once = normalize_metaobject_id(&id);
            prop_assert_eq!(normalize_metaobject_id(&once), once.clone());
            prop_assert!(once.starts_with(GID_PREFIX));
        }
    }
}
