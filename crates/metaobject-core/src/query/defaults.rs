// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Default sub-selections per reference kind.
//!
//! | Kind | Default |
//! |------|---------|
//! | `file_reference` | `id fileStatus alt` + one fragment per allowed file kind |
//! | `metaobject_reference` | `id type handle fields { … }` |
//! | `product_reference` | `id title handle status featuredImage { url altText }` |
//! | `variant_reference` | `id title sku price` |
//! | `collection_reference`, `page_reference` | `id title handle` |
//! | `customer_reference` | `id displayName email` |
//! | `company_reference`, `product_taxonomy_value_reference` | `id name` |

use super::selection::{Selection, SelectionSet};
use crate::{
    field_type::FieldKind,
    schema::FieldDefinition
};

/// `fields { key value type jsonValue }`
pub fn flat_fields() -> Selection {
    Selection::field("fields").with_children(SelectionSet::leaves(["key", "value", "type", "jsonValue"]))
}

/// Identity of a nested metaobject: `id type handle fields { … }`.
pub fn metaobject_identity() -> SelectionSet {
    SelectionSet::leaves(["id", "type", "handle"]).with(flat_fields())
}

/// `pageInfo { … }` of a connection.
pub fn page_info() -> Selection {
    Selection::field("pageInfo").with_children(SelectionSet::leaves([
        "hasNextPage",
        "hasPreviousPage",
        "startCursor",
        "endCursor"
    ]))
}

/// `userErrors { field message code }`
pub fn user_errors() -> Selection {
    Selection::field("userErrors").with_children(SelectionSet::leaves(["field", "message", "code"]))
}

fn image() -> Selection {
    Selection::field("image").with_children(SelectionSet::leaves(["url", "altText", "width", "height"]))
}

/// File payload, gated by the field's allowed file kinds.
///
/// Without a `file_type_options` validation every kind is selected.
pub fn file(field: &FieldDefinition) -> SelectionSet {
    let allowed = field.file_type_options();
    let allows = |kind: &str| {
        allowed
            .as_ref()
            .is_none_or(|options| options.iter().any(|o| o.eq_ignore_ascii_case(kind)))
    };
    let allows_generic = allowed.as_ref().is_none_or(|options| {
        options
            .iter()
            .any(|o| !o.eq_ignore_ascii_case("image") && !o.eq_ignore_ascii_case("video"))
    });

    let mut set = SelectionSet::new().with(Selection::fragment(
        "File",
        SelectionSet::leaves(["id", "fileStatus", "alt"])
    ));
    if allows("Image") {
        set.push(Selection::fragment("MediaImage", SelectionSet::new().with(image())));
    }
    if allows("Video") {
        set.push(Selection::fragment(
            "Video",
            SelectionSet::new().with(
                Selection::field("sources")
                    .with_children(SelectionSet::leaves(["url", "mimeType", "format", "width", "height"]))
            )
        ));
    }
    if allows_generic {
        set.push(Selection::fragment("GenericFile", SelectionSet::leaves(["url", "mimeType"])));
    }
    set
}

/// Default payload of a non-metaobject reference, wrapped in its fragment.
pub fn foreign(field: &FieldDefinition) -> SelectionSet {
    let (on, leaves): (&str, &[&str]) = match field.kind() {
        FieldKind::FileReference => return file(field),
        FieldKind::ProductReference => {
            return SelectionSet::new().with(Selection::fragment(
                "Product",
                SelectionSet::leaves(["id", "title", "handle", "status"]).with(
                    Selection::field("featuredImage").with_children(SelectionSet::leaves(["url", "altText"]))
                )
            ));
        }
        FieldKind::VariantReference => ("ProductVariant", &["id", "title", "sku", "price"]),
        FieldKind::CollectionReference => ("Collection", &["id", "title", "handle"]),
        FieldKind::PageReference => ("Page", &["id", "title", "handle"]),
        FieldKind::CustomerReference => ("Customer", &["id", "displayName", "email"]),
        FieldKind::CompanyReference => ("Company", &["id", "name"]),
        FieldKind::ProductTaxonomyValueReference => ("TaxonomyValue", &["id", "name"]),
        _ => return SelectionSet::leaves(["__typename"])
    };
    SelectionSet::new().with(Selection::fragment(on, SelectionSet::leaves(leaves.iter().copied())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{FILE_TYPES_VALIDATION, Validation};

    #[test]
    fn file_defaults_without_options_select_every_kind() {
        let set = file(&FieldDefinition::new("icon", FieldKind::FileReference));
        for key in ["...File", "...MediaImage", "...Video", "...GenericFile"] {
            assert!(set.get(key).is_some(), "{key}");
        }
    }

    #[test]
    fn file_defaults_are_gated_by_options() {
        let field = FieldDefinition::new("icon", FieldKind::FileReference)
            .validation(Validation::new(FILE_TYPES_VALIDATION, json!(["Image"])));
        let set = file(&field);
        assert!(set.get("...File").is_some());
        assert!(set.get("...MediaImage").is_some());
        assert!(set.get("...Video").is_none());
        assert!(set.get("...GenericFile").is_none());
    }

    #[test]
    fn foreign_defaults_use_graphql_types() {
        let set = foreign(&FieldDefinition::new("p", FieldKind::VariantReference));
        assert_eq!(set.to_string(), "{ ... on ProductVariant { id title sku price } }");
        let set = foreign(&FieldDefinition::new("c", FieldKind::CollectionReference));
        assert!(set.get("...Collection").is_some());
    }
}
