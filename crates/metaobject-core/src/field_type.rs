// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Wire vocabulary of field types.
//!
//! The platform versions this vocabulary independently; unknown tags are kept
//! as [`FieldKind::Unknown`] and handled as opaque passthrough values.
//!
//! ```text
//! "single_line_text_field"    -> FieldType { kind: SingleLineTextField, list: false }
//! "list.metaobject_reference" -> FieldType { kind: MetaobjectReference, list: true }
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const LIST_PREFIX: &str = "list.";

/// Kind of a field, without list cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `boolean`
    Boolean,
    /// `color`
    Color,
    /// `date`
    Date,
    /// `date_time`
    DateTime,
    /// `dimension`
    Dimension,
    /// `id`
    Id,
    /// `json`
    Json,
    /// `link`
    Link,
    /// `money`
    Money,
    /// `multi_line_text_field`
    MultiLineTextField,
    /// `number_decimal`
    NumberDecimal,
    /// `number_integer`
    NumberInteger,
    /// `rating`
    Rating,
    /// `rich_text_field`
    RichTextField,
    /// `single_line_text_field`
    SingleLineTextField,
    /// `url`
    Url,
    /// `volume`
    Volume,
    /// `weight`
    Weight,
    /// `collection_reference`
    CollectionReference,
    /// `company_reference`
    CompanyReference,
    /// `customer_reference`
    CustomerReference,
    /// `file_reference`
    FileReference,
    /// `metaobject_reference`
    MetaobjectReference,
    /// `mixed_reference`
    MixedReference,
    /// `page_reference`
    PageReference,
    /// `product_reference`
    ProductReference,
    /// `product_taxonomy_value_reference`
    ProductTaxonomyValueReference,
    /// `variant_reference`
    VariantReference,
    /// Tag not known to this version of the crate.
    Unknown(String)
}

impl FieldKind {
    const KNOWN: &'static [(&'static str, FieldKind)] = &[
        ("boolean", Self::Boolean),
        ("color", Self::Color),
        ("date", Self::Date),
        ("date_time", Self::DateTime),
        ("dimension", Self::Dimension),
        ("id", Self::Id),
        ("json", Self::Json),
        ("link", Self::Link),
        ("money", Self::Money),
        ("multi_line_text_field", Self::MultiLineTextField),
        ("number_decimal", Self::NumberDecimal),
        ("number_integer", Self::NumberInteger),
        ("rating", Self::Rating),
        ("rich_text_field", Self::RichTextField),
        ("single_line_text_field", Self::SingleLineTextField),
        ("url", Self::Url),
        ("volume", Self::Volume),
        ("weight", Self::Weight),
        ("collection_reference", Self::CollectionReference),
        ("company_reference", Self::CompanyReference),
        ("customer_reference", Self::CustomerReference),
        ("file_reference", Self::FileReference),
        ("metaobject_reference", Self::MetaobjectReference),
        ("mixed_reference", Self::MixedReference),
        ("page_reference", Self::PageReference),
        ("product_reference", Self::ProductReference),
        ("product_taxonomy_value_reference", Self::ProductTaxonomyValueReference),
        ("variant_reference", Self::VariantReference)
    ];

    /// Parse a bare tag (without `list.`). Never fails.
    pub fn parse(tag: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| Self::Unknown(tag.to_string()))
    }

    /// Wire tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown(tag) => tag,
            known => Self::KNOWN
                .iter()
                .find(|(_, kind)| kind == known)
                .map(|(name, _)| *name)
                .unwrap_or_default()
        }
    }

    /// Check if values of this kind identify another resource.
    pub const fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::CollectionReference
                | Self::CompanyReference
                | Self::CustomerReference
                | Self::FileReference
                | Self::MetaobjectReference
                | Self::MixedReference
                | Self::PageReference
                | Self::ProductReference
                | Self::ProductTaxonomyValueReference
                | Self::VariantReference
        )
    }

    /// Check if this kind points at metaobjects of the same schema.
    pub const fn is_metaobject_reference(&self) -> bool {
        matches!(self, Self::MetaobjectReference | Self::MixedReference)
    }

    /// GraphQL object type the reference resolves to, for foreign references.
    pub const fn graphql_type(&self) -> Option<&'static str> {
        match self {
            Self::CollectionReference => Some("Collection"),
            Self::CompanyReference => Some("Company"),
            Self::CustomerReference => Some("Customer"),
            Self::FileReference => Some("File"),
            Self::MetaobjectReference | Self::MixedReference => Some("Metaobject"),
            Self::PageReference => Some("Page"),
            Self::ProductReference => Some("Product"),
            Self::ProductTaxonomyValueReference => Some("TaxonomyValue"),
            Self::VariantReference => Some("ProductVariant"),
            _ => None
        }
    }

    /// Check if a field of this kind may serve as a definition's thumbnail.
    pub const fn can_be_thumbnail(&self) -> bool {
        matches!(self, Self::Color | Self::FileReference)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full field type: kind plus list cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    /// Element kind.
    pub kind: FieldKind,
    /// `true` for `list.*` types.
    pub list: bool
}

impl FieldType {
    /// Single-valued type of the given kind.
    pub const fn single(kind: FieldKind) -> Self {
        Self {
            kind,
            list: false
        }
    }

    /// List type of the given kind.
    pub const fn list(kind: FieldKind) -> Self {
        Self {
            kind,
            list: true
        }
    }

    /// Parse a wire tag such as `list.file_reference`. Never fails.
    pub fn parse(tag: &str) -> Self {
        match tag.strip_prefix(LIST_PREFIX) {
            Some(inner) => Self::list(FieldKind::parse(inner)),
            None => Self::single(FieldKind::parse(tag))
        }
    }

    /// Check if this is any kind of reference.
    pub const fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }

    /// Check if this is a `mixed_reference` or `list.mixed_reference`.
    pub const fn is_mixed(&self) -> bool {
        matches!(self.kind, FieldKind::MixedReference)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            f.write_str(LIST_PREFIX)?;
        }
        f.write_str(self.kind.as_str())
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<FieldKind> for FieldType {
    fn from(kind: FieldKind) -> Self {
        Self::single(kind)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}
