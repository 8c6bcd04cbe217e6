// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed decoding of records.
//!
//! Generated entity structs implement [`FromRecord`]; their field types
//! implement [`FromFieldValue`]. A reference field is generic over its
//! representation: [`MetaobjectId`] when unpopulated, the target struct when
//! populated.
//!
//! | Field value | Accepted by |
//! |-------------|-------------|
//! | `String` | `String` |
//! | `Bool` | `bool` |
//! | `Integer` | `i64`, `f64` |
//! | `Decimal` | `f64` |
//! | `Date` / `DateTime` | `NaiveDate` / `DateTime<FixedOffset>` |
//! | compound literals | `Money`, `Measurement`, `Link`, `Rating` |
//! | anything | `serde_json::Value` |
//! | `Record` | any `FromRecord`, or its id as `MetaobjectId` |
//! | `Null` | `Option<T>` as `None`, `Vec<T>` as empty |

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::de::DeserializeOwned;

use crate::{
    error::DecodeError,
    record::Record,
    value::{FieldValue, Link, Measurement, Money, Rating}
};

/// Unpopulated reference: the fully-qualified id of the target.
pub type MetaobjectId = String;

/// Conversion from one field value.
pub trait FromFieldValue: Sized {
    /// Convert `value` of field `field`.
    fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError>;

    /// Value used when the field is absent from the record.
    fn missing(field: &str) -> Result<Self, DecodeError> {
        Err(DecodeError::Missing(field.to_string()))
    }
}

/// Conversion from a whole record.
pub trait FromRecord: Sized {
    /// Entity type the implementor represents.
    const TYPE: &'static str;

    /// Convert `record`.
    fn from_record(record: &Record) -> Result<Self, DecodeError>;
}

/// Decode field `key` of `record`.
pub fn decode_field<T: FromFieldValue>(record: &Record, key: &str) -> Result<T, DecodeError> {
    match record.get(key) {
        Some(value) => T::from_field_value(key, value),
        None => T::missing(key)
    }
}

/// Decode a JSON field into any deserializable type.
pub fn decode_json<T: DeserializeOwned>(field: &str, value: &FieldValue) -> Result<T, DecodeError> {
    serde_json::from_value(value.to_json()).map_err(|e| DecodeError::Json {
        field:   field.to_string(),
        message: e.to_string()
    })
}

/// Decode JSON field `key` of `record`; absence reads as JSON `null`.
pub fn decode_json_field<T: DeserializeOwned>(record: &Record, key: &str) -> Result<T, DecodeError> {
    match record.get(key) {
        Some(value) if *value != FieldValue::Null => decode_json(key, value),
        _ => serde_json::from_value(serde_json::Value::Null)
            .map_err(|_| DecodeError::Missing(key.to_string()))
    }
}

fn mismatch(field: &str, expected: &'static str, value: &FieldValue) -> DecodeError {
    DecodeError::Mismatch {
        field: field.to_string(),
        expected,
        found: value.kind_name()
    }
}

macro_rules! impl_from_variant {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromFieldValue for $ty {
            fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
                match value {
                    FieldValue::$variant(inner) => Ok(inner.clone()),
                    FieldValue::Null => Err(DecodeError::Missing(field.to_string())),
                    other => Err(mismatch(field, $expected, other))
                }
            }
        }
    };
}

impl_from_variant!(bool, Bool, "boolean");
impl_from_variant!(i64, Integer, "integer");
impl_from_variant!(NaiveDate, Date, "date");
impl_from_variant!(DateTime<FixedOffset>, DateTime, "date_time");
impl_from_variant!(Money, Money, "money");
impl_from_variant!(Measurement, Measurement, "measurement");
impl_from_variant!(Link, Link, "link");
impl_from_variant!(Rating, Rating, "rating");

impl FromFieldValue for String {
    fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
        match value {
            FieldValue::String(s) => Ok(s.clone()),
            FieldValue::Record(record) => Ok(record.id().to_string()),
            FieldValue::Json(serde_json::Value::String(s)) => Ok(s.clone()),
            FieldValue::Null => Err(DecodeError::Missing(field.to_string())),
            other => Err(mismatch(field, "string", other))
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
        match value {
            FieldValue::Decimal(d) => Ok(*d),
            #[allow(clippy::cast_precision_loss)]
            FieldValue::Integer(i) => Ok(*i as f64),
            FieldValue::Null => Err(DecodeError::Missing(field.to_string())),
            other => Err(mismatch(field, "decimal", other))
        }
    }
}

impl FromFieldValue for serde_json::Value {
    fn from_field_value(_field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
        Ok(value.to_json())
    }

    fn missing(_field: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::Value::Null)
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(field, other).map(Some)
        }
    }

    fn missing(_field: &str) -> Result<Self, DecodeError> {
        Ok(None)
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
        match value {
            FieldValue::Null => Ok(Vec::new()),
            FieldValue::List(items) => items
                .iter()
                .map(|item| T::from_field_value(field, item))
                .collect(),
            other => Err(mismatch(field, "list", other))
        }
    }

    fn missing(_field: &str) -> Result<Self, DecodeError> {
        Ok(Vec::new())
    }
}

/// Decode a populated reference into a [`FromRecord`] type.
pub fn decode_record<T: FromRecord>(field: &str, value: &FieldValue) -> Result<T, DecodeError> {
    match value {
        FieldValue::Record(record) => T::from_record(record),
        FieldValue::Null => Err(DecodeError::Missing(field.to_string())),
        other => Err(mismatch(field, "record", other))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::{DynamicFields, SystemFields};

    #[derive(Debug, PartialEq)]
    struct Bar {
        name: String
    }

    impl FromRecord for Bar {
        const TYPE: &'static str = "bar";

        fn from_record(record: &Record) -> Result<Self, DecodeError> {
            Ok(Self {
                name: decode_field(record, "name")?
            })
        }
    }

    impl FromFieldValue for Bar {
        fn from_field_value(field: &str, value: &FieldValue) -> Result<Self, DecodeError> {
            decode_record(field, value)
        }
    }

    fn record(fields: DynamicFields) -> Record {
        Record {
            system: SystemFields::with_id("gid://shopify/Metaobject/1"),
            fields
        }
    }

    #[test]
    fn scalars_decode() {
        let r = record(DynamicFields::new().with("name", "X").with("count", 3_i64));
        assert_eq!(decode_field::<String>(&r, "name").unwrap(), "X");
        assert_eq!(decode_field::<i64>(&r, "count").unwrap(), 3);
        assert_eq!(decode_field::<f64>(&r, "count").unwrap(), 3.0);
    }

    #[test]
    fn optional_and_list_tolerate_absence() {
        let r = record(DynamicFields::new().with("tags", FieldValue::Null));
        assert_eq!(decode_field::<Option<String>>(&r, "nope").unwrap(), None);
        assert!(decode_field::<Vec<String>>(&r, "tags").unwrap().is_empty());
        assert_eq!(
            decode_field::<String>(&r, "nope"),
            Err(DecodeError::Missing("nope".into()))
        );
    }

    #[test]
    fn mismatches_name_both_kinds() {
        let r = record(DynamicFields::new().with("flag", "yes"));
        assert_eq!(
            decode_field::<bool>(&r, "flag"),
            Err(DecodeError::Mismatch {
                field:    "flag".into(),
                expected: "boolean",
                found:    "string"
            })
        );
    }

    #[test]
    fn references_decode_as_id_or_record() {
        let bar = record(DynamicFields::new().with("name", "Inner"));
        let r = record(DynamicFields::new().with("genericObj", bar));
        assert_eq!(
            decode_field::<MetaobjectId>(&r, "genericObj").unwrap(),
            "gid://shopify/Metaobject/1"
        );
        assert_eq!(
            decode_field::<Bar>(&r, "genericObj").unwrap(),
            Bar {
                name: "Inner".into()
            }
        );
    }

    #[test]
    fn json_decodes_into_serde_types() {
        #[derive(serde::Deserialize)]
        struct Settings {
            color: String
        }
        let settings: Settings = decode_json("settings", &FieldValue::Json(json!({"color": "red"}))).unwrap();
        assert_eq!(settings.color, "red");
        assert!(decode_json::<Settings>("settings", &FieldValue::Json(json!([]))).is_err());
    }

    #[test]
    fn absent_json_field_is_null() {
        #[derive(Debug, serde::Deserialize)]
        struct Settings {
            #[allow(dead_code)]
            color: String
        }
        let r = record(DynamicFields::new().with("settings", FieldValue::Null));
        assert!(decode_json_field::<Option<Settings>>(&r, "settings").unwrap().is_none());
        assert!(decode_json_field::<Option<Settings>>(&r, "other").unwrap().is_none());
        assert_eq!(
            decode_json_field::<Settings>(&r, "settings").unwrap_err(),
            DecodeError::Missing("settings".into())
        );
    }
}
