// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Native field values.
//!
//! | Wire type | Variant |
//! |-----------|---------|
//! | `boolean` | [`FieldValue::Bool`] |
//! | `number_integer` | [`FieldValue::Integer`] |
//! | `number_decimal` | [`FieldValue::Decimal`] |
//! | `date` / `date_time` | [`FieldValue::Date`] / [`FieldValue::DateTime`] |
//! | `money` | [`FieldValue::Money`] |
//! | `weight` / `volume` / `dimension` | [`FieldValue::Measurement`] |
//! | `link` / `rating` | [`FieldValue::Link`] / [`FieldValue::Rating`] |
//! | `json`, unknown tags, foreign payloads | [`FieldValue::Json`] |
//! | text, ids, unpopulated references | [`FieldValue::String`] |
//! | populated metaobject reference | [`FieldValue::Record`] |
//! | `list.*` | [`FieldValue::List`] |

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as sent by the platform.
    pub amount:        String,
    /// ISO 4217 currency code.
    pub currency_code: String
}

/// Weight, volume or dimension with unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Unit (`KILOGRAMS`, `MILLILITERS`, `CENTIMETERS`, ...).
    pub unit:  String,
    /// Magnitude.
    pub value: f64
}

/// Link with display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Display text.
    pub text: String,
    /// Target URL.
    pub url:  String
}

/// Rating on a scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Rating value.
    pub value:     String,
    /// Lowest value of the scale.
    pub scale_min: String,
    /// Highest value of the scale.
    pub scale_max: String
}

/// Value of one record field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value.
    #[default]
    Null,
    /// `boolean`
    Bool(bool),
    /// `number_integer`
    Integer(i64),
    /// `number_decimal`
    Decimal(f64),
    /// Text, ids and unpopulated references.
    String(String),
    /// `date`
    Date(NaiveDate),
    /// `date_time`
    DateTime(DateTime<FixedOffset>),
    /// `money`
    Money(Money),
    /// `weight`, `volume`, `dimension`
    Measurement(Measurement),
    /// `link`
    Link(Link),
    /// `rating`
    Rating(Rating),
    /// `json`, foreign payloads and unknown types.
    Json(serde_json::Value),
    /// `list.*`
    List(Vec<FieldValue>),
    /// Populated metaobject reference.
    Record(Box<Record>)
}

impl FieldValue {
    /// Short kind name used in decode errors.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "date_time",
            Self::Money(_) => "money",
            Self::Measurement(_) => "measurement",
            Self::Link(_) => "link",
            Self::Rating(_) => "rating",
            Self::Json(_) => "json",
            Self::List(_) => "list",
            Self::Record(_) => "record"
        }
    }

    /// Check if this is [`FieldValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value means "no value" on the wire.
    ///
    /// `Null`, empty lists and empty JSON arrays/objects all clear a field.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(items) => items.is_empty(),
            Self::Json(serde_json::Value::Null) => true,
            Self::Json(serde_json::Value::Array(items)) => items.is_empty(),
            Self::Json(serde_json::Value::Object(map)) => map.is_empty(),
            _ => false
        }
    }

    /// Borrow the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None
        }
    }

    /// Borrow the populated record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None
        }
    }

    /// Borrow list items.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None
        }
    }

    /// JSON form with camel-cased object keys.
    ///
    /// Populated records collapse to their id, which is what the platform
    /// accepts when the value is written back.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Decimal(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Money(m) => serde_json::to_value(m).unwrap_or(Value::Null),
            Self::Measurement(m) => serde_json::to_value(m).unwrap_or(Value::Null),
            Self::Link(l) => serde_json::to_value(l).unwrap_or(Value::Null),
            Self::Rating(r) => serde_json::to_value(r).unwrap_or(Value::Null),
            Self::Json(v) => v.clone(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(r) => Value::String(r.system.id.clone())
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Money> for FieldValue {
    fn from(value: Money) -> Self {
        Self::Money(value)
    }
}

impl From<Measurement> for FieldValue {
    fn from(value: Measurement) -> Self {
        Self::Measurement(value)
    }
}

impl From<Link> for FieldValue {
    fn from(value: Link) -> Self {
        Self::Link(value)
    }
}

impl From<Rating> for FieldValue {
    fn from(value: Rating) -> Self {
        Self::Rating(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        Self::Record(Box::new(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_values() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(FieldValue::Json(json!({})).is_empty());
        assert!(FieldValue::Json(json!([])).is_empty());
        assert!(!FieldValue::String(String::new()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
    }

    #[test]
    fn compound_json_is_camel_cased() {
        let money = FieldValue::Money(Money {
            amount:        "5.00".into(),
            currency_code: "USD".into()
        });
        assert_eq!(money.to_json(), json!({"amount": "5.00", "currencyCode": "USD"}));
    }

    #[test]
    fn dates_render_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FieldValue::Date(date).to_json(), json!("2024-02-29"));

        let dt = DateTime::parse_from_rfc3339("2024-02-29T10:30:00Z").unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_json(), json!("2024-02-29T10:30:00Z"));
    }

    #[test]
    fn conversions() {
        assert_eq!(FieldValue::from("x"), FieldValue::String("x".into()));
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(
            FieldValue::from(vec![1_i64, 2]),
            FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)])
        );
    }
}
