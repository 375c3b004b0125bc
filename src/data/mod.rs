//! The `Data` grammar class and the adapters that load tabular input into its row-list shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::*;

use crate::error::{Error, Result};
use crate::grammar::Kind;
use crate::transforms::Transform;

mod adapters;
mod frame;

pub use adapters::*;
pub use frame::*;

/// Data name used when none is given.
pub const DEFAULT_DATA_NAME: &str = "table";

/// Key the row index is stored under in long-form rows.
pub const DEFAULT_INDEX_KEY: &str = "idx";

fn check_values(rows: &Vec<Value>) -> Result<()> {
    for row in rows {
        if !matches!(Kind::of(row), Kind::Float | Kind::Int | Kind::Map) {
            return Err(Error::mismatch(
                "values row",
                &[Kind::Float, Kind::Int, Kind::Map],
            ));
        }
    }
    Ok(())
}

fn require_name(data: &Data) -> Result<()> {
    match data.name() {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(Error::Validation("name is required for Data".to_owned())),
    }
}

crate::grammar_class! {
    /// A named data set: inline `values`, a `url` to load from, or a `source` data set with
    /// transforms applied.
    pub struct Data validate require_name {
        name: String = "name";
        url: String = "url";
        /// Rows: numbers or objects mapping column names to values.
        values: Vec<Value> = "values" => check_values;
        /// Name of another data set this one is derived from.
        source: String = "source";
        transform: Vec<Transform> = "transform";
        /// Format of the data loaded from `url`.
        format: Value = "format" [Kind::Map];
    }
}

impl Data {
    /// An empty data set named `name`, or `"table"` when `name` is `None`.
    pub fn named(name: Option<&str>) -> Self {
        let mut data = Self::new();
        // A plain string passes every check on `name`.
        data.grammar.set(
            &Self::NAME,
            name.unwrap_or(DEFAULT_DATA_NAME).to_owned(),
        )
        .ok();
        data
    }

    pub(crate) fn with_rows(name: Option<&str>, rows: Vec<Value>) -> Result<Self> {
        debug!(name = ?name, rows = rows.len(), "loaded data values");
        Self::named(name).with_values(rows)
    }
}

/// A scalar from tabular input, before normalization to a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    /// A value from a runtime JSON document.
    Json(Value),
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n.into())
    }
}

impl From<usize> for Scalar {
    fn from(n: usize) -> Self {
        match i64::try_from(n) {
            Ok(n) => Scalar::Int(n),
            Err(_) => Scalar::Json(Value::from(n)),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(date: NaiveDate) -> Self {
        Scalar::Date(date)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(datetime: NaiveDateTime) -> Self {
        Scalar::DateTime(datetime)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(datetime: DateTime<Utc>) -> Self {
        Scalar::Timestamp(datetime)
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Scalar::Str(s),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else if let (true, Some(f)) = (n.is_f64(), n.as_f64()) {
                    Scalar::Float(f)
                } else {
                    Scalar::Json(Value::Number(n))
                }
            }
            other => Scalar::Json(other),
        }
    }
}

fn epoch_millis(datetime: NaiveDateTime) -> Value {
    // Whole seconds only; sub-second precision is dropped.
    Value::from(datetime.and_utc().timestamp() * 1000)
}

/// Normalize a scalar into a JSON-serializable value.
///
/// Strings pass through, integers and floats keep their kind, dates and datetimes become
/// milliseconds since the epoch (naive values are read as UTC). Anything else fails.
pub fn serialize(value: impl Into<Scalar>) -> Result<Value> {
    match value.into() {
        Scalar::Str(s) => Ok(Value::String(s)),
        Scalar::Int(n) => Ok(Value::from(n)),
        Scalar::Float(f) => Ok(Value::from(f)),
        Scalar::Date(date) => date
            .and_hms_opt(0, 0, 0)
            .map(epoch_millis)
            .ok_or_else(|| Error::load(format!("cannot serialize date {date}"))),
        Scalar::DateTime(datetime) => Ok(epoch_millis(datetime)),
        Scalar::Timestamp(datetime) => Ok(Value::from(datetime.timestamp() * 1000)),
        Scalar::Json(value) => match Kind::of(&value) {
            Kind::Str | Kind::Int | Kind::Float => Ok(value),
            kind => Err(Error::load(format!("cannot serialize value of type {kind}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;

    #[test]
    fn values_rows_are_numbers_or_objects() {
        let mut data = Data::named(None);
        data.set_values(vec![json!(1), json!(2.5), json!({"x": 1})])
            .unwrap();

        let err = data.set_values(vec![json!("a")]).unwrap_err();
        assert_eq!(err.to_string(), "values row must be one of (float, int, dict)");
        assert_eq!(data.values().map(Vec::len), Some(3));
    }

    #[test]
    fn name_defaults_to_table_and_is_required() {
        let data = Data::named(None);
        assert_eq!(data.name().unwrap(), "table");
        data.validate().unwrap();

        let err = Data::new().validate().unwrap_err();
        assert_eq!(err.to_string(), "name is required for Data");
    }

    #[test]
    fn format_must_be_an_object() {
        let mut data = Data::named(Some("geo"));
        data.set_format(json!({"type": "topojson", "feature": "states"}))
            .unwrap();
        assert!(data.set_format(json!("topojson")).is_err());
    }

    #[test]
    fn serialize_contract() {
        assert_eq!(serialize("a").unwrap(), json!("a"));
        assert_eq!(serialize(3_i64).unwrap(), json!(3));
        assert_eq!(serialize(1.5).unwrap(), json!(1.5));

        let date = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        assert_eq!(serialize(date).unwrap(), json!(1356998400000_i64));

        let datetime = date.and_hms_milli_opt(0, 0, 1, 500).unwrap();
        assert_eq!(serialize(datetime).unwrap(), json!(1356998401000_i64));
        assert_eq!(
            serialize(datetime.and_utc()).unwrap(),
            json!(1356998401000_i64)
        );

        let err = serialize(json!(true)).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
        assert_eq!(err.to_string(), "cannot serialize value of type bool");
        assert_eq!(
            serialize(json!(null)).unwrap_err().to_string(),
            "cannot serialize value of type null"
        );
        assert_eq!(
            serialize(json!([1])).unwrap_err().to_string(),
            "cannot serialize value of type list"
        );
    }
}
