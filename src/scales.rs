use serde_json::Value;

use crate::error::{Error, Result};
use crate::grammar::{FromJson, GrammarValue, Kind};
use crate::values::DataRef;

pub const SCALE_TYPES: &[&str] = &[
    "ordinal", "time", "utc", "linear", "log", "pow", "sqrt", "quantile", "quantize", "threshold",
];

/// A scale domain: literal values or a reference into a data set.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Values(Vec<Value>),
    Data(DataRef),
}

impl From<Vec<Value>> for Domain {
    fn from(values: Vec<Value>) -> Self {
        Domain::Values(values)
    }
}

impl From<DataRef> for Domain {
    fn from(data_ref: DataRef) -> Self {
        Domain::Data(data_ref)
    }
}

impl GrammarValue for Domain {
    fn kind(&self) -> Kind {
        match self {
            Domain::Values(_) => Kind::List,
            Domain::Data(_) => Kind::Object("DataRef"),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Domain::Values(values) => Value::Array(values.clone()),
            Domain::Data(data_ref) => data_ref.to_json(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Domain::Values(_) => Ok(()),
            Domain::Data(data_ref) => data_ref.validate(),
        }
    }
}

impl FromJson for Domain {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Array(values) => Ok(Domain::Values(values)),
            Value::Object(_) => DataRef::from_json(value).map(Domain::Data),
            _ => Err(Error::mismatch(
                field,
                &[Kind::List, Kind::Object("DataRef")],
            )),
        }
    }
}

/// A domain or range bound: a number or a reference into a data set.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Number(Value),
    Data(DataRef),
}

impl From<i64> for Bound {
    fn from(n: i64) -> Self {
        Bound::Number(n.into())
    }
}

impl From<f64> for Bound {
    fn from(n: f64) -> Self {
        Bound::Number(n.into())
    }
}

impl From<DataRef> for Bound {
    fn from(data_ref: DataRef) -> Self {
        Bound::Data(data_ref)
    }
}

impl GrammarValue for Bound {
    fn kind(&self) -> Kind {
        match self {
            Bound::Number(n) => Kind::of(n),
            Bound::Data(_) => Kind::Object("DataRef"),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Bound::Number(n) => n.clone(),
            Bound::Data(data_ref) => data_ref.to_json(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Bound::Number(_) => Ok(()),
            Bound::Data(data_ref) => data_ref.validate(),
        }
    }
}

impl FromJson for Bound {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Number(_) => Ok(Bound::Number(value)),
            Value::Object(_) => DataRef::from_json(value).map(Bound::Data),
            _ => Err(Error::mismatch(field, BOUND_KINDS)),
        }
    }
}

const BOUND_KINDS: &[Kind] = &[Kind::Float, Kind::Int, Kind::Object("DataRef")];

fn check_scale_type(value: &String) -> Result<()> {
    if SCALE_TYPES.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "scale type must be one of {SCALE_TYPES:?}"
        )))
    }
}

crate::grammar_class! {
    /// Maps a data domain onto a visual range.
    pub struct Scale {
        name: String = "name";
        kind: String = "type" => check_scale_type;
        domain: Domain = "domain";
        domain_min: Bound = "domainMin" [Kind::Float, Kind::Int, Kind::Object("DataRef")];
        domain_max: Bound = "domainMax" [Kind::Float, Kind::Int, Kind::Object("DataRef")];
        /// A list of range values, or a preset such as `"width"`, `"height"` or `"category10"`.
        range: Value = "range" [Kind::List, Kind::Str];
        range_min: Bound = "rangeMin" [Kind::Float, Kind::Int, Kind::Object("DataRef")];
        range_max: Bound = "rangeMax" [Kind::Float, Kind::Int, Kind::Object("DataRef")];
        reverse: bool = "reverse";
        round: bool = "round";
        /// Ordinal scales only: distribute points rather than bands.
        points: bool = "points";
        clamp: bool = "clamp";
        nice: Value = "nice" [Kind::Bool, Kind::Str];
        exponent: Value = "exponent" [Kind::Float, Kind::Int];
        zero: bool = "zero";
        padding: Value = "padding" [Kind::Float, Kind::Int];
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn ordinal_scale_over_table() {
        let scale = Scale::new()
            .with_name("x")
            .unwrap()
            .with_kind("ordinal")
            .unwrap()
            .with_range("width")
            .unwrap()
            .with_domain(DataRef::to("table", "data.x").unwrap())
            .unwrap();

        assert_eq!(
            scale.to_json(),
            json!({
                "name": "x",
                "type": "ordinal",
                "range": "width",
                "domain": {"data": "table", "field": "data.x"}
            })
        );
    }

    #[test]
    fn type_vocabulary() {
        let err = Scale::new().with_kind("logarithmic").unwrap_err();
        assert!(err.to_string().starts_with("scale type must be one of"));
    }

    #[test]
    fn literal_domains_and_bounds() {
        let mut scale = Scale::new();
        scale.set_domain(vec![json!(0), json!(100)]).unwrap();
        scale.set_domain_min(0_i64).unwrap();
        scale.set_range_max(DataRef::to("stats", "max").unwrap()).unwrap();
        assert_eq!(
            scale.to_json(),
            json!({
                "domain": [0, 100],
                "domainMin": 0,
                "rangeMax": {"data": "stats", "field": "max"}
            })
        );

        assert!(Scale::new().with_nice(json!(3)).is_err());
        assert!(Scale::new().with_exponent(json!("2")).is_err());
    }

    #[test]
    fn from_json_dispatches_domain_shapes() {
        let scale = Scale::from_json(json!({
            "name": "color",
            "type": "ordinal",
            "domain": {"data": "table", "field": "data.col"},
            "range": "category20"
        }))
        .unwrap();
        assert!(matches!(scale.domain(), Some(Domain::Data(_))));

        let err = Scale::from_json(json!({"domain": "table"})).unwrap_err();
        assert_eq!(err.to_string(), "domain must be one of (list, DataRef)");
    }
}
