//! Value and data references: the indirections that let a field be either a literal or a
//! lookup into a named data set or scale.

use serde_json::Value;

use crate::grammar::Kind;

crate::grammar_class! {
    /// A value for a mark property: either a literal `value` or a `field` of the data, optionally
    /// run through a `scale`.
    pub struct ValueRef {
        /// Literal value. Ignored by the renderer when `field` is set.
        value: Value = "value" [Kind::Str, Kind::Int, Kind::Float];
        field: String = "field";
        datum: String = "datum";
        group: String = "group";
        parent: String = "parent";
        /// Name of the scale applied to `value` or `field`.
        scale: String = "scale";
        mult: Value = "mult" [Kind::Int, Kind::Float];
        offset: Value = "offset" [Kind::Int, Kind::Float];
        /// Use the band width of an ordinal scale.
        band: bool = "band";
    }
}

crate::grammar_class! {
    /// A reference to a field (or list of fields) of a named data set.
    pub struct DataRef {
        data: String = "data";
        field: Value = "field" [Kind::Str, Kind::List];
    }
}

impl ValueRef {
    /// A literal value reference.
    pub fn literal(value: impl Into<Value>) -> crate::Result<Self> {
        Self::new().with_value(value)
    }

    /// A reference to `field` mapped through `scale`.
    pub fn scaled(scale: &str, field: &str) -> crate::Result<Self> {
        Self::new().with_scale(scale)?.with_field(field)
    }
}

impl DataRef {
    pub fn to(data: &str, field: impl Into<Value>) -> crate::Result<Self> {
        Self::new().with_data(data)?.with_field(field)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;
    use crate::Error;

    #[test]
    fn value_accepts_scalars_only() {
        let mut value_ref = ValueRef::new();
        value_ref.set_value("steelblue").unwrap();
        value_ref.set_value(3).unwrap();
        value_ref.set_value(0.5).unwrap();

        let err = value_ref.set_value(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "value must be one of (str, int, float)");
        assert_eq!(value_ref.value(), Some(&json!(0.5)));

        assert!(matches!(
            value_ref.set_mult("2"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn serializes_set_fields_only() {
        let value_ref = ValueRef::new()
            .with_scale("x")
            .unwrap()
            .with_band(true)
            .unwrap()
            .with_offset(-1)
            .unwrap();
        assert_eq!(
            value_ref.to_json(),
            json!({"scale": "x", "band": true, "offset": -1})
        );
    }

    #[test]
    fn data_ref_field_is_string_or_list() {
        let data_ref = DataRef::to("table", "data.x").unwrap();
        assert_eq!(
            data_ref.to_json(),
            json!({"data": "table", "field": "data.x"})
        );

        let mut data_ref = DataRef::new();
        data_ref.set_field(json!(["a", "b"])).unwrap();
        assert!(data_ref.set_field(3).is_err());
    }
}
