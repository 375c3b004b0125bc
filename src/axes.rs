use serde_json::Value;

use crate::error::{Error, Result};
use crate::grammar::Kind;
use crate::properties::PropertySet;

crate::grammar_class! {
    /// Styling of the individual parts of an axis.
    pub struct AxisProperties {
        major_ticks: PropertySet = "majorTicks";
        minor_ticks: PropertySet = "minorTicks";
        ticks: PropertySet = "ticks";
        labels: PropertySet = "labels";
        title: PropertySet = "title";
        axis: PropertySet = "axis";
    }
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{field} must be one of {}",
            allowed.join(", ")
        )))
    }
}

fn check_axis_type(value: &String) -> Result<()> {
    if value == "x" || value == "y" {
        Ok(())
    } else {
        Err(Error::invalid("Axis.type must be \"x\" or \"y\""))
    }
}

fn check_layer(value: &String) -> Result<()> {
    if value == "front" || value == "back" {
        Ok(())
    } else {
        Err(Error::invalid("Axis.layer must be front or back"))
    }
}

fn check_orient(value: &String) -> Result<()> {
    one_of("Axis.orient", value, &["top", "bottom", "left", "right"])
}

crate::grammar_class! {
    /// An axis visualizing one scale. Axes in a visualization are keyed on `type`.
    pub struct Axis keyed "type" {
        kind: String = "type" => check_axis_type;
        scale: String = "scale";
        orient: String = "orient" => check_orient;
        title: String = "title";
        title_offset: i64 = "titleOffset";
        format: String = "format";
        /// Desired number of ticks.
        ticks: i64 = "ticks";
        /// Explicit tick values.
        values: Vec<Value> = "values";
        subdivide: Value = "subdivide" [Kind::Int, Kind::Float];
        tick_padding: i64 = "tickPadding";
        tick_size: i64 = "tickSize";
        tick_size_major: i64 = "tickSizeMajor";
        tick_size_minor: i64 = "tickSizeMinor";
        tick_size_end: i64 = "tickSizeEnd";
        offset: i64 = "offset";
        layer: String = "layer" => check_layer;
        grid: bool = "grid";
        properties: AxisProperties = "properties";
    }
}

impl Axis {
    /// An axis of `kind` (`"x"` or `"y"`) over `scale`.
    pub fn for_scale(kind: &str, scale: &str) -> Result<Self> {
        Self::new().with_kind(kind)?.with_scale(scale)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;
    use crate::values::ValueRef;

    #[test]
    fn type_is_x_or_y() {
        let err = Axis::new().with_kind("z").unwrap_err();
        assert_eq!(err.to_string(), "Axis.type must be \"x\" or \"y\"");

        let err = Axis::new().with_layer("middle").unwrap_err();
        assert_eq!(err.to_string(), "Axis.layer must be front or back");

        let err = Axis::new().with_orient("up").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Axis.orient must be one of top, bottom, left, right"
        );
    }

    #[test]
    fn nested_properties_serialize() {
        let title = PropertySet::new()
            .with_font_size(ValueRef::literal(16).unwrap())
            .unwrap();
        let axis = Axis::for_scale("x", "x")
            .unwrap()
            .with_tick_padding(4)
            .unwrap()
            .with_properties(AxisProperties::new().with_title(title).unwrap())
            .unwrap();

        assert_eq!(
            axis.to_json(),
            json!({
                "type": "x",
                "scale": "x",
                "tickPadding": 4,
                "properties": {"title": {"fontSize": {"value": 16}}}
            })
        );
    }
}
