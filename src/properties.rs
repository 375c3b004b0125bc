use crate::error::{Error, Result};
use crate::grammar::Kind;
use crate::values::ValueRef;

pub const SHAPES: &[&str] = &[
    "circle",
    "square",
    "cross",
    "diamond",
    "triangle-up",
    "triangle-down",
];

/// Interpolation methods for `line` marks; `area` marks accept a subset.
pub const INTERPOLATIONS: &[&str] = &[
    "linear",
    "step-before",
    "step-after",
    "basis",
    "basis-open",
    "basis-closed",
    "bundle",
    "cardinal",
    "cardinal-open",
    "cardinal-closed",
    "monotone",
];

pub const ALIGNMENTS: &[&str] = &["left", "right", "center"];

pub const BASELINES: &[&str] = &["top", "middle", "bottom"];

// Only the literal `value` of a reference is checked; the renderer ignores it when `field` is
// set.

fn literal_str<'a>(value: &'a ValueRef, name: &str) -> Result<Option<&'a str>> {
    match value.value() {
        None => Ok(None),
        Some(literal) => literal
            .as_str()
            .map(Some)
            .ok_or_else(|| Error::mismatch(format!("{name}.value"), &[Kind::Str])),
    }
}

fn literal_in(value: &ValueRef, name: &str, allowed: &[&str], what: &str) -> Result<()> {
    match literal_str(value, name)? {
        Some(literal) if !allowed.contains(&literal) => {
            Err(Error::invalid(format!("{literal} is not a valid {what}")))
        }
        _ => Ok(()),
    }
}

fn opacity(value: &ValueRef, name: &str) -> Result<()> {
    let Some(literal) = value.value() else {
        return Ok(());
    };
    let Some(x) = literal.as_f64() else {
        return Err(Error::mismatch(
            format!("{name}.value"),
            &[Kind::Float, Kind::Int],
        ));
    };
    if !(0.0..=1.0).contains(&x) {
        return Err(Error::invalid(format!("{name} must be between 0 and 1")));
    }
    Ok(())
}

fn non_negative_int(value: &ValueRef, name: &str, label: &str) -> Result<()> {
    let Some(literal) = value.value() else {
        return Ok(());
    };
    let Some(x) = literal.as_i64() else {
        return Err(Error::mismatch(format!("{name}.value"), &[Kind::Int]));
    };
    if x < 0 {
        return Err(Error::invalid(format!("{label} cannot be negative")));
    }
    Ok(())
}

fn check_fill(value: &ValueRef) -> Result<()> {
    literal_str(value, "fill").map(drop)
}

fn check_stroke(value: &ValueRef) -> Result<()> {
    literal_str(value, "stroke").map(drop)
}

fn check_path(value: &ValueRef) -> Result<()> {
    literal_str(value, "path").map(drop)
}

fn check_fill_opacity(value: &ValueRef) -> Result<()> {
    opacity(value, "fill_opacity")
}

fn check_stroke_opacity(value: &ValueRef) -> Result<()> {
    opacity(value, "stroke_opacity")
}

fn check_stroke_width(value: &ValueRef) -> Result<()> {
    non_negative_int(value, "stroke_width", "stroke width")
}

fn check_size(value: &ValueRef) -> Result<()> {
    non_negative_int(value, "size", "size")
}

fn check_shape(value: &ValueRef) -> Result<()> {
    literal_in(value, "shape", SHAPES, "shape")
}

fn check_interpolate(value: &ValueRef) -> Result<()> {
    literal_in(value, "interpolate", INTERPOLATIONS, "method")
}

fn check_align(value: &ValueRef) -> Result<()> {
    literal_in(value, "align", ALIGNMENTS, "alignment")
}

fn check_baseline(value: &ValueRef) -> Result<()> {
    literal_in(value, "baseline", BASELINES, "baseline")
}

crate::grammar_class! {
    /// Visual properties of a mark, or of the parts of an axis or legend. Every property is a
    /// [`ValueRef`].
    pub struct PropertySet {
        x: ValueRef = "x";
        x2: ValueRef = "x2";
        width: ValueRef = "width";
        y: ValueRef = "y";
        y2: ValueRef = "y2";
        height: ValueRef = "height";
        opacity: ValueRef = "opacity";
        fill: ValueRef = "fill" => check_fill;
        fill_opacity: ValueRef = "fillOpacity" => check_fill_opacity;
        stroke: ValueRef = "stroke" => check_stroke;
        stroke_width: ValueRef = "strokeWidth" => check_stroke_width;
        stroke_opacity: ValueRef = "strokeOpacity" => check_stroke_opacity;
        /// Total area of a symbol in square pixels.
        size: ValueRef = "size" => check_size;
        shape: ValueRef = "shape" => check_shape;
        path: ValueRef = "path" => check_path;
        inner_radius: ValueRef = "innerRadius";
        outer_radius: ValueRef = "outerRadius";
        start_angle: ValueRef = "startAngle";
        end_angle: ValueRef = "endAngle";
        interpolate: ValueRef = "interpolate" => check_interpolate;
        tension: ValueRef = "tension";
        url: ValueRef = "url";
        align: ValueRef = "align" => check_align;
        baseline: ValueRef = "baseline" => check_baseline;
        text: ValueRef = "text";
        dx: ValueRef = "dx";
        dy: ValueRef = "dy";
        angle: ValueRef = "angle";
        font: ValueRef = "font";
        font_size: ValueRef = "fontSize";
        font_weight: ValueRef = "fontWeight";
        font_style: ValueRef = "fontStyle";
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;

    fn literal(value: serde_json::Value) -> ValueRef {
        ValueRef::literal(value).unwrap()
    }

    #[test]
    fn opacity_out_of_range_is_rejected_at_assignment() {
        let mut props = PropertySet::new();
        let err = props.set_fill_opacity(literal(json!(1.5))).unwrap_err();

        assert!(matches!(err, Error::Invalid(_)));
        assert_eq!(err.to_string(), "fill_opacity must be between 0 and 1");
        assert_eq!(props.fill_opacity(), None);

        let err = props.set_stroke_opacity(literal(json!(-0.1))).unwrap_err();
        assert_eq!(err.to_string(), "stroke_opacity must be between 0 and 1");
    }

    #[test]
    fn opacity_must_be_numeric() {
        let err = PropertySet::new()
            .with_fill_opacity(literal(json!("half")))
            .unwrap_err();
        assert_eq!(err.to_string(), "fill_opacity.value must be one of (float, int)");
    }

    #[test]
    fn vocabularies() {
        let mut props = PropertySet::new();
        props.set_shape(literal(json!("diamond"))).unwrap();
        props.set_interpolate(literal(json!("monotone"))).unwrap();
        props.set_align(literal(json!("center"))).unwrap();

        let err = props.set_shape(literal(json!("hexagon"))).unwrap_err();
        assert_eq!(err.to_string(), "hexagon is not a valid shape");
        let err = props.set_baseline(literal(json!("under"))).unwrap_err();
        assert_eq!(err.to_string(), "under is not a valid baseline");
        let err = props.set_interpolate(literal(json!("wobbly"))).unwrap_err();
        assert_eq!(err.to_string(), "wobbly is not a valid method");
    }

    #[test]
    fn sizes_are_non_negative_ints() {
        let mut props = PropertySet::new();
        props.set_size(literal(json!(100))).unwrap();

        let err = props.set_stroke_width(literal(json!(-2))).unwrap_err();
        assert_eq!(err.to_string(), "stroke width cannot be negative");
        let err = props.set_size(literal(json!(2.5))).unwrap_err();
        assert_eq!(err.to_string(), "size.value must be int");
    }

    #[test]
    fn field_references_skip_literal_checks() {
        let mut props = PropertySet::new();
        props
            .set_fill(ValueRef::scaled("color", "data.col").unwrap())
            .unwrap();
        let err = props.set_fill(literal(json!(12))).unwrap_err();
        assert_eq!(err.to_string(), "fill.value must be str");
    }

    #[test]
    fn camel_case_keys() {
        let props = PropertySet::new()
            .with_fill_opacity(literal(json!(0.5)))
            .unwrap()
            .with_stroke_width(literal(json!(2)))
            .unwrap()
            .with_font_size(literal(json!(14)))
            .unwrap();

        assert_eq!(
            props.to_json(),
            json!({
                "fillOpacity": {"value": 0.5},
                "strokeWidth": {"value": 2},
                "fontSize": {"value": 14}
            })
        );
    }
}
