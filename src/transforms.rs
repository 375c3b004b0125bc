//! Data transforms. A single [`Transform`] class carries the sub-fields of every transform
//! type; which ones apply depends on `type` and is left to the renderer.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::grammar::Kind;

pub const TRANSFORM_TYPES: &[&str] = &[
    "aggregate", "array", "bin", "copy", "cross", "facet", "filter", "flatten", "fold", "formula",
    "lookup", "slice", "sort", "stats", "truncate", "unique", "window", "zip", "force", "geo",
    "geopath", "link", "pie", "stack", "treemap", "wordcloud",
];

pub const STACK_OFFSETS: &[&str] = &["zero", "silhouette", "wiggle", "expand"];

pub const STACK_ORDERS: &[&str] = &["default", "reverse", "inside-out"];

pub const LINK_SHAPES: &[&str] = &["line", "curve", "diagonal", "diagonalX", "diagonalY"];

fn check_transform_type(value: &String) -> Result<()> {
    if TRANSFORM_TYPES.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Transform type must be one of {TRANSFORM_TYPES:?}"
        )))
    }
}

fn check_offset(value: &String) -> Result<()> {
    if STACK_OFFSETS.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "offset must be one of {STACK_OFFSETS:?}"
        )))
    }
}

fn check_order(value: &String) -> Result<()> {
    if STACK_ORDERS.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!("order must be one of {STACK_ORDERS:?}")))
    }
}

fn check_shape(value: &String) -> Result<()> {
    if LINK_SHAPES.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Link shape must be one of {LINK_SHAPES:?}"
        )))
    }
}

fn check_center(value: &Vec<Value>) -> Result<()> {
    if value.len() == 2 {
        Ok(())
    } else {
        Err(Error::invalid("len(center) must = 2"))
    }
}

fn check_translate(value: &Vec<Value>) -> Result<()> {
    if value.len() == 2 {
        Ok(())
    } else {
        Err(Error::invalid("len(translate) must = 2"))
    }
}

fn check_scale(value: &i64) -> Result<()> {
    if *value < 0 {
        Err(Error::invalid("Scale cannot be negative."))
    } else {
        Ok(())
    }
}

fn check_rotate(value: &Value) -> Result<()> {
    match value.as_i64() {
        Some(rotation) if rotation < 0 => Err(Error::invalid("The rotation cannot be negative.")),
        _ => Ok(()),
    }
}

crate::grammar_class! {
    /// A data transform.
    pub struct Transform {
        kind: String = "type" => check_transform_type;

        // array, copy
        fields: Vec<Value> = "fields";
        /// Serialized as `from`.
        from_field: String = "from";
        /// Output field name(s). Serialized as `as`.
        alias: Value = "as" [Kind::List, Kind::Str];

        // facet
        keys: Vec<Value> = "keys";
        sort: String = "sort";

        // filter
        test: String = "test";

        // formula, unique
        field: String = "field";
        expr: String = "expr";

        // sort
        by: Value = "by" [Kind::Str, Kind::List];

        // stats
        value: String = "value";
        median: bool = "median";
        assign: bool = "assign";

        // zip
        /// Name of the secondary data set. Serialized as `with`.
        zip_with: String = "with";
        key: String = "key";
        /// Serialized as `withKey`.
        zip_with_key: String = "withKey";
        /// Serialized as `default`.
        default_value: Value = "default" [Kind::Int, Kind::Float, Kind::Str];

        // force
        links: String = "links";
        size: Value = "size" [Kind::Int, Kind::List];
        iterations: i64 = "iterations";
        charge: Value = "charge" [Kind::Int, Kind::Str];
        link_distance: Value = "linkDistance" [Kind::Int, Kind::Str];
        link_strength: Value = "linkStrength" [Kind::Int, Kind::Str];
        friction: Value = "friction" [Kind::Int, Kind::Float];
        theta: Value = "theta" [Kind::Int, Kind::Float];
        gravity: Value = "gravity" [Kind::Int, Kind::Float];
        alpha: Value = "alpha" [Kind::Int, Kind::Float];

        // stack
        point: String = "point";
        height: String = "height";
        offset: String = "offset" => check_offset;
        order: String = "order" => check_order;

        // geo, geopath
        projection: String = "projection";
        center: Vec<Value> = "center" => check_center;
        translate: Vec<Value> = "translate" => check_translate;
        scale: i64 = "scale" => check_scale;
        rotate: Value = "rotate" [Kind::Int, Kind::Str, Kind::Map] => check_rotate;
        precision: Value = "precision" [Kind::Int, Kind::Float];
        clip_angle: Value = "clipAngle" [Kind::Int, Kind::Float];
        lon: String = "lon";
        lat: String = "lat";

        // link
        source: String = "source";
        target: String = "target";
        shape: String = "shape" => check_shape;

        // pie
        // (uses `value` and `sort`)

        // truncate
        output: String = "output";
        limit: i64 = "limit";
        ellipsis: String = "ellipsis";
        wordbreak: bool = "wordbreak";

        // window
        step: Value = "step" [Kind::Int, Kind::Float];

        // wordcloud
        font: String = "font";
        font_size: String = "fontSize";
        font_weight: String = "fontWeight";
        text: String = "text";
        padding: Value = "padding" [Kind::Int, Kind::List];

        // treemap
        diagonal: bool = "diagonal";
    }
}

impl Transform {
    pub fn of_kind(kind: &str) -> Result<Self> {
        Self::new().with_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;

    #[test]
    fn type_vocabulary() {
        Transform::of_kind("wordcloud").unwrap();
        Transform::of_kind("aggregate").unwrap();
        let err = Transform::of_kind("explode").unwrap_err();
        assert!(err.to_string().starts_with("Transform type must be one of"));
    }

    #[test]
    fn stack_checks() {
        let mut stack = Transform::of_kind("stack").unwrap();
        stack
            .set_point("data.idx")
            .unwrap()
            .set_height("data.val")
            .unwrap()
            .set_offset("silhouette")
            .unwrap();

        let err = stack.set_offset("sideways").unwrap_err();
        assert!(err.to_string().starts_with("offset must be one of"));
        let err = stack.set_order("random").unwrap_err();
        assert!(err.to_string().starts_with("order must be one of"));
        assert_eq!(stack.offset().unwrap(), "silhouette");
    }

    #[test]
    fn geo_checks() {
        let mut geo = Transform::of_kind("geopath").unwrap();
        geo.set_translate(vec![json!(480), json!(250)]).unwrap();
        geo.set_scale(100).unwrap();
        geo.set_rotate(json!(-30)).unwrap_err();
        geo.set_rotate(json!({"lambda": 10})).unwrap();

        let err = geo.set_center(vec![json!(1)]).unwrap_err();
        assert_eq!(err.to_string(), "len(center) must = 2");
        let err = geo.set_scale(-1).unwrap_err();
        assert_eq!(err.to_string(), "Scale cannot be negative.");
    }

    #[test]
    fn keyword_fields_use_grammar_keys() {
        let zip = Transform::of_kind("zip")
            .unwrap()
            .with_zip_with("geo")
            .unwrap()
            .with_key("data.id")
            .unwrap()
            .with_zip_with_key("id")
            .unwrap()
            .with_alias("value")
            .unwrap()
            .with_default_value("noval")
            .unwrap();

        assert_eq!(
            zip.to_json(),
            json!({
                "type": "zip",
                "with": "geo",
                "key": "data.id",
                "withKey": "id",
                "as": "value",
                "default": "noval"
            })
        );
    }

    #[test]
    fn link_shapes() {
        let mut link = Transform::of_kind("link").unwrap();
        link.set_shape("diagonalX").unwrap();
        assert!(link.set_shape("zigzag").is_err());
    }
}
