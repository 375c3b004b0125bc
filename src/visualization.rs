//! The root of the grammar: a whole visualization.

use serde_json::Value;
use tracing::*;

use crate::axes::{Axis, AxisProperties};
use crate::colors::palette;
use crate::data::Data;
use crate::error::{Error, Result};
use crate::grammar::{Field, GrammarObject, Kind};
use crate::keyed_list::{KeyAttr, Keyed, KeyedList};
use crate::legends::{Legend, LegendProperties};
use crate::marks::Mark;
use crate::properties::PropertySet;
use crate::scales::Scale;
use crate::values::ValueRef;

const PADDING_SIDES: [&str; 4] = ["top", "left", "right", "bottom"];

fn check_width(value: &i64) -> Result<()> {
    if *value < 0 {
        Err(Error::invalid("width cannot be negative"))
    } else {
        Ok(())
    }
}

fn check_height(value: &i64) -> Result<()> {
    if *value < 0 {
        Err(Error::invalid("height cannot be negative"))
    } else {
        Ok(())
    }
}

fn check_viewport(value: &Vec<Value>) -> Result<()> {
    if value.len() != 2 {
        return Err(Error::invalid("viewport must have 2 dimensions"));
    }
    for dimension in value {
        let Some(n) = dimension.as_i64() else {
            return Err(Error::mismatch("viewport dimension", &[Kind::Int]));
        };
        if n < 0 {
            return Err(Error::invalid("viewport dimensions cannot be negative"));
        }
    }
    Ok(())
}

fn check_padding(value: &Value) -> Result<()> {
    match value {
        Value::Object(sides) => {
            for side in PADDING_SIDES {
                let Some(pad) = sides.get(side) else {
                    return Err(Error::invalid(format!(
                        "Padding must have keys \"{}\".",
                        PADDING_SIDES.join("\", \"")
                    )));
                };
                match pad.as_i64() {
                    None => return Err(Error::mismatch(format!("padding: {side}"), &[Kind::Int])),
                    Some(n) if n < 0 => return Err(Error::invalid("Padding cannot be negative.")),
                    Some(_) => {}
                }
            }
            Ok(())
        }
        Value::String(s) if s != "auto" && s != "strict" => {
            Err(Error::invalid("Padding can only be auto or strict."))
        }
        _ => match value.as_i64() {
            Some(n) if n < 0 => Err(Error::invalid("Padding cannot be negative.")),
            _ => Ok(()),
        },
    }
}

fn init_collections(vis: &mut Visualization) {
    vis.grammar
        .get_or_insert_with(&Visualization::DATA, || KeyedList::new("name"));
    vis.grammar
        .get_or_insert_with(&Visualization::SCALES, || KeyedList::new("name"));
    vis.grammar
        .get_or_insert_with(&Visualization::AXES, || KeyedList::new("type"));
    vis.grammar
        .get_or_insert_with(&Visualization::MARKS, || KeyedList::new("type"));
    vis.grammar.get_or_insert_with(&Visualization::LEGENDS, Vec::new);
}

fn require_unique_names<T: Keyed>(collection: &str, items: Option<&KeyedList<T>>) -> Result<()> {
    let names: Vec<Option<&str>> = items
        .into_iter()
        .flatten()
        .map(|item| match item.key_attr("name") {
            KeyAttr::Set(name) => Some(name),
            KeyAttr::Missing | KeyAttr::Unset => None,
        })
        .collect();
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(Error::Validation(format!("{collection} has duplicate names")));
        }
    }
    Ok(())
}

fn require_defined<T>(collection: &str, items: Option<&KeyedList<T>>) -> Result<()> {
    match items {
        Some(items) if !items.is_empty() => Ok(()),
        _ => Err(Error::Validation(format!(
            "{collection} must be defined for valid visualization"
        ))),
    }
}

fn validate_visualization(vis: &Visualization) -> Result<()> {
    require_defined("data", vis.data())?;
    require_unique_names("data", vis.data())?;
    require_unique_names("scales", vis.scales())?;
    Ok(())
}

crate::grammar_class! {
    /// A complete visualization: data, the scales mapping it, the axes and legends describing
    /// those scales and the marks drawing it.
    ///
    /// A new visualization starts with empty `data`, `scales`, `axes`, `marks` and `legends`.
    pub struct Visualization init init_collections validate validate_visualization {
        name: String = "name";
        width: i64 = "width" => check_width;
        height: i64 = "height" => check_height;
        /// Bounding box of the visible area, `[width, height]`.
        viewport: Vec<Value> = "viewport" => check_viewport;
        /// An int, a `{top, left, right, bottom}` object or `"auto"`/`"strict"`.
        padding: Value = "padding" [Kind::Int, Kind::Map, Kind::Str] => check_padding;
        data: KeyedList<Data> = "data";
        scales: KeyedList<Scale> = "scales";
        axes: KeyedList<Axis> = "axes";
        marks: KeyedList<Mark> = "marks";
        legends: Vec<Legend> = "legends";
    }
}

/// Where [`Visualization::colors`] takes the color scale's range from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScheme {
    /// A named palette.
    Brew(String),
    Range(Vec<String>),
}

/// Styling applied by the axis property helpers. Unset options leave the axis alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisStyle {
    pub title_size: Option<i64>,
    pub title_offset: Option<i64>,
    pub label_angle: Option<i64>,
    pub label_align: Option<String>,
    pub color: Option<String>,
}

fn style_part(
    properties: &mut AxisProperties,
    field: &Field<PropertySet>,
    apply: impl FnOnce(&mut PropertySet) -> Result<()>,
) -> Result<()> {
    let mut part = properties.grammar().get(field).cloned().unwrap_or_default();
    apply(&mut part)?;
    properties.grammar_mut().set(field, part)
}

fn style_axis(axis: &mut Axis, style: &AxisStyle) -> Result<()> {
    let mut properties = axis.properties().cloned().unwrap_or_default();
    let color = style.color.as_deref();

    for field in [
        &AxisProperties::TICKS,
        &AxisProperties::AXIS,
        &AxisProperties::MAJOR_TICKS,
        &AxisProperties::MINOR_TICKS,
    ] {
        style_part(&mut properties, field, |part| {
            if let Some(color) = color {
                part.set_stroke(ValueRef::literal(color)?)?;
            }
            Ok(())
        })?;
    }

    style_part(&mut properties, &AxisProperties::TITLE, |title| {
        if let Some(color) = color {
            title.set_fill(ValueRef::literal(color)?)?;
        }
        if let Some(size) = style.title_size {
            title.set_font_size(ValueRef::literal(size)?)?;
        }
        if let Some(offset) = style.title_offset {
            title.set_dy(ValueRef::literal(offset)?)?;
        }
        Ok(())
    })?;

    style_part(&mut properties, &AxisProperties::LABELS, |labels| {
        if let Some(color) = color {
            labels.set_fill(ValueRef::literal(color)?)?;
        }
        if let Some(angle) = style.label_angle {
            labels.set_angle(ValueRef::literal(angle)?)?;
        }
        if let Some(align) = &style.label_align {
            labels.set_align(ValueRef::literal(align.as_str())?)?;
        }
        Ok(())
    })?;

    axis.set_properties(properties)?;
    Ok(())
}

impl Visualization {
    fn axes_or_default(&mut self) -> &mut KeyedList<Axis> {
        self.grammar
            .get_or_insert_with(&Self::AXES, || KeyedList::new("type"))
    }

    fn defined_axes(&mut self) -> Result<&mut KeyedList<Axis>> {
        self.axes_mut()
            .filter(|axes| !axes.is_empty())
            .ok_or_else(|| Error::invalid("This Visualization has no axes!"))
    }

    /// Whether a scale named `name` is defined. Two scales sharing a name is an error, not a
    /// match.
    pub fn has_scale(&self, name: &str) -> Result<bool> {
        match self.scales() {
            Some(scales) => scales.contains_key(name),
            None => Ok(false),
        }
    }

    pub fn push_data(&mut self, data: Data) -> &mut Self {
        self.grammar
            .get_or_insert_with(&Self::DATA, || KeyedList::new("name"))
            .push(data);
        self
    }

    pub fn push_scale(&mut self, scale: Scale) -> &mut Self {
        self.grammar
            .get_or_insert_with(&Self::SCALES, || KeyedList::new("name"))
            .push(scale);
        self
    }

    pub fn push_axis(&mut self, axis: Axis) -> &mut Self {
        self.axes_or_default().push(axis);
        self
    }

    pub fn push_mark(&mut self, mark: Mark) -> &mut Self {
        self.grammar
            .get_or_insert_with(&Self::MARKS, || KeyedList::new("type"))
            .push(mark);
        self
    }

    pub fn push_legend(&mut self, legend: Legend) -> &mut Self {
        self.grammar
            .get_or_insert_with(&Self::LEGENDS, Vec::new)
            .push(legend);
        self
    }

    /// Title the x and y axes, adding both axes first if there are none.
    pub fn axis_titles(&mut self, x: Option<&str>, y: Option<&str>) -> Result<&mut Self> {
        let axes = self.axes_or_default();
        if axes.is_empty() {
            for (kind, title) in [("x", x), ("y", y)] {
                let mut axis = Axis::new().with_kind(kind)?;
                if let Some(title) = title {
                    axis.set_title(title)?;
                }
                axes.push(axis);
            }
            return Ok(self);
        }

        for axis in axes.iter_mut() {
            let title = match axis.kind().map(String::as_str) {
                Some("x") => x,
                Some("y") => y,
                _ => None,
            };
            if let Some(title) = title {
                axis.set_title(title)?;
            }
        }
        Ok(self)
    }

    /// Add a legend for `scale` (usually `"color"`), optionally coloring its title and labels.
    pub fn legend(
        &mut self,
        title: Option<&str>,
        scale: &str,
        text_color: Option<&str>,
    ) -> Result<&mut Self> {
        let mut properties = LegendProperties::new();
        if let Some(color) = text_color {
            let text = PropertySet::new().with_fill(ValueRef::literal(color)?)?;
            properties.set_labels(text.clone())?.set_title(text)?;
        }

        let mut legend = Legend::new()
            .with_fill(scale)?
            .with_offset(0)?
            .with_properties(properties)?;
        if let Some(title) = title {
            legend.set_title(title)?;
        }
        Ok(self.push_legend(legend))
    }

    /// Set the range of the `color` scale.
    pub fn colors(&mut self, scheme: ColorScheme) -> Result<&mut Self> {
        let range: Vec<Value> = match &scheme {
            ColorScheme::Brew(name) => palette(name)?.iter().map(|c| Value::from(*c)).collect(),
            ColorScheme::Range(colors) => colors.iter().map(|c| Value::from(c.as_str())).collect(),
        };
        debug!(?scheme, "coloring the color scale");

        self.grammar
            .get_or_insert_with(&Self::SCALES, || KeyedList::new("name"))
            .get_by_key_mut("color")?
            .set_range(Value::Array(range))?;
        Ok(self)
    }

    /// Apply `color` and `title_size` to every axis.
    pub fn common_axis_properties(
        &mut self,
        color: Option<&str>,
        title_size: Option<i64>,
    ) -> Result<&mut Self> {
        let style = AxisStyle {
            color: color.map(str::to_owned),
            title_size,
            ..AxisStyle::default()
        };
        for axis in self.defined_axes()?.iter_mut() {
            style_axis(axis, &style)?;
        }
        Ok(self)
    }

    /// Style the axis over the `x` scale.
    pub fn x_axis_properties(&mut self, style: &AxisStyle) -> Result<&mut Self> {
        self.style_axis_on("x", style)
    }

    /// Style the axis over the `y` scale.
    pub fn y_axis_properties(&mut self, style: &AxisStyle) -> Result<&mut Self> {
        self.style_axis_on("y", style)
    }

    fn style_axis_on(&mut self, scale: &str, style: &AxisStyle) -> Result<&mut Self> {
        let axis = self
            .defined_axes()?
            .iter_mut()
            .find(|axis| axis.scale().is_some_and(|s| s == scale))
            .ok_or_else(|| Error::invalid(format!("no axis uses the \"{scale}\" scale")))?;
        style_axis(axis, style)?;
        Ok(self)
    }

    /// Like `validate()`, but `scales`, `axes` and `marks` must be non-empty too.
    pub fn validate_complete(&self) -> Result<()> {
        crate::grammar::GrammarValue::validate(self)?;
        require_defined("scales", self.scales())?;
        require_defined("axes", self.axes())?;
        require_defined("marks", self.marks())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;

    fn color_scale() -> Scale {
        Scale::new()
            .with_name("color")
            .unwrap()
            .with_kind("ordinal")
            .unwrap()
    }

    #[test]
    fn starts_with_empty_collections() {
        let vis = Visualization::new();
        assert_eq!(
            vis.to_json_value(),
            json!({"data": [], "scales": [], "axes": [], "marks": [], "legends": []})
        );
        assert_eq!(vis.axes().unwrap().attr(), "type");
        assert_eq!(vis.scales().unwrap().attr(), "name");
    }

    #[test]
    fn data_is_required() {
        let mut vis = Visualization::new();
        let err = vis.validate().unwrap_err();
        assert_eq!(err.to_string(), "data must be defined for valid visualization");

        vis.push_data(Data::named(None));
        vis.validate().unwrap();
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut vis = Visualization::new();
        vis.push_data(Data::named(Some("table")))
            .push_data(Data::named(Some("table")));
        let err = vis.validate().unwrap_err();
        assert_eq!(err.to_string(), "data has duplicate names");

        let mut vis = Visualization::new();
        vis.push_data(Data::named(None))
            .push_scale(color_scale())
            .push_scale(color_scale());
        let err = vis.validate().unwrap_err();
        assert_eq!(err.to_string(), "scales has duplicate names");
    }

    #[test]
    fn has_scale_reports_duplicates() {
        let mut vis = Visualization::new();
        assert!(!vis.has_scale("color").unwrap());

        vis.push_scale(color_scale());
        assert!(vis.has_scale("color").unwrap());
        assert!(!vis.has_scale("x").unwrap());

        vis.push_scale(color_scale());
        assert!(matches!(vis.has_scale("color"), Err(Error::DuplicateKey)));
    }

    #[test]
    fn validate_walks_children() {
        let mut vis = Visualization::new();
        vis.push_data(Data::new());
        let err = vis.validate().unwrap_err();
        assert_eq!(err.to_string(), "name is required for Data");
    }

    #[test]
    fn complete_requires_every_collection() {
        let mut vis = Visualization::new();
        vis.push_data(Data::named(None)).push_scale(color_scale());
        let err = vis.validate_complete().unwrap_err();
        assert_eq!(err.to_string(), "axes must be defined for valid visualization");
    }

    #[test]
    fn padding_shapes() {
        let mut vis = Visualization::new();
        vis.set_padding(10).unwrap();
        vis.set_padding("auto").unwrap();
        vis.set_padding(json!({"top": 10, "left": 50, "bottom": 50, "right": 100}))
            .unwrap();

        let err = vis.set_padding(json!({"top": 10})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Padding must have keys \"top\", \"left\", \"right\", \"bottom\"."
        );
        let err = vis.set_padding(-1).unwrap_err();
        assert_eq!(err.to_string(), "Padding cannot be negative.");
        let err = vis.set_padding("loose").unwrap_err();
        assert_eq!(err.to_string(), "Padding can only be auto or strict.");
        let err = vis.set_padding(1.5).unwrap_err();
        assert_eq!(err.to_string(), "padding must be one of (int, dict, str)");

        assert_eq!(vis.padding().unwrap()["right"], json!(100));
    }

    #[test]
    fn size_and_viewport() {
        let mut vis = Visualization::new();
        vis.set_width(300).unwrap();
        assert_eq!(vis.set_width(-1).unwrap_err().to_string(), "width cannot be negative");
        vis.set_viewport(vec![json!(200), json!(100)]).unwrap();
        assert!(vis.set_viewport(vec![json!(1)]).is_err());
        assert!(vis.set_viewport(vec![json!(-1), json!(1)]).is_err());
    }

    #[test]
    fn axis_titles_adds_missing_axes() {
        let mut vis = Visualization::new();
        vis.axis_titles(Some("Days"), Some("Count")).unwrap();
        assert_eq!(
            vis.axes().unwrap().to_json(),
            json!([{"type": "x", "title": "Days"}, {"type": "y", "title": "Count"}])
        );

        vis.axis_titles(None, Some("Total")).unwrap();
        let axes = vis.axes().unwrap();
        assert_eq!(axes.get_by_key("x").unwrap().title().unwrap(), "Days");
        assert_eq!(axes.get_by_key("y").unwrap().title().unwrap(), "Total");
    }

    #[test]
    fn legend_with_text_color() {
        let mut vis = Visualization::new();
        vis.legend(Some("Series"), "color", Some("#333")).unwrap();
        assert_eq!(
            vis.legends().unwrap()[0].to_json(),
            json!({
                "fill": "color",
                "offset": 0,
                "properties": {
                    "labels": {"fill": {"value": "#333"}},
                    "title": {"fill": {"value": "#333"}}
                },
                "title": "Series"
            })
        );
    }

    #[test]
    fn colors_from_palette_or_range() {
        let mut vis = Visualization::new();
        vis.push_scale(color_scale());

        vis.colors(ColorScheme::Brew("Set2".to_owned())).unwrap();
        let range = vis.scales().unwrap().get_by_key("color").unwrap().range().unwrap();
        assert_eq!(range[0], json!("#66c2a5"));

        vis.colors(ColorScheme::Range(vec!["#fff".to_owned()])).unwrap();
        let range = vis.scales().unwrap().get_by_key("color").unwrap().range().unwrap();
        assert_eq!(range, &json!(["#fff"]));

        let err = vis.colors(ColorScheme::Brew("Nope".to_owned())).unwrap_err();
        assert!(matches!(err, Error::PaletteNotFound(_)));

        let mut bare = Visualization::new();
        let err = bare.colors(ColorScheme::Range(vec![])).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[test]
    fn axis_properties() {
        let mut vis = Visualization::new();
        let err = vis.common_axis_properties(Some("#999"), None).unwrap_err();
        assert_eq!(err.to_string(), "This Visualization has no axes!");

        vis.push_axis(Axis::for_scale("x", "x").unwrap())
            .push_axis(Axis::for_scale("y", "y").unwrap());
        vis.common_axis_properties(Some("#999"), Some(20)).unwrap();
        vis.x_axis_properties(&AxisStyle {
            label_angle: Some(45),
            label_align: Some("left".to_owned()),
            title_offset: Some(20),
            ..AxisStyle::default()
        })
        .unwrap();

        let x = vis.axes().unwrap().get_by_key("x").unwrap();
        assert_eq!(
            x.properties().unwrap().to_json(),
            json!({
                "ticks": {"stroke": {"value": "#999"}},
                "axis": {"stroke": {"value": "#999"}},
                "majorTicks": {"stroke": {"value": "#999"}},
                "minorTicks": {"stroke": {"value": "#999"}},
                "title": {
                    "fill": {"value": "#999"},
                    "fontSize": {"value": 20},
                    "dy": {"value": 20}
                },
                "labels": {
                    "fill": {"value": "#999"},
                    "angle": {"value": 45},
                    "align": {"value": "left"}
                }
            })
        );

        let err = vis
            .y_axis_properties(&AxisStyle {
                label_align: Some("middle".to_owned()),
                ..AxisStyle::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "middle is not a valid alignment");
    }

    #[test]
    fn round_trips_through_json() {
        let document = json!({
            "name": "demo",
            "width": 400,
            "data": [{"name": "table", "values": [{"x": 1, "y": 2}]}],
            "scales": [{"name": "x", "type": "linear", "domain": {"data": "table", "field": "data.x"}}],
            "axes": [{"type": "x", "scale": "x"}],
            "marks": [{"type": "symbol", "from": {"data": "table"}}]
        });
        let vis = Visualization::from_json(document.clone()).unwrap();
        vis.validate().unwrap();
        assert_eq!(vis.name().unwrap(), "demo");
        assert_eq!(vis.marks().unwrap().attr(), "type");
        assert_eq!(vis.to_json_value()["scales"], document["scales"]);

        let err = Visualization::from_json(json!({"widht": 10})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown field \"widht\" for Visualization, did you mean \"width\"?"
        );
    }
}
