//! Chart templates: fully populated visualizations over long-form data.
//!
//! Every template reads the rows produced by the [`Data`] loaders through `data.idx`,
//! `data.col` and `data.val`.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::*;

use crate::axes::Axis;
use crate::colors::palette;
use crate::data::{Data, DEFAULT_DATA_NAME, DEFAULT_INDEX_KEY};
use crate::error::{Error, Result};
use crate::keyed_list::KeyedList;
use crate::marks::{Mark, MarkProperties, MarkRef};
use crate::properties::PropertySet;
use crate::scales::Scale;
use crate::transforms::Transform;
use crate::values::{DataRef, ValueRef};
use crate::visualization::Visualization;

const IDX: &str = "data.idx";
const COL: &str = "data.col";
const VAL: &str = "data.val";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: i64,
    pub height: i64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
        }
    }
}

/// The templates that can be built from data alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Area,
    StackedBar,
    StackedArea,
    GroupedBar,
    Pie,
    Word,
}

impl ChartKind {
    pub const ALL: &'static [ChartKind] = &[
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::StackedBar,
        ChartKind::StackedArea,
        ChartKind::GroupedBar,
        ChartKind::Pie,
        ChartKind::Word,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::StackedBar => "stacked-bar",
            ChartKind::StackedArea => "stacked-area",
            ChartKind::GroupedBar => "grouped-bar",
            ChartKind::Pie => "pie",
            ChartKind::Word => "word",
        }
    }

    pub fn build(self, data: Data, options: &ChartOptions) -> Result<Visualization> {
        debug!(kind = self.name(), "building chart");
        match self {
            ChartKind::Bar => bar(data, options),
            ChartKind::Line => line(data, options),
            ChartKind::Scatter => scatter(data, options),
            ChartKind::Area => area(data, options),
            ChartKind::StackedBar => stacked_bar(data, options),
            ChartKind::StackedArea => stacked_area(data, options),
            ChartKind::GroupedBar => grouped_bar(data, options),
            ChartKind::Pie => pie(data, options, 0),
            ChartKind::Word => word(data, options),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChartKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ChartKind::ALL.iter().map(|kind| kind.name()).collect();
                Error::invalid(format!(
                    "{s} is not a chart type (must be one of {})",
                    names.join(", ")
                ))
            })
    }
}

/// Whether the first row is indexed by text, in which case x is an ordinal scale.
fn has_text_index(data: &Data) -> bool {
    data.values()
        .and_then(|rows| rows.first())
        .and_then(|row| row.get(DEFAULT_INDEX_KEY))
        .is_some_and(Value::is_string)
}

/// A visualization holding `data`, plus the name to reference it by.
fn chart(data: Data, options: &ChartOptions) -> Result<(Visualization, String)> {
    let table = data
        .name()
        .cloned()
        .unwrap_or_else(|| DEFAULT_DATA_NAME.to_owned());

    let mut vis = Visualization::new();
    vis.set_width(options.width)?
        .set_height(options.height)?
        .set_padding(json!({"top": 10, "left": 50, "bottom": 50, "right": 100}))?;
    vis.push_data(data);
    Ok((vis, table))
}

fn xy_axes(vis: &mut Visualization) -> Result<()> {
    vis.push_axis(Axis::for_scale("x", "x")?)
        .push_axis(Axis::for_scale("y", "y")?);
    Ok(())
}

fn index_scale(table: &str, ordinal: bool) -> Result<Scale> {
    let mut scale = Scale::new()
        .with_name("x")?
        .with_range("width")?
        .with_domain(DataRef::to(table, IDX)?)?;
    if ordinal {
        scale.set_kind("ordinal")?.set_points(true)?;
    } else {
        scale.set_kind("linear")?.set_zero(false)?;
    }
    Ok(scale)
}

fn value_scale(table: &str) -> Result<Scale> {
    Scale::new()
        .with_name("y")?
        .with_range("height")?
        .with_nice(true)?
        .with_domain(DataRef::to(table, VAL)?)
}

fn color_scale(table: &str, field: &str, range: impl Into<Value>) -> Result<Scale> {
    Scale::new()
        .with_name("color")?
        .with_kind("ordinal")?
        .with_domain(DataRef::to(table, field)?)?
        .with_range(range)
}

fn band(scale: &str) -> Result<ValueRef> {
    ValueRef::new().with_scale(scale)?.with_band(true)
}

fn facet(field: &str) -> Result<Transform> {
    Transform::of_kind("facet")?.with_keys(vec![Value::from(field)])
}

/// A group mark drawing one `inner` mark per column.
fn per_column(table: &str, inner: Mark) -> Result<Mark> {
    Mark::of_kind("group")?
        .with_source(
            MarkRef::new()
                .with_data(table)?
                .with_transform(vec![facet(COL)?])?,
        )?
        .with_marks(vec![inner])
}

fn entered(mark: &str, enter: PropertySet) -> Result<Mark> {
    Mark::of_kind(mark)?.with_properties(MarkProperties::new().with_enter(enter)?)
}

pub fn bar(data: Data, options: &ChartOptions) -> Result<Visualization> {
    let (mut vis, table) = chart(data, options)?;

    vis.push_scale(
        Scale::new()
            .with_name("x")?
            .with_kind("ordinal")?
            .with_range("width")?
            .with_domain(DataRef::to(&table, IDX)?)?,
    )
    .push_scale(value_scale(&table)?);
    xy_axes(&mut vis)?;

    let enter = PropertySet::new()
        .with_x(ValueRef::scaled("x", IDX)?)?
        .with_y(ValueRef::scaled("y", VAL)?)?
        .with_width(band("x")?.with_offset(-1)?)?
        .with_y2(ValueRef::literal(0)?.with_scale("y")?)?;
    let update = PropertySet::new().with_fill(ValueRef::literal("steelblue")?)?;

    let rect = Mark::of_kind("rect")?
        .with_source(MarkRef::new().with_data(&table)?)?
        .with_properties(
            MarkProperties::new()
                .with_enter(enter)?
                .with_update(update)?,
        )?;
    vis.push_mark(rect);
    Ok(vis)
}

/// Shared shape of line, scatter and area charts: one mark per column over x/y/color scales.
fn per_column_chart(
    data: Data,
    options: &ChartOptions,
    build: impl FnOnce(PropertySet) -> Result<Mark>,
) -> Result<Visualization> {
    let ordinal = has_text_index(&data);
    let (mut vis, table) = chart(data, options)?;

    vis.push_scale(index_scale(&table, ordinal)?)
        .push_scale(value_scale(&table)?)
        .push_scale(color_scale(&table, COL, "category20")?);
    xy_axes(&mut vis)?;

    let enter = PropertySet::new()
        .with_x(ValueRef::scaled("x", IDX)?)?
        .with_y(ValueRef::scaled("y", VAL)?)?;
    vis.push_mark(per_column(&table, build(enter)?)?);
    Ok(vis)
}

pub fn line(data: Data, options: &ChartOptions) -> Result<Visualization> {
    per_column_chart(data, options, |enter| {
        entered(
            "line",
            enter
                .with_stroke(ValueRef::scaled("color", COL)?)?
                .with_stroke_width(ValueRef::literal(2)?)?,
        )
    })
}

pub fn scatter(data: Data, options: &ChartOptions) -> Result<Visualization> {
    per_column_chart(data, options, |enter| {
        entered(
            "symbol",
            enter
                .with_fill(ValueRef::scaled("color", COL)?)?
                .with_size(ValueRef::literal(100)?)?,
        )
    })
}

pub fn area(data: Data, options: &ChartOptions) -> Result<Visualization> {
    per_column_chart(data, options, |enter| {
        entered(
            "area",
            enter
                .with_y2(ValueRef::literal(0)?.with_scale("y")?)?
                .with_fill(ValueRef::scaled("color", COL)?)?
                .with_interpolate(ValueRef::literal("monotone")?)?,
        )
    })
}

/// Per-index sums of the values, for the domain of stacked charts.
fn stack_stats(table: &str, name: &str) -> Result<Data> {
    let stats = Transform::of_kind("stats")?.with_value(VAL)?;
    Data::named(Some(name))
        .with_source(table)?
        .with_transform(vec![facet(IDX)?, stats])
}

/// `stats`, unless the table already has that name.
fn stats_name(table: &str) -> String {
    if table == "stats" {
        format!("{table}_stats")
    } else {
        "stats".to_owned()
    }
}

/// Shared shape of stacked charts: columns stacked on the index.
fn stacked(
    data: Data,
    options: &ChartOptions,
    x: Scale,
    enter: PropertySet,
    mark: &str,
) -> Result<Visualization> {
    let (mut vis, table) = chart(data, options)?;
    let stats = stats_name(&table);
    vis.push_data(stack_stats(&table, &stats)?);

    vis.push_scale(x.with_domain(DataRef::to(&table, IDX)?)?)
        .push_scale(
            Scale::new()
                .with_name("y")?
                .with_kind("linear")?
                .with_range("height")?
                .with_nice(true)?
                .with_domain(DataRef::to(&stats, "sum")?)?,
        )
        .push_scale(color_scale(&table, COL, "category20")?);
    xy_axes(&mut vis)?;

    let stack = Transform::of_kind("stack")?
        .with_point(IDX)?
        .with_height(VAL)?;
    let enter = enter
        .with_x(ValueRef::scaled("x", IDX)?)?
        .with_y(ValueRef::scaled("y", "y")?)?
        .with_y2(ValueRef::scaled("y", "y2")?)?
        .with_fill(ValueRef::scaled("color", COL)?)?;

    let group = Mark::of_kind("group")?
        .with_source(
            MarkRef::new()
                .with_data(&table)?
                .with_transform(vec![facet(COL)?, stack])?,
        )?
        .with_marks(vec![entered(mark, enter)?])?;
    vis.push_mark(group);
    Ok(vis)
}

pub fn stacked_bar(data: Data, options: &ChartOptions) -> Result<Visualization> {
    let x = Scale::new()
        .with_name("x")?
        .with_kind("ordinal")?
        .with_range("width")?;
    let enter = PropertySet::new().with_width(band("x")?.with_offset(-1)?)?;
    stacked(data, options, x, enter, "rect")
}

pub fn stacked_area(data: Data, options: &ChartOptions) -> Result<Visualization> {
    let x = if has_text_index(&data) {
        Scale::new()
            .with_name("x")?
            .with_kind("ordinal")?
            .with_points(true)?
            .with_range("width")?
    } else {
        Scale::new()
            .with_name("x")?
            .with_kind("linear")?
            .with_zero(false)?
            .with_range("width")?
    };
    let enter = PropertySet::new().with_interpolate(ValueRef::literal("monotone")?)?;
    stacked(data, options, x, enter, "area")
}

pub fn grouped_bar(data: Data, options: &ChartOptions) -> Result<Visualization> {
    let (mut vis, table) = chart(data, options)?;

    vis.push_scale(
        Scale::new()
            .with_name("x")?
            .with_kind("ordinal")?
            .with_range("width")?
            .with_padding(0.2)?
            .with_domain(DataRef::to(&table, IDX)?)?,
    )
    .push_scale(value_scale(&table)?)
    .push_scale(color_scale(&table, COL, "category20")?);
    xy_axes(&mut vis)?;

    let position = Scale::new()
        .with_name("pos")?
        .with_kind("ordinal")?
        .with_range("width")?
        .with_domain(DataRef::to(&table, COL)?)?;

    let bars = entered(
        "rect",
        PropertySet::new()
            .with_x(ValueRef::scaled("pos", COL)?)?
            .with_width(band("pos")?.with_offset(-1)?)?
            .with_y(ValueRef::scaled("y", VAL)?)?
            .with_y2(ValueRef::literal(0)?.with_scale("y")?)?
            .with_fill(ValueRef::scaled("color", COL)?)?,
    )?;

    let group = Mark::of_kind("group")?
        .with_source(
            MarkRef::new()
                .with_data(&table)?
                .with_transform(vec![facet(IDX)?])?,
        )?
        .with_properties(
            MarkProperties::new().with_enter(
                PropertySet::new()
                    .with_x(ValueRef::scaled("x", "key")?)?
                    .with_width(band("x")?)?,
            )?,
        )?
        .with_scales(KeyedList::from(vec![position]))?
        .with_marks(vec![bars])?;
    vis.push_mark(group);
    Ok(vis)
}

/// A pie (or donut, with a positive `inner_radius`) filling the smaller of width and height.
pub fn pie(data: Data, options: &ChartOptions, inner_radius: i64) -> Result<Visualization> {
    let (mut vis, table) = chart(data, options)?;
    let outer_radius = options.width.min(options.height) / 2;

    vis.push_scale(color_scale(&table, IDX, "category10")?);

    let center = |dimension: &str| -> Result<ValueRef> {
        ValueRef::new().with_group(dimension)?.with_mult(0.5)
    };
    let enter = PropertySet::new()
        .with_x(center("width")?)?
        .with_y(center("height")?)?
        .with_start_angle(ValueRef::new().with_field("startAngle")?)?
        .with_end_angle(ValueRef::new().with_field("endAngle")?)?
        .with_inner_radius(ValueRef::literal(inner_radius)?)?
        .with_outer_radius(ValueRef::literal(outer_radius)?)?
        .with_stroke(ValueRef::literal("white")?)?
        .with_fill(ValueRef::scaled("color", IDX)?)?;

    let arcs = entered("arc", enter)?.with_source(
        MarkRef::new()
            .with_data(&table)?
            .with_transform(vec![Transform::of_kind("pie")?.with_value(VAL)?])?,
    )?;
    vis.push_mark(arcs);
    Ok(vis)
}

/// A word cloud: the index holds the words, the values their sizes.
pub fn word(data: Data, options: &ChartOptions) -> Result<Visualization> {
    let (mut vis, table) = chart(data, options)?;
    vis.set_padding(0)?;

    let colors: Vec<Value> = palette("Dark2")?.iter().map(|c| Value::from(*c)).collect();
    vis.push_scale(color_scale(&table, IDX, colors)?);

    let cloud = Transform::of_kind("wordcloud")?
        .with_text(IDX)?
        .with_font("Helvetica Neue")?
        .with_font_size(VAL)?
        .with_rotate(json!({"random": [-90, -60, -30, 0, 30, 60, 90]}))?;

    let field = |name: &str| ValueRef::new().with_field(name);
    let enter = PropertySet::new()
        .with_x(field("x")?)?
        .with_y(field("y")?)?
        .with_angle(field("angle")?)?
        .with_align(ValueRef::literal("center")?)?
        .with_baseline(ValueRef::literal("middle")?)?
        .with_font(field("font")?)?
        .with_font_size(field("fontSize")?)?
        .with_text(field(IDX)?)?
        .with_fill(ValueRef::scaled("color", IDX)?)?;

    let words = entered("text", enter)?.with_source(
        MarkRef::new()
            .with_data(&table)?
            .with_transform(vec![cloud])?,
    )?;
    vis.push_mark(words);
    Ok(vis)
}

/// A geographic data set drawn by [`map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLayer {
    pub name: String,
    pub url: String,
    /// TopoJSON object to draw. Without one the file is read as GeoJSON features.
    pub feature: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub chart: ChartOptions,
    pub projection: String,
    pub scale: i64,
    pub center: Option<[f64; 2]>,
    pub translate: Option<[f64; 2]>,
    /// Field of the tabular data colored by (for example `data.val`). Requires `data_key` and
    /// `map_key`.
    pub data_bind: Option<String>,
    /// Field of the tabular data matched against `map_key`.
    pub data_key: Option<String>,
    /// Field of the geographic features matched against `data_key`.
    pub map_key: Option<String>,
    /// Palette of the quantized color scale.
    pub brew: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            chart: ChartOptions::default(),
            projection: "winkel3".to_owned(),
            scale: 100,
            center: None,
            translate: None,
            data_bind: None,
            data_key: None,
            map_key: None,
            brew: "GnBu".to_owned(),
        }
    }
}

fn pair(values: [f64; 2]) -> Vec<Value> {
    values.iter().map(|v| json!(v)).collect()
}

/// A map of `layers`, optionally colored by tabular `data` joined onto the features.
pub fn map(data: Option<Data>, layers: &[GeoLayer], options: &MapOptions) -> Result<Visualization> {
    let mut vis = Visualization::new();
    vis.set_width(options.chart.width)?
        .set_height(options.chart.height)?
        .set_padding(json!({"top": 10, "left": 10, "bottom": 10, "right": 10}))?;

    let binding = match (&data, &options.data_bind, &options.data_key, &options.map_key) {
        (Some(table), Some(bind), Some(data_key), Some(map_key)) => Some((
            table
                .name()
                .cloned()
                .unwrap_or_else(|| DEFAULT_DATA_NAME.to_owned()),
            bind.as_str(),
            data_key.as_str(),
            map_key.as_str(),
        )),
        (_, Some(_), _, _) => {
            return Err(Error::invalid(
                "binding data to a map needs data, data_key and map_key",
            ))
        }
        _ => None,
    };
    if let Some(table) = data {
        vis.push_data(table);
    }

    if let Some((table, bind, _, _)) = &binding {
        let colors: Vec<Value> = palette(&options.brew)?
            .iter()
            .map(|c| Value::from(*c))
            .collect();
        vis.push_scale(
            Scale::new()
                .with_name("color")?
                .with_kind("quantize")?
                .with_domain(DataRef::to(table, *bind)?)?
                .with_range(colors)?,
        );
    }

    for layer in layers {
        let format = match &layer.feature {
            Some(feature) => json!({"type": "topojson", "feature": feature}),
            None => json!({"type": "json", "property": "features"}),
        };

        let mut geopath = Transform::of_kind("geopath")?
            .with_value("data")?
            .with_projection(options.projection.as_str())?
            .with_scale(options.scale)?;
        if let Some(center) = options.center {
            geopath.set_center(pair(center))?;
        }
        if let Some(translate) = options.translate {
            geopath.set_translate(pair(translate))?;
        }
        let mut transforms = vec![geopath];

        let mut fill = ValueRef::literal("#4682b4")?;
        if let Some((table, bind, data_key, map_key)) = &binding {
            transforms.push(
                Transform::of_kind("zip")?
                    .with_zip_with(table.as_str())?
                    .with_key(*map_key)?
                    .with_zip_with_key(*data_key)?
                    .with_alias("value")?
                    .with_default_value("noval")?,
            );
            transforms.push(
                Transform::of_kind("filter")?
                    .with_test("d.path!=null && d.value!='noval'")?,
            );
            fill = ValueRef::scaled("color", &format!("value.{bind}"))?;
        }

        vis.push_data(
            Data::named(Some(layer.name.as_str()))
                .with_url(layer.url.as_str())?
                .with_format(format)?
                .with_transform(transforms)?,
        );

        let enter = PropertySet::new()
            .with_stroke(ValueRef::literal("#000000")?)?
            .with_stroke_width(ValueRef::literal(1)?)?
            .with_path(ValueRef::new().with_field("path")?)?
            .with_fill(fill)?;
        vis.push_mark(
            entered("path", enter)?
                .with_name(format!("{}_path", layer.name))?
                .with_source(MarkRef::new().with_data(layer.name.as_str())?)?,
        );
    }

    Ok(vis)
}
