//! A typed, validated object model for the [Vega](https://vega.github.io/vega/) visualization
//! grammar, with adapters for loading tabular data and templates for common charts.
//!
//! Every grammar object (a [`Visualization`], its [`Data`], [`Scale`]s, [`Axis`]es, [`Mark`]s
//! and so on) checks each assignment against the field's declared kinds and validator, and
//! serializes to exactly the JSON Vega expects.

pub mod axes;
pub mod charts;
pub mod colors;
pub mod data;
pub mod display;
mod edit_distance;
pub mod error;
pub mod grammar;
pub mod keyed_list;
pub mod legends;
pub mod lints;
pub mod marks;
pub mod output;
pub mod properties;
pub mod scales;
pub mod transforms;
pub mod values;
pub mod visualization;

pub use axes::{Axis, AxisProperties};
pub use charts::{ChartKind, ChartOptions, GeoLayer, MapOptions};
pub use colors::{palette, palette_names};
pub use data::{serialize, Data, Frame, KeyPairs, LoadOptions, Scalar, Series};
pub use error::{Error, Result};
pub use grammar::{FromJson, GrammarObject, GrammarValue, Kind};
pub use keyed_list::{KeyAttr, Keyed, KeyedList};
pub use legends::{Legend, LegendProperties};
pub use lints::{Lint, Severity};
pub use marks::{Mark, MarkProperties, MarkRef};
pub use output::{JsonOptions, SplitOptions};
pub use properties::PropertySet;
pub use scales::{Bound, Domain, Scale};
pub use transforms::Transform;
pub use values::{DataRef, ValueRef};
pub use visualization::{AxisStyle, ColorScheme, Visualization};
