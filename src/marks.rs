use crate::error::{Error, Result};
use crate::keyed_list::KeyedList;
use crate::properties::PropertySet;
use crate::scales::Scale;
use crate::transforms::Transform;
use crate::values::ValueRef;

pub const MARK_TYPES: &[&str] = &[
    "rect", "symbol", "path", "arc", "area", "line", "image", "text", "group",
];

pub const EASINGS: &[&str] = &[
    "linear", "quad", "cubic", "sin", "exp", "circle", "bounce",
];

// Longest first, so "-in-out" is not mistaken for "-out".
const EASING_MODES: &[&str] = &["-in-out", "-out-in", "-in", "-out"];

crate::grammar_class! {
    /// Property sets applied as marks enter, exit, update and are hovered.
    pub struct MarkProperties {
        enter: PropertySet = "enter";
        exit: PropertySet = "exit";
        update: PropertySet = "update";
        hover: PropertySet = "hover";
    }
}

crate::grammar_class! {
    /// The data a mark is drawn from.
    pub struct MarkRef {
        /// Name of the source data set.
        data: String = "data";
        transform: Vec<Transform> = "transform";
    }
}

fn check_mark_type(value: &String) -> Result<()> {
    if MARK_TYPES.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{value} is not a valid mark type (must be one of {})",
            MARK_TYPES.join(", ")
        )))
    }
}

fn check_ease(value: &String) -> Result<()> {
    let base = EASING_MODES
        .iter()
        .find_map(|mode| value.strip_suffix(*mode))
        .unwrap_or(value);
    if EASINGS.contains(&base) {
        Ok(())
    } else {
        Err(Error::invalid(format!("{value} is not a valid easing")))
    }
}

crate::grammar_class! {
    /// A visual primitive bound to data. Group marks nest their own marks and scales.
    pub struct Mark keyed "type" {
        name: String = "name";
        description: String = "description";
        kind: String = "type" => check_mark_type;
        /// Serialized as `from`.
        source: MarkRef = "from";
        properties: MarkProperties = "properties";
        /// Data field used as the join key for transitions.
        key: String = "key";
        /// Transition delay.
        delay: ValueRef = "delay";
        ease: String = "ease" => check_ease;
        marks: Vec<Mark> = "marks";
        scales: KeyedList<Scale> = "scales";
    }
}

impl Mark {
    pub fn of_kind(kind: &str) -> Result<Self> {
        Self::new().with_kind(kind)
    }
}
