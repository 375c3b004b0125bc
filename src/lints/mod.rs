//! Checks over the references between the parts of a visualization.
//!
//! `validate()` looks at one object at a time. The lints here look at how data sets, scales and
//! marks name each other, which is where the renderer fails silently: a mark drawn from a data
//! set that does not exist simply draws nothing.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::*;

use crate::grammar::GrammarValue;
use crate::marks::Mark;
use crate::scales::{Bound, Domain, Scale};
use crate::transforms::Transform;
use crate::visualization::Visualization;

mod cyclic_data_sources;
mod undefined_data;
mod undefined_scales;
mod unused_data;

pub use cyclic_data_sources::*;
pub use undefined_data::*;
pub use undefined_scales::*;
pub use unused_data::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lint {
    /// Kebab-case name of the lint that fired, e.g. `undefined-data`.
    pub name: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Lint {
    pub(crate) fn error(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub(crate) fn warning(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.name, self.message)
    }
}

/// Run every lint. Errors come first, then warnings, each in the order they were found.
pub fn check(vis: &Visualization) -> Vec<Lint> {
    let mut lints = Vec::new();

    lint_undefined_data(vis, &mut lints);
    lint_undefined_scales(vis, &mut lints);
    lint_cyclic_data_sources(vis, &mut lints);
    lint_unused_data(vis, &mut lints);

    lints.sort_by(|a, b| b.severity.cmp(&a.severity));
    debug!(count = lints.len(), "lints finished");
    lints
}

/// A place that names a data set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataReference {
    /// Human-readable description of the referencing part.
    pub referrer: String,
    pub data: String,
}

fn data_names(vis: &Visualization) -> Vec<String> {
    vis.data()
        .into_iter()
        .flatten()
        .filter_map(|data| data.name().cloned())
        .collect()
}

fn zip_references(transforms: Option<&Vec<Transform>>, referrer: &str) -> Vec<DataReference> {
    transforms
        .into_iter()
        .flatten()
        .filter(|transform| transform.kind().is_some_and(|kind| kind == "zip"))
        .filter_map(|transform| transform.zip_with())
        .map(|data| DataReference {
            referrer: format!("zip transform of {referrer}"),
            data: data.to_owned(),
        })
        .collect()
}

fn scale_references(scale: &Scale, out: &mut Vec<DataReference>) {
    let referrer = match scale.name() {
        Some(name) => format!("scale \"{name}\""),
        None => "unnamed scale".to_owned(),
    };

    let mut data_refs = Vec::new();
    if let Some(Domain::Data(data_ref)) = scale.domain() {
        data_refs.push(data_ref);
    }
    for bound in [
        scale.domain_min(),
        scale.domain_max(),
        scale.range_min(),
        scale.range_max(),
    ]
    .into_iter()
    .flatten()
    {
        if let Bound::Data(data_ref) = bound {
            data_refs.push(data_ref);
        }
    }

    out.extend(data_refs.into_iter().filter_map(|data_ref| {
        data_ref.data().map(|data| DataReference {
            referrer: referrer.clone(),
            data: data.to_owned(),
        })
    }));
}

fn mark_label(mark: &Mark) -> String {
    match (mark.name(), mark.kind()) {
        (Some(name), _) => format!("mark \"{name}\""),
        (None, Some(kind)) => format!("{kind} mark"),
        (None, None) => "untyped mark".to_owned(),
    }
}

fn mark_references(marks: &[Mark], out: &mut Vec<DataReference>) {
    for mark in marks {
        let label = mark_label(mark);
        if let Some(source) = mark.source() {
            if let Some(data) = source.data() {
                out.push(DataReference {
                    referrer: label.clone(),
                    data: data.to_owned(),
                });
            }
            out.extend(zip_references(source.transform(), &label));
        }
        for scale in mark.scales().into_iter().flatten() {
            scale_references(scale, out);
        }
        if let Some(children) = mark.marks() {
            mark_references(children, out);
        }
    }
}

/// Every reference to a data set by name, anywhere in the tree.
pub(crate) fn data_references(vis: &Visualization) -> Vec<DataReference> {
    let mut out = Vec::new();

    for data in vis.data().into_iter().flatten() {
        let label = match data.name() {
            Some(name) => format!("data set \"{name}\""),
            None => "unnamed data set".to_owned(),
        };
        if let Some(source) = data.source() {
            out.push(DataReference {
                referrer: format!("source of {label}"),
                data: source.to_owned(),
            });
        }
        out.extend(zip_references(data.transform(), &label));
    }

    for scale in vis.scales().into_iter().flatten() {
        scale_references(scale, &mut out);
    }

    if let Some(marks) = vis.marks() {
        mark_references(marks.as_slice(), &mut out);
    }

    trace!(?out, "data references");
    out
}

/// Names of the scales used by the value references in a flattened property set (or a set of
/// property sets, such as an axis' or legend's `properties`).
pub(crate) fn property_scales(properties: &Value, out: &mut Vec<String>) {
    let Value::Object(map) = properties else {
        return;
    };
    if let Some(Value::String(scale)) = map.get("scale") {
        out.push(scale.to_owned());
    }
    for value in map.values() {
        if value.is_object() {
            property_scales(value, out);
        }
    }
}

/// [`property_scales`] for any grammar value, flattened first.
pub(crate) fn scales_used_by(properties: &dyn GrammarValue) -> Vec<String> {
    let mut out = Vec::new();
    property_scales(&properties.to_json(), &mut out);
    out
}
