use tracing::*;

use crate::visualization::Visualization;

use super::{data_names, data_references, Lint};

/// Data sets named by a `source`, a zip transform, a scale or a mark must be defined in the
/// visualization's `data`. The renderer does not complain about these, it just draws nothing.
pub fn lint_undefined_data(vis: &Visualization, lints: &mut Vec<Lint>) {
    let defined = data_names(vis);

    for reference in data_references(vis) {
        if defined.contains(&reference.data) {
            continue;
        }
        debug!(?reference, "undefined data set");
        lints.push(Lint::error(
            "undefined-data",
            format!(
                "{} uses undefined data set \"{}\"",
                reference.referrer, reference.data
            ),
        ));
    }
}
