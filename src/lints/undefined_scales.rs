use indexmap::IndexSet;

use crate::marks::Mark;
use crate::visualization::Visualization;

use super::{scales_used_by, Lint};

fn report(lints: &mut Vec<Lint>, referrer: &str, scope: &[String], used: IndexSet<String>) {
    for scale in used {
        if !scope.contains(&scale) {
            lints.push(Lint::error(
                "undefined-scales",
                format!("{referrer} uses undefined scale \"{scale}\""),
            ));
        }
    }
}

/// Walk `marks` with `scope` as the visible scales. Group marks add their own scales to their
/// children's scope.
fn check_marks(marks: &[Mark], scope: &[String], lints: &mut Vec<Lint>) {
    for mark in marks {
        let label = super::mark_label(mark);
        if let Some(properties) = mark.properties() {
            let used = scales_used_by(properties).into_iter().collect();
            report(lints, &label, scope, used);
        }

        if let Some(children) = mark.marks() {
            let mut inner = scope.to_vec();
            inner.extend(
                mark.scales()
                    .into_iter()
                    .flatten()
                    .filter_map(|scale| scale.name().cloned()),
            );
            check_marks(children, &inner, lints);
        }
    }
}

/// Axes, legends and mark properties must only name scales that are in scope.
pub fn lint_undefined_scales(vis: &Visualization, lints: &mut Vec<Lint>) {
    let scope: Vec<String> = vis
        .scales()
        .into_iter()
        .flatten()
        .filter_map(|scale| scale.name().cloned())
        .collect();

    for axis in vis.axes().into_iter().flatten() {
        let label = match axis.kind() {
            Some(kind) => format!("{kind} axis"),
            None => "untyped axis".to_owned(),
        };
        let mut used: IndexSet<String> = axis.scale().cloned().into_iter().collect();
        if let Some(properties) = axis.properties() {
            used.extend(scales_used_by(properties));
        }
        report(lints, &label, &scope, used);
    }

    for (i, legend) in vis.legends().into_iter().flatten().enumerate() {
        let label = format!("legend {}", i + 1);
        let mut used: IndexSet<String> = [
            legend.size(),
            legend.shape(),
            legend.fill(),
            legend.stroke(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        if let Some(properties) = legend.properties() {
            used.extend(scales_used_by(properties));
        }
        report(lints, &label, &scope, used);
    }

    if let Some(marks) = vis.marks() {
        check_marks(marks.as_slice(), &scope, lints);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn lint(vis: serde_json::Value) -> Vec<String> {
        let vis = Visualization::from_json(vis).unwrap();
        let mut lints = Vec::new();
        lint_undefined_scales(&vis, &mut lints);
        lints.into_iter().map(|lint| lint.message).collect()
    }

    #[test]
    fn axes_and_legends() {
        let messages = lint(json!({
            "scales": [{"name": "x"}],
            "axes": [
                {"type": "x", "scale": "x"},
                {"type": "y", "scale": "y", "properties": {"labels": {"fill": {"scale": "color"}}}}
            ],
            "legends": [{"fill": "color"}]
        }));
        assert_eq!(
            messages,
            vec![
                "y axis uses undefined scale \"y\"",
                "y axis uses undefined scale \"color\"",
                "legend 1 uses undefined scale \"color\"",
            ]
        );
    }

    #[test]
    fn group_scales_visible_to_children_only() {
        let messages = lint(json!({
            "scales": [{"name": "x"}, {"name": "y"}],
            "marks": [
                {
                    "type": "group",
                    "scales": [{"name": "pos"}],
                    "properties": {"enter": {"x": {"scale": "x", "field": "key"}}},
                    "marks": [{
                        "type": "rect",
                        "properties": {"enter": {
                            "x": {"scale": "pos", "field": "data.col"},
                            "y": {"scale": "y", "field": "data.val"}
                        }}
                    }]
                },
                {
                    "type": "rect",
                    "name": "outside",
                    "properties": {"update": {"x": {"scale": "pos", "field": "data.col"}}}
                }
            ]
        }));
        assert_eq!(messages, vec!["mark \"outside\" uses undefined scale \"pos\""]);
    }

    #[test]
    fn repeated_scale_reported_once() {
        let messages = lint(json!({
            "marks": [{
                "type": "rect",
                "properties": {
                    "enter": {"x": {"scale": "x", "field": "a"}},
                    "update": {"x2": {"scale": "x", "field": "b"}}
                }
            }]
        }));
        assert_eq!(messages, vec!["rect mark uses undefined scale \"x\""]);
    }
}
