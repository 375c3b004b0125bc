use super::{data_names, data_references, Lint};
use crate::visualization::Visualization;

pub fn lint_unused_data(vis: &Visualization, lints: &mut Vec<Lint>) {
    let references = data_references(vis);

    for name in data_names(vis) {
        let used = references
            .iter()
            .any(|reference| reference.data == name);
        if !used {
            lints.push(Lint::warning(
                "unused-data",
                format!("data set \"{name}\" is defined but never used"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn source_counts_as_use() {
        let vis = Visualization::from_json(json!({
            "data": [
                {"name": "table"},
                {"name": "stats", "source": "table"},
                {"name": "spare"}
            ],
            "marks": [{"type": "rect", "from": {"data": "stats"}}]
        }))
        .unwrap();

        let mut lints = Vec::new();
        lint_unused_data(&vis, &mut lints);
        assert_eq!(lints.len(), 1);
        assert_eq!(
            lints[0].message,
            "data set \"spare\" is defined but never used"
        );
    }
}
