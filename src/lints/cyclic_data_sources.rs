use std::collections::BTreeMap;

use petgraph::{
    algo::tarjan_scc,
    dot::{Config as DotConfig, Dot},
    graph::{DiGraph, NodeIndex},
    prelude::EdgeRef,
};
use tracing::*;

use crate::visualization::Visualization;

use super::{data_names, Lint};

/// A data set derived from itself, directly or through other data sets' `source`, can never be
/// computed.
///
/// Data sets are the nodes of a directed graph with an edge from each data set to its source.
/// Every data set has at most one source, so each strongly connected component with more than
/// one node is a single cycle, which is reported starting from its alphabetically first member.
/// Self loops are not components of their own and are reported separately.
///
/// Sources naming undefined data sets are left to `undefined-data`.
pub fn lint_cyclic_data_sources(vis: &Visualization, lints: &mut Vec<Lint>) {
    let mut digraph: DiGraph<String, ()> = DiGraph::new();
    let mut name_to_id: BTreeMap<String, NodeIndex> = BTreeMap::new();
    for name in data_names(vis) {
        let node_idx = digraph.add_node(name.clone());
        name_to_id.entry(name).or_insert(node_idx);
    }

    for data in vis.data().into_iter().flatten() {
        let (Some(name), Some(source)) = (data.name(), data.source()) else {
            continue;
        };
        let (Some(&v), Some(&w)) = (name_to_id.get(name), name_to_id.get(source)) else {
            continue;
        };
        digraph.add_edge(v, w, ());
    }

    trace!(
        "{:?}",
        Dot::with_config(&digraph, &[DotConfig::EdgeNoLabel])
    );

    for edge in digraph
        .edge_references()
        .filter(|edge| edge.source() == edge.target())
    {
        lints.push(Lint::error(
            "cyclic-data-sources",
            format!("data set \"{}\" is its own source", digraph[edge.source()]),
        ));
    }

    let mut cycles: Vec<Vec<&str>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .filter_map(|component| {
            let start = component
                .iter()
                .copied()
                .min_by(|a, b| digraph[*a].cmp(&digraph[*b]))?;

            let mut cycle = vec![digraph[start].as_str()];
            let mut node = start;
            for _ in 0..component.len() {
                node = digraph.neighbors(node).next()?;
                cycle.push(digraph[node].as_str());
                if node == start {
                    break;
                }
            }
            Some(cycle)
        })
        .collect();
    cycles.sort();

    for cycle in cycles {
        debug!(?cycle, "cyclic data sources");
        let path = cycle
            .iter()
            .map(|name| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(" -> ");
        lints.push(Lint::error(
            "cyclic-data-sources",
            format!("cycle detected in data sources: {path}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn lint(data: serde_json::Value) -> Vec<String> {
        let vis = Visualization::from_json(json!({ "data": data })).unwrap();
        let mut lints = Vec::new();
        lint_cyclic_data_sources(&vis, &mut lints);
        lints.into_iter().map(|lint| lint.message).collect()
    }

    #[test]
    fn chains_are_fine() {
        let messages = lint(json!([
            {"name": "table"},
            {"name": "stats", "source": "table"},
            {"name": "top", "source": "stats"}
        ]));
        assert!(messages.is_empty());
    }

    #[test]
    fn cycle_reported_once() {
        let messages = lint(json!([
            {"name": "c", "source": "a"},
            {"name": "a", "source": "b"},
            {"name": "b", "source": "c"},
            {"name": "table"}
        ]));
        assert_eq!(
            messages,
            vec!["cycle detected in data sources: \"a\" -> \"b\" -> \"c\" -> \"a\""]
        );
    }

    #[test]
    fn self_source() {
        let messages = lint(json!([{"name": "loop", "source": "loop"}]));
        assert_eq!(messages, vec!["data set \"loop\" is its own source"]);
    }

    #[test]
    fn undefined_source_ignored() {
        let messages = lint(json!([{"name": "stats", "source": "missing"}]));
        assert!(messages.is_empty());
    }
}
