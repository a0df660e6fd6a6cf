//! Graphviz export of the reference graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use stratum_common::types::Coordinate;
use stratum_config::configuration::Configuration;

/// Builds the reference graph of one environment.
///
/// Nodes are labelled with coordinates. Each edge points from a dependency
/// to its dependent and is labelled with the referenced properties.
/// References to configurations outside `configs` are left out.
#[must_use]
pub fn dependency_graph(configs: &[Configuration]) -> DiGraph<String, String> {
    let mut graph = DiGraph::new();
    let nodes: HashMap<&Coordinate, NodeIndex> = configs
        .iter()
        .map(|c| (&c.coordinate, graph.add_node(c.coordinate.to_string())))
        .collect();

    for config in configs {
        let mut properties: BTreeMap<&Coordinate, BTreeSet<&str>> = BTreeMap::new();
        for reference in config.parameter_references() {
            if reference.coordinate != config.coordinate {
                let _ = properties
                    .entry(&reference.coordinate)
                    .or_default()
                    .insert(reference.property.as_str());
            }
        }
        for (target, props) in properties {
            if let (Some(&from), Some(&to)) = (nodes.get(target), nodes.get(&config.coordinate)) {
                let label = props.into_iter().collect::<Vec<_>>().join(", ");
                let _ = graph.add_edge(from, to, label);
            }
        }
    }
    graph
}

/// Renders the reference graph of one environment in DOT format.
#[must_use]
pub fn render_dot(configs: &[Configuration]) -> String {
    let graph = dependency_graph(configs);
    format!("{}", Dot::new(&graph))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use stratum_config::configuration::ConfigType;
    use stratum_config::parameter::{Parameter, ParameterReference};
    use stratum_config::template::Template;

    use super::*;

    fn config(id: &str, refs: &[(&str, &str)]) -> Configuration {
        let parameters: BTreeMap<String, Parameter> = refs
            .iter()
            .enumerate()
            .map(|(n, (target, property))| {
                (
                    format!("p{n}"),
                    Parameter::Reference(ParameterReference::new(
                        Coordinate::new("p", "dashboard", *target),
                        *property,
                    )),
                )
            })
            .collect();
        Configuration {
            coordinate: Coordinate::new("p", "dashboard", id),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::ClassicApi {
                api: "dashboard".into(),
            },
            parameters,
            skip: false,
            origin_object_id: None,
            template: Template::new("t", "{}"),
        }
    }

    #[test]
    fn edges_are_merged_per_target() {
        let configs = vec![
            config("a", &[]),
            config("b", &[("a", "id"), ("a", "name"), ("b", "x"), ("gone", "id")]),
        ];
        let graph = dependency_graph(&configs);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge_indices().next().expect("edge");
        let (from, to) = graph.edge_endpoints(edge).expect("endpoints");
        assert_eq!(graph[from], "p:dashboard:a");
        assert_eq!(graph[to], "p:dashboard:b");
        assert_eq!(graph[edge], "id, name");
    }

    #[test]
    fn dot_output_contains_labels() {
        let configs = vec![config("a", &[]), config("b", &[("a", "id")])];
        let dot = render_dot(&configs);
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("p:dashboard:a"));
        assert!(dot.contains("label = \"id\""));
    }
}
