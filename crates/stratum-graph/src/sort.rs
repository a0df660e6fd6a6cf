//! Project-level and config-level ordering.
//!
//! Projects are ordered first, per environment, by their cross-project
//! references. The configurations of each project are then ordered among
//! themselves and concatenated in project order.

use std::collections::BTreeMap;

use stratum_common::types::Coordinate;
use stratum_config::configuration::{Configuration, Project};

use crate::error::SortError;
use crate::matrix::{AdjacencyMatrix, config_matrix, project_matrix};
use crate::topology::{TopologySortError, topology_sort};

/// Orders the configurations of one environment, dependencies first.
///
/// The input is sorted by coordinate before the graph is built, so the
/// result does not depend on input order.
///
/// # Errors
///
/// Returns one [`SortError::CircularDependencyConfig`] per configuration
/// entangled in a reference cycle.
pub fn sort_configs(
    environment: &str,
    configs: &[Configuration],
) -> Result<Vec<Configuration>, Vec<SortError>> {
    let mut sorted: Vec<&Configuration> = configs.iter().collect();
    sorted.sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
    let owned: Vec<Configuration> = sorted.into_iter().cloned().collect();

    let matrix = config_matrix(&owned);
    match topology_sort(&matrix) {
        Ok(order) => Ok(order.into_iter().map(|i| owned[i].clone()).collect()),
        Err(stuck) => Err(stuck
            .iter()
            .map(|e| {
                let coordinate = |i: usize| owned[i].coordinate.clone();
                SortError::CircularDependencyConfig {
                    environment: environment.to_string(),
                    location: coordinate(e.on_id),
                    depends_on: stuck_dependencies(&matrix, &stuck, e.on_id)
                        .map(coordinate)
                        .collect(),
                    blocking: e
                        .unresolved_incoming_edges_from
                        .iter()
                        .map(|&j| coordinate(j))
                        .collect(),
                }
            })
            .collect()),
    }
}

/// Orders the projects for one environment, dependencies first.
///
/// # Errors
///
/// Returns one [`SortError::CircularDependencyProject`] per project
/// entangled in a cross-project reference cycle.
pub fn sort_projects<'a>(
    environment: &str,
    projects: &'a [Project],
) -> Result<Vec<&'a Project>, Vec<SortError>> {
    let mut sorted: Vec<&Project> = projects.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let matrix = project_matrix(environment, &sorted);
    match topology_sort(&matrix) {
        Ok(order) => Ok(order.into_iter().map(|i| sorted[i]).collect()),
        Err(stuck) => Err(stuck
            .iter()
            .map(|e| {
                let name = |i: usize| sorted[i].id.clone();
                SortError::CircularDependencyProject {
                    environment: environment.to_string(),
                    project: name(e.on_id),
                    depends_on: stuck_dependencies(&matrix, &stuck, e.on_id)
                        .map(name)
                        .collect(),
                    blocking: e
                        .unresolved_incoming_edges_from
                        .iter()
                        .map(|&j| name(j))
                        .collect(),
                }
            })
            .collect()),
    }
}

/// Returns the deploy order of every environment.
///
/// An environment whose projects or configurations cannot be ordered is
/// left out of the map; its errors are returned instead. Every error of
/// every environment is collected.
pub fn get_sorted_configs_for_environments(
    projects: &[Project],
    environments: &[String],
) -> (BTreeMap<String, Vec<Configuration>>, Vec<SortError>) {
    let mut sorted = BTreeMap::new();
    let mut errors = Vec::new();

    for environment in environments {
        let ordered_projects = match sort_projects(environment, projects) {
            Ok(ordered) => ordered,
            Err(errs) => {
                errors.extend(errs);
                continue;
            }
        };

        let mut configs = Vec::new();
        let mut failed = false;
        for project in ordered_projects {
            match sort_configs(environment, project.configs_for(environment)) {
                Ok(ordered) => configs.extend(ordered),
                Err(errs) => {
                    failed = true;
                    errors.extend(errs);
                }
            }
        }
        if !failed {
            tracing::info!(
                environment = %environment,
                configs = configs.len(),
                "deploy order computed"
            );
            let _ = sorted.insert(environment.clone(), configs);
        }
    }

    for error in &errors {
        tracing::error!(error = %error, "sort failed");
    }
    (sorted, errors)
}

/// Stuck nodes that `node` depends on.
fn stuck_dependencies<'a>(
    matrix: &'a AdjacencyMatrix,
    stuck: &'a [TopologySortError],
    node: usize,
) -> impl Iterator<Item = usize> + 'a {
    stuck
        .iter()
        .map(|e| e.on_id)
        .filter(move |&i| matrix.depends(node, i))
}

/// Coordinates in the order of `configs`; handy for assertions and logs.
#[must_use]
pub fn coordinates(configs: &[Configuration]) -> Vec<&Coordinate> {
    configs.iter().map(|c| &c.coordinate).collect()
}

#[cfg(test)]
mod tests {
    use stratum_config::configuration::ConfigType;
    use stratum_config::parameter::{Parameter, ParameterReference};
    use stratum_config::template::Template;

    use super::*;

    fn config(project: &str, api: &str, id: &str, refs: &[(&str, &str, &str)]) -> Configuration {
        let parameters = refs
            .iter()
            .enumerate()
            .map(|(n, (p, t, i))| {
                (
                    format!("ref{n}"),
                    Parameter::Reference(ParameterReference::new(Coordinate::new(*p, *t, *i), "id")),
                )
            })
            .collect();
        Configuration {
            coordinate: Coordinate::new(project, api, id),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::ClassicApi { api: api.into() },
            parameters,
            skip: false,
            origin_object_id: None,
            template: Template::new("t", "{}"),
        }
    }

    fn ids(configs: &[Configuration]) -> Vec<&str> {
        configs.iter().map(|c| c.coordinate.config_id.as_str()).collect()
    }

    #[test]
    fn tags_dashboard_management_zone_chain() {
        let configs = vec![
            config("p", "management-zone", "mz1", &[("p", "dashboard", "d1")]),
            config("p", "auto-tag", "tags", &[]),
            config("p", "dashboard", "d1", &[("p", "auto-tag", "tags")]),
        ];
        let sorted = sort_configs("dev", &configs).expect("sort");
        assert_eq!(ids(&sorted), vec!["tags", "d1", "mz1"]);
    }

    #[test]
    fn mutual_references_yield_one_error_per_config() {
        let configs = vec![
            config("p", "dashboard", "a", &[("p", "dashboard", "b")]),
            config("p", "dashboard", "b", &[("p", "dashboard", "a")]),
        ];
        let errors = sort_configs("dev", &configs).unwrap_err();
        assert_eq!(errors.len(), 2);
        for (error, other) in errors.iter().zip(["b", "a"]) {
            let SortError::CircularDependencyConfig { depends_on, environment, .. } = error else {
                unreachable!("unexpected error: {error}");
            };
            assert_eq!(environment, "dev");
            assert_eq!(depends_on, &vec![Coordinate::new("p", "dashboard", other)]);
        }
    }

    #[test]
    fn resorting_sorted_output_is_stable() {
        let configs = vec![
            config("p", "auto-tag", "x", &[]),
            config("p", "dashboard", "d1", &[("p", "auto-tag", "tags")]),
            config("p", "auto-tag", "tags", &[]),
            config("p", "alerting-profile", "z", &[]),
        ];
        let first = sort_configs("dev", &configs).expect("sort");
        let second = sort_configs("dev", &first).expect("resort");
        assert_eq!(coordinates(&first), coordinates(&second));
    }

    #[test]
    fn skipped_dependent_does_not_constrain_order() {
        let mut a = config("p", "dashboard", "a", &[("p", "dashboard", "b")]);
        a.skip = true;
        let b = config("p", "dashboard", "b", &[("p", "dashboard", "a")]);
        let sorted = sort_configs("dev", &[a, b]).expect("skip breaks the cycle");
        assert_eq!(ids(&sorted), vec!["a", "b"]);
    }

    fn project(id: &str, configs: Vec<Configuration>) -> Project {
        let mut project = Project::new(id);
        for c in configs {
            project.add(c);
        }
        project
    }

    #[test]
    fn projects_are_ordered_before_configs() {
        let projects = vec![
            project("app", vec![config("app", "dashboard", "d1", &[("infra", "auto-tag", "tags")])]),
            project("infra", vec![config("infra", "auto-tag", "tags", &[])]),
        ];
        let (sorted, errors) = get_sorted_configs_for_environments(&projects, &["dev".to_string()]);
        assert!(errors.is_empty(), "got: {errors:?}");
        assert_eq!(ids(&sorted["dev"]), vec!["tags", "d1"]);
    }

    #[test]
    fn project_cycle_is_reported_per_project_and_environment_dropped() {
        let projects = vec![
            project("a", vec![config("a", "dashboard", "x", &[("b", "dashboard", "y")])]),
            project("b", vec![config("b", "dashboard", "y", &[("a", "dashboard", "x")])]),
        ];
        let (sorted, errors) = get_sorted_configs_for_environments(&projects, &["dev".to_string()]);
        assert!(sorted.is_empty());
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, SortError::CircularDependencyProject { .. }))
        );
    }

    #[test]
    fn environment_without_configs_sorts_to_empty() {
        let projects = vec![project("infra", vec![config("infra", "auto-tag", "tags", &[])])];
        let (sorted, errors) =
            get_sorted_configs_for_environments(&projects, &["prod".to_string()]);
        assert!(errors.is_empty());
        assert!(sorted["prod"].is_empty());
    }
}
