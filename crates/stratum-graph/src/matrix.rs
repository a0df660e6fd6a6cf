//! Adjacency matrix construction.
//!
//! `edges[i][j]` is set when node `j` depends on node `i`; `in_degrees[i]`
//! counts the nodes depending on `i`. Rows are independent of each other
//! and are built in parallel.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use stratum_common::types::Coordinate;
use stratum_config::configuration::{Configuration, Project};

/// Square boolean adjacency matrix plus in-degree vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    /// `edges[i][j]`: node `j` depends on node `i`.
    pub edges: Vec<Vec<bool>>,
    /// Number of nodes depending on each node.
    pub in_degrees: Vec<usize>,
}

impl AdjacencyMatrix {
    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_degrees.len()
    }

    /// Returns whether the matrix has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_degrees.is_empty()
    }

    /// Returns whether node `dependent` depends on node `dependency`.
    #[must_use]
    pub fn depends(&self, dependent: usize, dependency: usize) -> bool {
        self.edges
            .get(dependency)
            .and_then(|row| row.get(dependent))
            .copied()
            .unwrap_or(false)
    }
}

/// Builds the matrix over `n` nodes from a dependency predicate.
///
/// `depends(j, i)` must return whether node `j` depends on node `i`. It is
/// never called with `i == j`, so self references never become edges.
pub fn build_adjacency<F>(n: usize, depends: F) -> AdjacencyMatrix
where
    F: Fn(usize, usize) -> bool + Sync,
{
    let edges: Vec<Vec<bool>> = (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| i != j && depends(j, i)).collect())
        .collect();
    let in_degrees = edges
        .iter()
        .map(|row| row.iter().filter(|edge| **edge).count())
        .collect();
    AdjacencyMatrix { edges, in_degrees }
}

/// Builds the matrix over configurations of one environment.
///
/// Skipped configurations are nodes but never the source of an edge.
#[must_use]
pub fn config_matrix(configs: &[Configuration]) -> AdjacencyMatrix {
    let lookup: HashMap<&Coordinate, HashSet<Coordinate>> = configs
        .iter()
        .map(|c| (&c.coordinate, c.references().into_iter().collect()))
        .collect();

    let matrix = build_adjacency(configs.len(), |j, i| {
        let dependent = &configs[j];
        !dependent.skip
            && lookup
                .get(&dependent.coordinate)
                .is_some_and(|refs| refs.contains(&configs[i].coordinate))
    });

    for (i, row) in matrix.edges.iter().enumerate() {
        for (j, _) in row.iter().enumerate().filter(|(_, edge)| **edge) {
            tracing::debug!(
                dependency = %configs[i].coordinate,
                dependent = %configs[j].coordinate,
                "reference edge"
            );
        }
    }
    matrix
}

/// Builds the matrix over projects for one environment.
#[must_use]
pub fn project_matrix(environment: &str, projects: &[&Project]) -> AdjacencyMatrix {
    build_adjacency(projects.len(), |j, i| {
        projects[j].has_dependency_on(environment, projects[i])
    })
}
