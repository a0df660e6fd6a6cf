//! Kahn-style topological sort over an [`AdjacencyMatrix`].
//!
//! Nodes nobody depends on are emitted first and the emission order is
//! reversed at the end, so dependencies come before their dependents.
//! Among ready nodes the highest index is emitted first, which after the
//! reversal keeps independent nodes in input order and makes re-sorting
//! sorted input a no-op.

use std::collections::BinaryHeap;

use crate::matrix::AdjacencyMatrix;

/// A node left over when the sort gets stuck on a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySortError {
    /// Index of the unsorted node.
    pub on_id: usize,
    /// Unsorted nodes that still depend on it.
    pub unresolved_incoming_edges_from: Vec<usize>,
}

/// Sorts the nodes of `matrix`, dependencies first.
///
/// # Errors
///
/// Returns one [`TopologySortError`] per node that could not be emitted
/// when the graph contains a cycle.
pub fn topology_sort(matrix: &AdjacencyMatrix) -> Result<Vec<usize>, Vec<TopologySortError>> {
    let n = matrix.len();
    let mut in_degrees = matrix.in_degrees.clone();
    let mut emitted = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut ready: BinaryHeap<usize> = (0..n).filter(|&i| in_degrees[i] == 0).collect();
    while let Some(node) = ready.pop() {
        emitted[node] = true;
        order.push(node);
        for (dependency, row) in matrix.edges.iter().enumerate() {
            if row[node] {
                in_degrees[dependency] -= 1;
                if in_degrees[dependency] == 0 {
                    ready.push(dependency);
                }
            }
        }
    }

    if order.len() < n {
        let errors = (0..n)
            .filter(|&i| !emitted[i])
            .map(|i| TopologySortError {
                on_id: i,
                unresolved_incoming_edges_from: (0..n)
                    .filter(|&j| matrix.edges[i][j] && !emitted[j])
                    .collect(),
            })
            .collect();
        return Err(errors);
    }

    order.reverse();
    Ok(order)
}
