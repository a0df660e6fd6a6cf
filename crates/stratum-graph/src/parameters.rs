//! Ordering of the parameters inside one configuration.
//!
//! Reference and compound parameters may point at sibling parameters of
//! the same configuration. Those siblings have to be resolved first, so
//! the parameters go through the same sort as configurations do.

use std::collections::BTreeMap;

use stratum_common::types::Coordinate;
use stratum_config::parameter::Parameter;

use crate::error::SortError;
use crate::matrix::build_adjacency;
use crate::topology::topology_sort;

/// A parameter together with its name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameter {
    /// Parameter name.
    pub name: String,
    /// The parameter.
    pub parameter: Parameter,
}

/// Orders the parameters of the configuration at `coordinate` so that
/// every parameter comes after the sibling parameters it references.
///
/// # Errors
///
/// Returns [`SortError::UnknownParameter`] for references to undefined
/// siblings, or one [`SortError::CircularDependencyParameter`] per
/// parameter entangled in a cycle.
pub fn sort_parameters(
    group: &str,
    environment: &str,
    coordinate: &Coordinate,
    parameters: &BTreeMap<String, Parameter>,
) -> Result<Vec<NamedParameter>, Vec<SortError>> {
    let names: Vec<&String> = parameters.keys().collect();
    let siblings: Vec<Vec<&str>> = parameters
        .iter()
        .map(|(name, parameter)| {
            parameter
                .references()
                .iter()
                .filter(|r| r.coordinate == *coordinate && r.property != *name)
                .map(|r| r.property.as_str())
                .collect()
        })
        .collect();

    let unknown: Vec<SortError> = names
        .iter()
        .zip(&siblings)
        .flat_map(|(name, refs)| {
            refs.iter()
                .filter(move |property| !parameters.contains_key(**property))
                .map(move |property| SortError::UnknownParameter {
                    environment: environment.to_string(),
                    location: coordinate.clone(),
                    parameter: (*name).clone(),
                    missing: (*property).to_string(),
                })
        })
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }

    // The matrix has no diagonal, so self references are reported here.
    let self_referencing: Vec<SortError> = parameters
        .iter()
        .filter(|(name, parameter)| {
            parameter
                .references()
                .iter()
                .any(|r| r.coordinate == *coordinate && r.property == **name)
        })
        .map(|(name, _)| SortError::CircularDependencyParameter {
            group: group.to_string(),
            environment: environment.to_string(),
            location: coordinate.clone(),
            parameter: name.clone(),
            depends_on: vec![name.clone()],
        })
        .collect();
    if !self_referencing.is_empty() {
        return Err(self_referencing);
    }

    let matrix = build_adjacency(names.len(), |j, i| siblings[j].contains(&names[i].as_str()));
    match topology_sort(&matrix) {
        Ok(order) => Ok(order
            .into_iter()
            .map(|i| NamedParameter {
                name: names[i].clone(),
                parameter: parameters[names[i]].clone(),
            })
            .collect()),
        Err(stuck) => Err(stuck
            .iter()
            .map(|e| SortError::CircularDependencyParameter {
                group: group.to_string(),
                environment: environment.to_string(),
                location: coordinate.clone(),
                parameter: names[e.on_id].clone(),
                depends_on: stuck
                    .iter()
                    .map(|s| s.on_id)
                    .filter(|&i| matrix.depends(e.on_id, i))
                    .map(|i| names[i].clone())
                    .collect(),
            })
            .collect()),
    }
}
