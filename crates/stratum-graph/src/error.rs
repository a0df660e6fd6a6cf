//! Sort failures.

use std::fmt::Display;

use stratum_common::types::Coordinate;
use thiserror::Error;

/// Failure to order configurations, projects or parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// A configuration is part of (or blocked by) a reference cycle.
    #[error(
        "circular dependency in environment `{environment}`: config {location} depends on [{}] and blocks [{}]",
        join(.depends_on),
        join(.blocking)
    )]
    CircularDependencyConfig {
        /// Environment being sorted.
        environment: String,
        /// Entangled configuration.
        location: Coordinate,
        /// Unsorted configurations it references.
        depends_on: Vec<Coordinate>,
        /// Unsorted configurations referencing it.
        blocking: Vec<Coordinate>,
    },

    /// A project is part of (or blocked by) a cross-project reference cycle.
    #[error(
        "circular dependency in environment `{environment}`: project `{project}` depends on [{}] and blocks [{}]",
        join(.depends_on),
        join(.blocking)
    )]
    CircularDependencyProject {
        /// Environment being sorted.
        environment: String,
        /// Entangled project.
        project: String,
        /// Unsorted projects it references.
        depends_on: Vec<String>,
        /// Unsorted projects referencing it.
        blocking: Vec<String>,
    },

    /// Parameters of one configuration reference each other in a cycle.
    #[error(
        "circular dependency in {location} (group `{group}`, environment `{environment}`): parameter `{parameter}` depends on [{}]",
        join(.depends_on)
    )]
    CircularDependencyParameter {
        /// Group of the environment.
        group: String,
        /// Environment being sorted.
        environment: String,
        /// Configuration owning the parameters.
        location: Coordinate,
        /// Entangled parameter.
        parameter: String,
        /// Unsorted sibling parameters it references.
        depends_on: Vec<String>,
    },

    /// A parameter references a sibling parameter that does not exist.
    #[error("{location} (environment `{environment}`): parameter `{parameter}` references undefined parameter `{missing}`")]
    UnknownParameter {
        /// Environment being sorted.
        environment: String,
        /// Configuration owning the parameter.
        location: Coordinate,
        /// Referencing parameter.
        parameter: String,
        /// Undefined sibling parameter.
        missing: String,
    },
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
