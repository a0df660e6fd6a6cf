//! Per-configuration deploy and delete failures.

use stratum_common::error::StratumError;
use stratum_common::types::Coordinate;
use stratum_config::parameter::ResolveError;
use stratum_config::template::RenderError;
use stratum_graph::error::SortError;
use thiserror::Error;

/// Failure to deploy or delete one configuration in one environment.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The parameters of the configuration cannot be ordered.
    #[error("{coordinate} ({environment}): parameters cannot be ordered: {}", join(.errors))]
    ParameterSort {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Sort failures.
        errors: Vec<SortError>,
    },

    /// A parameter could not be resolved.
    #[error("{coordinate} ({environment}): {source}")]
    ParameterResolution {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Resolution failure.
        source: ResolveError,
    },

    /// A resolved parameter has a value the deployer cannot use.
    #[error("{coordinate} ({environment}): parameter `{parameter}` {message}")]
    InvalidParameter {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Offending parameter.
        parameter: String,
        /// What is wrong with it.
        message: String,
    },

    /// The payload template could not be rendered.
    #[error("{coordinate} ({environment}): {source}")]
    Render {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Render failure.
        source: RenderError,
    },

    /// The platform rejected the request or could not be reached.
    #[error("{coordinate} ({environment}): {source}")]
    Remote {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Client failure.
        source: StratumError,
    },

    /// The configuration type is not known to this deployment.
    #[error("{coordinate} ({environment}): unknown configuration type `{type_name}`")]
    UnknownType {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Unknown type name.
        type_name: String,
    },

    /// Another configuration already deployed this name through a
    /// unique-name API in this run.
    #[error("{coordinate} ({environment}): name \"{name}\" is already used by another `{api}` configuration")]
    DuplicateName {
        /// Failing configuration.
        coordinate: Coordinate,
        /// Environment being deployed.
        environment: String,
        /// Classic API id.
        api: String,
        /// Duplicated name.
        name: String,
    },

    /// No clients were set up for the environment.
    #[error("environment `{environment}` has no clients")]
    MissingClients {
        /// Environment without clients.
        environment: String,
    },
}

impl DeployError {
    /// Configuration the error belongs to, if any.
    #[must_use]
    pub const fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            Self::ParameterSort { coordinate, .. }
            | Self::ParameterResolution { coordinate, .. }
            | Self::InvalidParameter { coordinate, .. }
            | Self::Render { coordinate, .. }
            | Self::Remote { coordinate, .. }
            | Self::UnknownType { coordinate, .. }
            | Self::DuplicateName { coordinate, .. } => Some(coordinate),
            Self::MissingClients { .. } => None,
        }
    }

    /// Environment the error belongs to.
    #[must_use]
    pub fn environment(&self) -> &str {
        match self {
            Self::ParameterSort { environment, .. }
            | Self::ParameterResolution { environment, .. }
            | Self::InvalidParameter { environment, .. }
            | Self::Render { environment, .. }
            | Self::Remote { environment, .. }
            | Self::UnknownType { environment, .. }
            | Self::DuplicateName { environment, .. }
            | Self::MissingClients { environment } => environment,
        }
    }

    /// Returns whether the platform refused the credentials or operation.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                source: StratumError::PermissionDenied { .. },
                ..
            }
        )
    }
}

fn join(errors: &[SortError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
