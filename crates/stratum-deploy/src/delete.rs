//! Deletion of remote objects.
//!
//! A delete file lists pointers to configurations. Each pointer is turned
//! into the key its client deletes by: the name for classic APIs, the
//! generated ids for everything else.

use std::path::Path;

use serde::Deserialize;
use stratum_client::clients::ClientSet;
use stratum_common::error::{Result, StratumError};
use stratum_common::types::Coordinate;
use stratum_config::api::ApiRegistry;
use stratum_config::configuration::AutomationResource;
use stratum_config::idutils;

use crate::error::DeployError;

/// A configuration to delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeletePointer {
    /// Owning project.
    pub project: String,
    /// Coordinate type: classic API id, settings schema, automation
    /// resource, `bucket` or `segment`.
    #[serde(rename = "type")]
    pub config_type: String,
    /// Config id the object was deployed from.
    #[serde(default)]
    pub id: Option<String>,
    /// Object name, for classic APIs.
    #[serde(default)]
    pub name: Option<String>,
}

impl DeletePointer {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(
            &self.project,
            &self.config_type,
            self.id.as_deref().or(self.name.as_deref()).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct DeleteFile {
    delete: Vec<DeletePointer>,
}

/// Reads the pointers of a delete file (`delete: [...]`).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_delete_file(path: &Path) -> Result<Vec<DeletePointer>> {
    let content = std::fs::read_to_string(path).map_err(|e| StratumError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: DeleteFile = serde_yaml::from_str(&content)?;
    Ok(file.delete)
}

/// Deletes every pointed-to object in `environment`.
///
/// Continues past failures and returns every error. Objects that do not
/// exist remotely are logged and skipped.
pub fn delete_configs(
    clients: &ClientSet,
    apis: &ApiRegistry,
    environment: &str,
    pointers: &[DeletePointer],
) -> Vec<DeployError> {
    let mut errors = Vec::new();
    for pointer in pointers {
        let coordinate = pointer.coordinate();
        match delete_one(clients, apis, pointer, &coordinate) {
            Ok(()) => tracing::info!(coordinate = %coordinate, environment, "deleted"),
            Err(Failure::Client(e)) if e.is_not_found() => {
                tracing::info!(coordinate = %coordinate, environment, "already absent");
            }
            Err(failure) => {
                let err = failure.into_error(coordinate, environment);
                tracing::error!(environment, error = %err, "delete failed");
                errors.push(err);
            }
        }
    }
    errors
}

enum Failure {
    Client(StratumError),
    UnknownType,
    MissingKey(&'static str),
}

impl Failure {
    fn into_error(self, coordinate: Coordinate, environment: &str) -> DeployError {
        match self {
            Self::Client(source) => DeployError::Remote {
                coordinate,
                environment: environment.to_string(),
                source,
            },
            Self::UnknownType => DeployError::UnknownType {
                type_name: coordinate.config_type.clone(),
                coordinate,
                environment: environment.to_string(),
            },
            Self::MissingKey(key) => DeployError::InvalidParameter {
                coordinate,
                environment: environment.to_string(),
                parameter: key.to_string(),
                message: "is required to delete this type".to_string(),
            },
        }
    }
}

fn delete_one(
    clients: &ClientSet,
    apis: &ApiRegistry,
    pointer: &DeletePointer,
    coordinate: &Coordinate,
) -> std::result::Result<(), Failure> {
    let kind = pointer.config_type.as_str();
    if let Some(api) = apis.get(kind) {
        let name = pointer
            .name
            .as_deref()
            .or(pointer.id.as_deref())
            .ok_or(Failure::MissingKey("name"))?;
        return clients.classic.delete_by_name(api, name).map_err(Failure::Client);
    }

    if pointer.id.is_none() {
        return Err(Failure::MissingKey("id"));
    }
    let result = match kind {
        "bucket" => clients.buckets.delete(&idutils::bucket_name(coordinate)),
        "segment" => clients
            .segments
            .delete_by_external_id(&idutils::external_id(coordinate)),
        _ => {
            if let Some(resource) = AutomationResource::from_name(kind) {
                clients
                    .automation
                    .delete(resource, &idutils::automation_id(coordinate))
            } else if kind.contains(':') {
                clients
                    .settings
                    .delete_by_external_id(kind, &idutils::external_id(coordinate))
            } else {
                return Err(Failure::UnknownType);
            }
        }
    };
    result.map_err(Failure::Client)
}
