//! Type-specific deploy functions.
//!
//! Each function upserts one rendered configuration through the matching
//! client and returns the entity later references resolve against. In dry
//! runs every function stops right before the client call and returns a
//! synthetic entity instead.

pub mod automation;
pub mod bucket;
pub mod classic;
pub mod segment;
pub mod settings;

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_client::clients::ClientSet;
use stratum_common::constants::{ID_PROPERTY, NAME_PARAMETER};
use stratum_common::error::StratumError;
use stratum_config::api::ApiRegistry;
use stratum_config::configuration::{ConfigType, Configuration};
use stratum_config::entity::{EntityMap, ResolvedEntity};

use crate::error::DeployError;

/// What a deploy function may touch.
pub struct DeployContext<'a> {
    /// Clients of the environment.
    pub clients: &'a ClientSet,
    /// Known classic APIs.
    pub apis: &'a ApiRegistry,
    /// Entities deployed so far in this environment.
    pub entities: &'a mut EntityMap,
    /// Whether client calls are suppressed.
    pub dry_run: bool,
}

/// Deploys one rendered configuration through the client of its type.
///
/// # Errors
///
/// Returns an error if the type is unknown, a parameter the type needs is
/// unusable, or the platform rejects the object.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    match config.config_type {
        ConfigType::ClassicApi { ref api } => classic::deploy(ctx, config, api, parameters, payload),
        ConfigType::Settings {
            ref schema_id,
            ref schema_version,
        } => settings::deploy(
            ctx,
            config,
            schema_id,
            schema_version.as_deref(),
            parameters,
            payload,
        ),
        ConfigType::Automation { resource } => {
            automation::deploy(ctx, config, resource, parameters, payload)
        }
        ConfigType::Bucket => bucket::deploy(ctx, config, parameters, payload),
        ConfigType::Segment => segment::deploy(ctx, config, parameters, payload),
        ConfigType::Entity { .. } => Ok(reference_only(config, parameters)),
    }
}

/// Entity of a configuration that is only referenced, never deployed.
/// Its config id doubles as the platform id.
#[must_use]
pub fn reference_only(config: &Configuration, parameters: &BTreeMap<String, Value>) -> ResolvedEntity {
    let name = entity_name(config, parameters);
    resolved(config, parameters, config.coordinate.config_id.clone(), name)
}

/// Builds the entity of a deployed configuration: its resolved parameters
/// plus the platform id and name.
pub(crate) fn resolved(
    config: &Configuration,
    parameters: &BTreeMap<String, Value>,
    id: String,
    name: String,
) -> ResolvedEntity {
    let mut properties = parameters.clone();
    let _ = properties.insert(ID_PROPERTY.to_string(), Value::String(id));
    let _ = properties.insert(NAME_PARAMETER.to_string(), Value::String(name.clone()));
    ResolvedEntity {
        entity_name: name,
        coordinate: config.coordinate.clone(),
        properties,
        skip: false,
    }
}

/// The `name` parameter as text, or the config id when there is none.
pub(crate) fn entity_name(config: &Configuration, parameters: &BTreeMap<String, Value>) -> String {
    parameters
        .get(NAME_PARAMETER)
        .map_or_else(|| config.coordinate.config_id.clone(), value_text)
}

/// A JSON value as plain text: strings unquoted, everything else compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn remote_error(config: &Configuration, source: StratumError) -> DeployError {
    DeployError::Remote {
        coordinate: config.coordinate.clone(),
        environment: config.environment.clone(),
        source,
    }
}
