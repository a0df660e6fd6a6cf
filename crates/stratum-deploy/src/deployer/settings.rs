//! Settings objects, upserted by external id.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_client::clients::SettingsObject;
use stratum_common::constants::{LEGACY_ID_PROPERTY, SCOPE_PARAMETER};
use stratum_config::configuration::Configuration;
use stratum_config::entity::ResolvedEntity;
use stratum_config::idutils;

use super::{DeployContext, entity_name, remote_error, resolved};
use crate::error::DeployError;

/// Deploys a settings object. When the returned object id embeds a legacy
/// numeric id, it is published as the `legacyId` property so classic
/// configurations can reference it.
///
/// # Errors
///
/// Returns an error if the `scope` parameter is missing or not a string,
/// or the platform rejects the object.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    schema_id: &str,
    schema_version: Option<&str>,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    let scope = match parameters.get(SCOPE_PARAMETER) {
        Some(Value::String(scope)) => scope.as_str(),
        other => {
            return Err(DeployError::InvalidParameter {
                coordinate: config.coordinate.clone(),
                environment: config.environment.clone(),
                parameter: SCOPE_PARAMETER.to_string(),
                message: other.map_or_else(
                    || "is missing".to_string(),
                    |v| format!("must be a string, got {v}"),
                ),
            });
        }
    };
    let external_id = idutils::external_id(&config.coordinate);
    let name = entity_name(config, parameters);

    if ctx.dry_run {
        tracing::debug!(coordinate = %config.coordinate, schema_id, scope, "dry run: skipping upsert");
        let id = config.origin_object_id.clone().unwrap_or(external_id);
        return Ok(resolved(config, parameters, id, name));
    }

    let remote = ctx
        .clients
        .settings
        .upsert(&SettingsObject {
            schema_id,
            schema_version,
            scope,
            external_id: &external_id,
            origin_object_id: config.origin_object_id.as_deref(),
            value: payload,
        })
        .map_err(|e| remote_error(config, e))?;
    tracing::info!(coordinate = %config.coordinate, object_id = %remote.id, "settings object deployed");

    let mut entity = resolved(config, parameters, remote.id.clone(), name);
    if let Some(legacy_id) = legacy_id(config, &remote.id) {
        let _ = entity
            .properties
            .insert(LEGACY_ID_PROPERTY.to_string(), Value::from(legacy_id));
    }
    Ok(entity)
}

/// Best-effort decoding; an object id without a legacy id is only logged.
fn legacy_id(config: &Configuration, object_id: &str) -> Option<i64> {
    let decoded = idutils::decode_legacy_id(object_id);
    if decoded.is_none() {
        tracing::debug!(coordinate = %config.coordinate, object_id, "object id carries no legacy id");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;
    use stratum_common::types::Coordinate;
    use stratum_config::api::ApiRegistry;
    use stratum_config::configuration::ConfigType;
    use stratum_config::entity::EntityMap;
    use stratum_config::template::Template;

    use super::*;
    use crate::deployer::test_support::clients;

    fn config() -> Configuration {
        Configuration {
            coordinate: Coordinate::new("p", "builtin:tags", "t"),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::Settings {
                schema_id: "builtin:tags".into(),
                schema_version: None,
            },
            parameters: BTreeMap::new(),
            skip: false,
            origin_object_id: None,
            template: Template::new("t", "{}"),
        }
    }

    #[test]
    fn upsert_uses_scope_parameter() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = DeployContext {
            clients: &clients,
            apis: &apis,
            entities: &mut entities,
            dry_run: false,
        };
        let params = BTreeMap::from([("scope".to_string(), json!("environment"))]);
        let entity = deploy(&mut ctx, &config(), "builtin:tags", None, &params, &json!({}))
            .expect("deploy");
        assert_eq!(entity.properties["id"], json!("object-1"));
        assert_eq!(entity.entity_name, "t");
        assert!(!entity.properties.contains_key("legacyId"));
        assert_eq!(recorder.calls(), vec!["settings:builtin:tags:environment"]);
    }

    #[test]
    fn legacy_id_embedded_in_object_id_is_published() {
        let (_, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = DeployContext {
            clients: &clients,
            apis: &apis,
            entities: &mut entities,
            dry_run: false,
        };
        let mut raw = b"object-prefix".to_vec();
        raw.extend_from_slice(&42_i64.to_be_bytes());
        let mut config = config();
        config.origin_object_id = Some(URL_SAFE_NO_PAD.encode(raw));

        let params = BTreeMap::from([("scope".to_string(), json!("environment"))]);
        let entity = deploy(&mut ctx, &config, "builtin:tags", None, &params, &json!({}))
            .expect("deploy");
        assert_eq!(entity.properties["legacyId"], json!(42));
    }

    #[test]
    fn non_string_scope_is_rejected() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = DeployContext {
            clients: &clients,
            apis: &apis,
            entities: &mut entities,
            dry_run: false,
        };
        let params = BTreeMap::from([("scope".to_string(), json!(5))]);
        let err = deploy(&mut ctx, &config(), "builtin:tags", None, &params, &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("must be a string"));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn dry_run_uses_external_id() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = DeployContext {
            clients: &clients,
            apis: &apis,
            entities: &mut entities,
            dry_run: true,
        };
        let params = BTreeMap::from([("scope".to_string(), json!("environment"))]);
        let entity = deploy(&mut ctx, &config(), "builtin:tags", None, &params, &json!({}))
            .expect("deploy");
        assert_eq!(
            entity.properties["id"],
            json!(idutils::external_id(&config().coordinate))
        );
        assert!(recorder.calls().is_empty());
    }
}
