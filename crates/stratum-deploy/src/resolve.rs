//! Parameter resolution for one configuration.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_config::configuration::Configuration;
use stratum_config::entity::EntityMap;
use stratum_config::parameter::ResolveContext;
use stratum_graph::parameters::sort_parameters;

use crate::error::DeployError;

/// Resolves every parameter of `config` against the entities deployed so
/// far, siblings first.
///
/// # Errors
///
/// Returns an error if the parameters cannot be ordered or one of them
/// cannot be resolved.
pub fn resolve_parameters(
    config: &Configuration,
    entities: &EntityMap,
    strict_skipped_references: bool,
) -> Result<BTreeMap<String, Value>, DeployError> {
    let ordered = sort_parameters(
        &config.group,
        &config.environment,
        &config.coordinate,
        &config.parameters,
    )
    .map_err(|errors| DeployError::ParameterSort {
        coordinate: config.coordinate.clone(),
        environment: config.environment.clone(),
        errors,
    })?;

    let mut resolved = BTreeMap::new();
    for named in ordered {
        let value = {
            let ctx = ResolveContext {
                coordinate: &config.coordinate,
                environment: &config.environment,
                parameter: &named.name,
                entities,
                resolved_parameters: &resolved,
                strict_skipped_references,
            };
            named
                .parameter
                .resolve(&ctx)
                .map_err(|source| DeployError::ParameterResolution {
                    coordinate: config.coordinate.clone(),
                    environment: config.environment.clone(),
                    source,
                })?
        };
        let _ = resolved.insert(named.name, value);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratum_common::types::Coordinate;
    use stratum_config::configuration::ConfigType;
    use stratum_config::entity::ResolvedEntity;
    use stratum_config::parameter::{Parameter, ParameterReference, ResolveError};
    use stratum_config::template::Template;

    use super::*;

    fn dashboard(parameters: Vec<(&str, Parameter)>) -> Configuration {
        Configuration {
            coordinate: Coordinate::new("p", "dashboard", "d1"),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::ClassicApi {
                api: "dashboard".into(),
            },
            parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            skip: false,
            origin_object_id: None,
            template: Template::new("t", "{}"),
        }
    }

    fn own(property: &str) -> ParameterReference {
        ParameterReference::new(Coordinate::new("p", "dashboard", "d1"), property)
    }

    #[test]
    fn compound_sees_resolved_siblings() {
        let mut entities = EntityMap::new();
        let tags = Coordinate::new("p", "auto-tag", "tags");
        let mut entity = ResolvedEntity::skipped(tags.clone());
        entity.skip = false;
        let _ = entity.properties.insert("id".into(), json!("tag-1"));
        entities.put(entity);

        let config = dashboard(vec![
            ("name", Parameter::Value(json!("Board"))),
            ("tag", Parameter::Reference(ParameterReference::new(tags, "id"))),
            (
                "title",
                Parameter::Compound {
                    format: "{{ .name }} / {{ .tag }}".into(),
                    references: vec![own("name"), own("tag")],
                },
            ),
        ]);
        let resolved = resolve_parameters(&config, &entities, false).expect("resolve");
        assert_eq!(resolved["title"], json!("Board / tag-1"));
        assert_eq!(resolved["tag"], json!("tag-1"));
    }

    #[test]
    fn missing_entity_is_a_resolution_error() {
        let config = dashboard(vec![(
            "tag",
            Parameter::Reference(ParameterReference::new(
                Coordinate::new("p", "auto-tag", "gone"),
                "id",
            )),
        )]);
        let err = resolve_parameters(&config, &EntityMap::new(), false).unwrap_err();
        assert!(matches!(
            err,
            DeployError::ParameterResolution {
                source: ResolveError::EntityNotFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn sibling_cycle_is_a_sort_error() {
        let config = dashboard(vec![
            ("a", Parameter::Reference(own("b"))),
            ("b", Parameter::Reference(own("a"))),
        ]);
        let err = resolve_parameters(&config, &EntityMap::new(), false).unwrap_err();
        assert!(matches!(err, DeployError::ParameterSort { ref errors, .. } if errors.len() == 2));
    }
}
