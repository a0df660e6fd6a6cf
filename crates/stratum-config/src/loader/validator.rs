//! Semantic checks over loaded projects.
//!
//! Runs before anything is sorted or deployed, so that every problem of a
//! project tree is reported in one go.

use std::collections::{BTreeMap, HashSet};

use stratum_common::constants::{NAME_PARAMETER, RESERVED_PARAMETERS, SCOPE_PARAMETER};
use stratum_common::error::StratumError;
use stratum_common::types::Coordinate;

use crate::api::ApiRegistry;
use crate::configuration::{ConfigType, Configuration, Project};

/// Validates loaded projects and returns every problem found.
///
/// # Checks performed
///
/// 1. No coordinate is defined twice in one environment.
/// 2. Classic configs name a registered API and carry a `name` parameter
///    unless the API is single-configuration.
/// 3. Settings configs carry a `scope` parameter.
/// 4. No config defines a reserved parameter.
/// 5. References to the config's own parameters name a defined parameter.
/// 6. References to other configs name a config loaded for the same
///    environment.
#[must_use]
pub fn validate(projects: &[Project], apis: &ApiRegistry) -> Vec<StratumError> {
    tracing::info!(projects = projects.len(), "validating projects");
    let mut errors = Vec::new();

    let mut by_environment: BTreeMap<&str, Vec<&Configuration>> = BTreeMap::new();
    for project in projects {
        for (environment, configs) in &project.configs {
            by_environment
                .entry(environment.as_str())
                .or_default()
                .extend(configs);
        }
    }

    for (environment, configs) in &by_environment {
        let known = check_duplicates(environment, configs, &mut errors);
        for config in configs {
            check_required_parameters(config, apis, &mut errors);
            check_reserved_parameters(config, &mut errors);
            check_references(config, &known, &mut errors);
        }
    }
    errors
}

fn check_duplicates<'a>(
    environment: &str,
    configs: &[&'a Configuration],
    errors: &mut Vec<StratumError>,
) -> HashSet<&'a Coordinate> {
    let mut seen = HashSet::new();
    for config in configs {
        if !seen.insert(&config.coordinate) {
            errors.push(StratumError::Config {
                message: format!(
                    "duplicate config \"{}\" in environment \"{environment}\"",
                    config.coordinate
                ),
            });
        }
    }
    seen
}

fn check_required_parameters(
    config: &Configuration,
    apis: &ApiRegistry,
    errors: &mut Vec<StratumError>,
) {
    match config.config_type {
        ConfigType::ClassicApi { ref api } => match apis.get(api) {
            None => errors.push(StratumError::NotFound {
                kind: "api",
                id: format!("\"{api}\" used by {}", config.coordinate),
            }),
            Some(api) => {
                if !api.single_configuration && !config.parameters.contains_key(NAME_PARAMETER) {
                    errors.push(missing_parameter(config, NAME_PARAMETER));
                }
            }
        },
        ConfigType::Settings { .. } => {
            if !config.parameters.contains_key(SCOPE_PARAMETER) {
                errors.push(missing_parameter(config, SCOPE_PARAMETER));
            }
        }
        _ => {}
    }
}

fn missing_parameter(config: &Configuration, name: &str) -> StratumError {
    StratumError::Config {
        message: format!(
            "{} ({}) has no `{name}` parameter",
            config.coordinate, config.environment
        ),
    }
}

fn check_reserved_parameters(config: &Configuration, errors: &mut Vec<StratumError>) {
    for reserved in RESERVED_PARAMETERS {
        if config.parameters.contains_key(reserved) {
            errors.push(StratumError::Config {
                message: format!(
                    "{} ({}) defines reserved parameter `{reserved}`",
                    config.coordinate, config.environment
                ),
            });
        }
    }
}

fn check_references(
    config: &Configuration,
    known: &HashSet<&Coordinate>,
    errors: &mut Vec<StratumError>,
) {
    for (name, parameter) in &config.parameters {
        for reference in parameter.references() {
            if reference.coordinate == config.coordinate {
                if reference.property == *name {
                    errors.push(StratumError::Config {
                        message: format!(
                            "parameter `{name}` of {} ({}) references itself",
                            config.coordinate, config.environment
                        ),
                    });
                } else if !config.parameters.contains_key(&reference.property) {
                    errors.push(StratumError::NotFound {
                        kind: "parameter",
                        id: format!(
                            "`{}` referenced by `{name}` of {} ({})",
                            reference.property, config.coordinate, config.environment
                        ),
                    });
                }
            } else if !known.contains(&reference.coordinate) {
                errors.push(StratumError::NotFound {
                    kind: "config",
                    id: format!(
                        "{} referenced by `{name}` of {} ({})",
                        reference.coordinate, config.coordinate, config.environment
                    ),
                });
            }
        }
    }
}
