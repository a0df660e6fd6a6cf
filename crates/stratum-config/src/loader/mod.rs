//! Manifest and project loading.
//!
//! A manifest lists environments and project directories. Every YAML file
//! of a project directory holds config definitions; each definition is
//! instantiated once per selected environment, with group and environment
//! overrides applied in that order.

pub mod definition;
pub mod validator;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use stratum_common::error::{Result, StratumError};
use stratum_common::types::{Coordinate, Environment};

use crate::api::ApiRegistry;
use crate::configuration::{AutomationResource, ConfigType, Configuration, Project};
use crate::parameter::{Parameter, ParameterReference};
use crate::template::Template;
use definition::{
    ConfigBody, ConfigDefinition, ConfigFile, ManifestDefinition, ParameterDefinition,
    SkipDefinition, TypeDefinition, TypedParameter,
};
use stratum_common::constants::{NAME_PARAMETER, SCOPE_PARAMETER};

const DEFAULT_GROUP: &str = "default";

/// A loaded manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Directory the manifest lives in; project paths are relative to it.
    pub base_dir: PathBuf,
    /// Deployment targets in manifest order.
    pub environments: Vec<Environment>,
    /// Projects in manifest order.
    pub projects: Vec<ProjectEntry>,
}

/// A project listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    /// Project name.
    pub name: String,
    /// Resolved project directory.
    pub path: PathBuf,
}

impl Manifest {
    /// Looks up an environment by name.
    #[must_use]
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Returns the named environments, or all of them when `names` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not defined in the manifest.
    pub fn select_environments(&self, names: &[String]) -> Result<Vec<Environment>> {
        if names.is_empty() {
            return Ok(self.environments.clone());
        }
        names
            .iter()
            .map(|name| {
                self.environment(name)
                    .cloned()
                    .ok_or_else(|| StratumError::NotFound {
                        kind: "environment",
                        id: name.clone(),
                    })
            })
            .collect()
    }
}

/// Loads a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if an
/// environment or project name is defined twice.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    tracing::info!(path = %path.display(), "loading manifest");
    let content = read(path)?;
    let definition: ManifestDefinition = serde_yaml::from_str(&content)?;
    let base_dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);

    let mut environments: Vec<Environment> = Vec::new();
    for env in definition.environments {
        if environments.iter().any(|e| e.name == env.name) {
            return Err(StratumError::Config {
                message: format!("duplicate environment name: \"{}\"", env.name),
            });
        }
        environments.push(Environment {
            name: env.name,
            group: env.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            url: env.url.trim_end_matches('/').to_string(),
            token_env: env.token,
        });
    }

    let mut projects: Vec<ProjectEntry> = Vec::new();
    for project in definition.projects {
        if projects.iter().any(|p| p.name == project.name) {
            return Err(StratumError::Config {
                message: format!("duplicate project name: \"{}\"", project.name),
            });
        }
        let relative = project
            .path
            .unwrap_or_else(|| PathBuf::from(&project.name));
        projects.push(ProjectEntry {
            path: base_dir.join(relative),
            name: project.name,
        });
    }

    Ok(Manifest {
        base_dir,
        environments,
        projects,
    })
}

/// Loads every project of the manifest for the given environments and
/// validates the result.
///
/// # Errors
///
/// Returns every load and validation error found; nothing is dropped.
pub fn load_projects(
    manifest: &Manifest,
    environments: &[Environment],
    apis: &ApiRegistry,
) -> std::result::Result<Vec<Project>, Vec<StratumError>> {
    let mut errors = Vec::new();
    let mut templates = TemplateCache::default();
    let projects: Vec<Project> = manifest
        .projects
        .iter()
        .map(|entry| load_project(entry, environments, &mut templates, &mut errors))
        .collect();

    errors.extend(validator::validate(&projects, apis));
    if errors.is_empty() {
        let count: usize = projects
            .iter()
            .flat_map(|p| p.configs.values())
            .map(Vec::len)
            .sum();
        tracing::info!(projects = projects.len(), configs = count, "projects loaded");
        Ok(projects)
    } else {
        Err(errors)
    }
}

fn load_project(
    entry: &ProjectEntry,
    environments: &[Environment],
    templates: &mut TemplateCache,
    errors: &mut Vec<StratumError>,
) -> Project {
    tracing::debug!(project = %entry.name, path = %entry.path.display(), "loading project");
    let mut project = Project::new(&entry.name);

    let files = match config_files(&entry.path) {
        Ok(files) => files,
        Err(e) => {
            errors.push(e);
            return project;
        }
    };

    for file in files {
        let parsed = read(&file).and_then(|content| {
            serde_yaml::from_str::<ConfigFile>(&content).map_err(|e| StratumError::Config {
                message: format!("{}: {e}", file.display()),
            })
        });
        let config_file = match parsed {
            Ok(config_file) => config_file,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        let dir = file.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        for definition in &config_file.configs {
            for env in environments {
                match instantiate(&entry.name, definition, &dir, env, templates) {
                    Ok(config) => project.add(config),
                    Err(e) => errors.push(e),
                }
            }
        }
    }
    project
}

fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| StratumError::Io {
            path: current.clone(),
            source: e,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|e| StratumError::Io {
                    path: current.clone(),
                    source: e,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn instantiate(
    project: &str,
    definition: &ConfigDefinition,
    dir: &Path,
    env: &Environment,
    templates: &mut TemplateCache,
) -> Result<Configuration> {
    let (config_type, scope) = convert_type(&definition.config_type)?;
    let coordinate = Coordinate::new(project, config_type.type_id(), &definition.id);

    let mut body = Merged::default();
    body.apply(&definition.config, scope.as_ref());
    for group in definition
        .group_overrides
        .iter()
        .filter(|o| o.group == env.group)
    {
        body.apply(&group.body, None);
    }
    for environment in definition
        .environment_overrides
        .iter()
        .filter(|o| o.environment == env.name)
    {
        body.apply(&environment.body, None);
    }

    let mut parameters = BTreeMap::new();
    for (name, parameter) in &body.parameters {
        let converted = convert_parameter(parameter, &coordinate).map_err(|e| StratumError::Config {
            message: format!("{coordinate}: parameter `{name}`: {e}"),
        })?;
        let _ = parameters.insert(name.clone(), converted);
    }

    let template = match body.template {
        Some(ref relative) => {
            let path = dir.join(relative);
            Template::new(path.display().to_string(), templates.load(&path)?)
        }
        None if config_type.is_deployable() => {
            return Err(StratumError::Config {
                message: format!("{coordinate}: no template given"),
            });
        }
        None => Template::new(coordinate.to_string(), "{}"),
    };

    Ok(Configuration {
        skip: resolve_skip(body.skip.as_ref()).map_err(|e| StratumError::Config {
            message: format!("{coordinate}: {e}"),
        })?,
        coordinate,
        group: env.group.clone(),
        environment: env.name.clone(),
        config_type,
        parameters,
        origin_object_id: body.origin_object_id,
        template,
    })
}

#[derive(Default)]
struct Merged {
    parameters: BTreeMap<String, ParameterDefinition>,
    template: Option<String>,
    skip: Option<SkipDefinition>,
    origin_object_id: Option<String>,
}

impl Merged {
    fn apply(&mut self, body: &ConfigBody, scope: Option<&ParameterDefinition>) {
        if let Some(scope) = scope {
            let _ = self
                .parameters
                .insert(SCOPE_PARAMETER.to_string(), scope.clone());
        }
        if let Some(ref name) = body.name {
            let _ = self
                .parameters
                .insert(NAME_PARAMETER.to_string(), name.clone());
        }
        for (key, value) in &body.parameters {
            let _ = self.parameters.insert(key.clone(), value.clone());
        }
        if body.template.is_some() {
            self.template.clone_from(&body.template);
        }
        if body.skip.is_some() {
            self.skip.clone_from(&body.skip);
        }
        if body.origin_object_id.is_some() {
            self.origin_object_id.clone_from(&body.origin_object_id);
        }
    }
}

fn convert_type(definition: &TypeDefinition) -> Result<(ConfigType, Option<ParameterDefinition>)> {
    let detailed = match definition {
        TypeDefinition::Shorthand(name) => {
            let config_type = match name.as_str() {
                "bucket" => ConfigType::Bucket,
                "segment" => ConfigType::Segment,
                api => ConfigType::ClassicApi {
                    api: api.to_string(),
                },
            };
            return Ok((config_type, None));
        }
        TypeDefinition::Detailed(detailed) => detailed,
    };

    let set = usize::from(detailed.api.is_some())
        + usize::from(detailed.settings.is_some())
        + usize::from(detailed.automation.is_some())
        + usize::from(detailed.entities.is_some());
    if set != 1 {
        return Err(StratumError::Config {
            message: format!("type block must set exactly one of api, settings, automation, entities (found {set})"),
        });
    }

    if let Some(ref api) = detailed.api {
        return Ok((ConfigType::ClassicApi { api: api.clone() }, None));
    }
    if let Some(ref settings) = detailed.settings {
        return Ok((
            ConfigType::Settings {
                schema_id: settings.schema.clone(),
                schema_version: settings.schema_version.clone(),
            },
            settings.scope.clone(),
        ));
    }
    if let Some(ref automation) = detailed.automation {
        let resource = AutomationResource::from_name(&automation.resource).ok_or_else(|| {
            StratumError::Config {
                message: format!("unknown automation resource: \"{}\"", automation.resource),
            }
        })?;
        return Ok((ConfigType::Automation { resource }, None));
    }
    let entity_type = detailed
        .entities
        .as_ref()
        .map(|e| e.entities_type.clone())
        .unwrap_or_default();
    Ok((ConfigType::Entity { entity_type }, None))
}

fn convert_parameter(definition: &ParameterDefinition, owner: &Coordinate) -> Result<Parameter> {
    let typed = match definition {
        ParameterDefinition::Plain(value) => return Ok(Parameter::Value(serde_json::to_value(value)?)),
        ParameterDefinition::Typed(typed) => typed,
    };
    Ok(match typed {
        TypedParameter::Value { value } => Parameter::Value(serde_json::to_value(value)?),
        TypedParameter::List { values } => Parameter::List(
            values
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
        ),
        TypedParameter::Environment { name, default } => Parameter::Environment {
            name: name.clone(),
            default: default.clone(),
        },
        TypedParameter::Reference {
            project,
            config_type,
            config_id,
            property,
        } => Parameter::Reference(ParameterReference::new(
            Coordinate::new(
                project.as_deref().unwrap_or(&owner.project),
                config_type.as_deref().unwrap_or(&owner.config_type),
                config_id.as_deref().unwrap_or(&owner.config_id),
            ),
            property,
        )),
        TypedParameter::Compound { format, references } => Parameter::Compound {
            format: format.clone(),
            references: references
                .iter()
                .map(|name| ParameterReference::new(owner.clone(), name))
                .collect(),
        },
    })
}

fn resolve_skip(skip: Option<&SkipDefinition>) -> Result<bool> {
    match skip {
        None => Ok(false),
        Some(SkipDefinition::Flag(flag)) => Ok(*flag),
        Some(SkipDefinition::Environment {
            kind,
            name,
            default,
        }) => {
            if kind != "environment" {
                return Err(StratumError::Config {
                    message: format!("skip must be a bool or an environment parameter, got type \"{kind}\""),
                });
            }
            match std::env::var(name) {
                Ok(value) => value.trim().parse::<bool>().map_err(|_| StratumError::Config {
                    message: format!("environment variable {name} must be true or false, got \"{value}\""),
                }),
                Err(_) => Ok(default.unwrap_or(false)),
            }
        }
    }
}

#[derive(Default)]
struct TemplateCache {
    loaded: HashMap<PathBuf, String>,
}

impl TemplateCache {
    fn load(&mut self, path: &Path) -> Result<String> {
        if let Some(content) = self.loaded.get(path) {
            return Ok(content.clone());
        }
        let content = read(path)?;
        let _ = self.loaded.insert(path.to_path_buf(), content.clone());
        Ok(content)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| StratumError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, content).expect("write");
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        write(
            dir.path(),
            "manifest.yaml",
            r"
environments:
  - { name: dev, url: 'https://dev.example.com/', token: DEV_TOKEN }
  - { name: prod, group: production, url: 'https://prod.example.com', token: PROD_TOKEN }
projects:
  - name: infra
  - name: app
    path: projects/app
",
        );
        write(
            dir.path(),
            "infra/tags.yaml",
            r"
configs:
  - id: tags
    type: auto-tag
    config:
      name: Owner tags
      template: tag.json
    groupOverrides:
      - group: production
        override:
          name: Owner tags (prod)
",
        );
        write(dir.path(), "infra/tag.json", r#"{"name": "{{ .name }}"}"#);
        write(
            dir.path(),
            "projects/app/dashboards.yaml",
            r"
configs:
  - id: d1
    type: { api: dashboard }
    config:
      name: Board
      template: board.json
      parameters:
        tag: { type: reference, project: infra, configType: auto-tag, configId: tags, property: id }
        label: { type: compound, format: '{{ .name }} board', references: [name] }
    environmentOverrides:
      - environment: prod
        override:
          skip: true
  - id: host
    type:
      entities:
        entitiesType: HOST
    config:
      parameters:
        id: HOST-1
",
        );
        write(
            dir.path(),
            "projects/app/board.json",
            r#"{"name": "{{ .name }}", "tag": "{{ .tag }}"}"#,
        );
        dir
    }

    #[test]
    fn manifest_resolves_paths_and_groups() {
        let dir = fixture();
        let manifest = load_manifest(&dir.path().join("manifest.yaml")).expect("manifest");
        assert_eq!(manifest.environments.len(), 2);
        assert_eq!(manifest.environments[0].group, "default");
        assert_eq!(manifest.environments[0].url, "https://dev.example.com");
        assert_eq!(manifest.environments[1].group, "production");
        assert_eq!(manifest.projects[0].path, dir.path().join("infra"));
        assert_eq!(manifest.projects[1].path, dir.path().join("projects/app"));
    }

    #[test]
    fn select_unknown_environment_fails() {
        let dir = fixture();
        let manifest = load_manifest(&dir.path().join("manifest.yaml")).expect("manifest");
        assert_eq!(manifest.select_environments(&[]).expect("all").len(), 2);
        let err = manifest
            .select_environments(&["staging".to_string()])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn reserved_parameter_is_rejected() {
        let dir = fixture();
        let manifest = load_manifest(&dir.path().join("manifest.yaml")).expect("manifest");
        let errors = load_projects(&manifest, &manifest.environments, &ApiRegistry::default())
            .unwrap_err();
        assert!(
            errors.iter().any(|e| e.to_string().contains("reserved")),
            "got: {errors:?}"
        );
    }

    #[test]
    fn projects_load_with_overrides_and_references() {
        let dir = fixture();
        write(
            dir.path(),
            "projects/app/dashboards.yaml",
            &std::fs::read_to_string(dir.path().join("projects/app/dashboards.yaml"))
                .expect("read")
                .replace("id: HOST-1", "hostId: HOST-1"),
        );
        let manifest = load_manifest(&dir.path().join("manifest.yaml")).expect("manifest");
        let projects = load_projects(&manifest, &manifest.environments, &ApiRegistry::default())
            .expect("projects");

        let infra = projects.iter().find(|p| p.id == "infra").expect("infra");
        let prod_tags = &infra.configs_for("prod")[0];
        assert_eq!(
            prod_tags.parameters["name"],
            Parameter::Value(json!("Owner tags (prod)"))
        );
        assert_eq!(
            infra.configs_for("dev")[0].parameters["name"],
            Parameter::Value(json!("Owner tags"))
        );

        let app = projects.iter().find(|p| p.id == "app").expect("app");
        let d1_prod = app
            .configs_for("prod")
            .iter()
            .find(|c| c.coordinate.config_id == "d1")
            .expect("d1");
        assert!(d1_prod.skip);
        assert_eq!(
            d1_prod.references(),
            vec![
                Coordinate::new("app", "dashboard", "d1"),
                Coordinate::new("infra", "auto-tag", "tags"),
            ]
        );
        assert!(d1_prod.template.content.contains("{{ .tag }}"));

        let host = app
            .configs_for("dev")
            .iter()
            .find(|c| c.coordinate.config_id == "host")
            .expect("host");
        assert!(!host.config_type.is_deployable());
        assert_eq!(host.coordinate.config_type, "HOST");
        assert_eq!(app.dependencies_for("dev").len(), 1);
    }

    #[test]
    fn missing_template_is_reported_per_environment() {
        let dir = fixture();
        write(
            dir.path(),
            "infra/broken.yaml",
            "configs:\n  - id: nope\n    type: auto-tag\n    config: { name: x }\n",
        );
        let manifest = load_manifest(&dir.path().join("manifest.yaml")).expect("manifest");
        let errors = load_projects(&manifest, &manifest.environments, &ApiRegistry::default())
            .unwrap_err();
        let missing = errors
            .iter()
            .filter(|e| e.to_string().contains("no template given"))
            .count();
        assert_eq!(missing, 2, "got: {errors:?}");
    }

    #[test]
    fn skip_from_environment_uses_default_when_unset() {
        let skip = SkipDefinition::Environment {
            kind: "environment".into(),
            name: "STRATUM_TEST_SURELY_UNSET_SKIP".into(),
            default: Some(true),
        };
        assert!(resolve_skip(Some(&skip)).expect("skip"));
        assert!(!resolve_skip(None).expect("skip"));

        let wrong = SkipDefinition::Environment {
            kind: "reference".into(),
            name: "X".into(),
            default: None,
        };
        assert!(resolve_skip(Some(&wrong)).is_err());
    }

    #[test]
    fn detailed_type_with_two_kinds_fails() {
        let definition: TypeDefinition =
            serde_yaml::from_str("{ api: dashboard, entities: { entitiesType: HOST } }")
                .expect("parse");
        assert!(convert_type(&definition).is_err());
    }
}
