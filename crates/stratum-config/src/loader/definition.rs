//! Serde model of manifest and config YAML files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Root of `manifest.yaml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDefinition {
    /// Deployment targets.
    #[serde(default)]
    pub environments: Vec<EnvironmentDefinition>,
    /// Projects, each a directory of config files.
    #[serde(default)]
    pub projects: Vec<ProjectDefinition>,
}

/// One environment entry of the manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentDefinition {
    /// Environment name.
    pub name: String,
    /// Group name; `default` when omitted.
    pub group: Option<String>,
    /// Base URL of the platform.
    pub url: String,
    /// Environment variable holding the API token.
    pub token: String,
}

/// One project entry of the manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDefinition {
    /// Project name.
    pub name: String,
    /// Directory relative to the manifest; the project name when omitted.
    pub path: Option<PathBuf>,
}

/// A config YAML file.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    /// Config definitions.
    #[serde(default)]
    pub configs: Vec<ConfigDefinition>,
}

/// One config definition, instantiated once per environment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDefinition {
    /// Config id.
    pub id: String,
    /// Type block.
    #[serde(rename = "type")]
    pub config_type: TypeDefinition,
    /// Base settings.
    pub config: ConfigBody,
    /// Overrides per environment group.
    #[serde(default)]
    pub group_overrides: Vec<GroupOverride>,
    /// Overrides per environment, applied after group overrides.
    #[serde(default)]
    pub environment_overrides: Vec<EnvironmentOverride>,
}

/// The `type:` block: a shorthand string or a single-key detailed map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TypeDefinition {
    /// `bucket`, `segment`, or a classic API id.
    Shorthand(String),
    /// One of `api`, `settings`, `automation`, `entities`.
    Detailed(DetailedType),
}

/// Detailed type block; exactly one field must be set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedType {
    /// Classic API id.
    pub api: Option<String>,
    /// Settings schema.
    pub settings: Option<SettingsDefinition>,
    /// Automation resource.
    pub automation: Option<AutomationDefinition>,
    /// Entity type.
    pub entities: Option<EntitiesDefinition>,
}

/// Settings type block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsDefinition {
    /// Schema id.
    pub schema: String,
    /// Pinned schema version.
    pub schema_version: Option<String>,
    /// Scope parameter.
    pub scope: Option<ParameterDefinition>,
}

/// Automation type block.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutomationDefinition {
    /// Resource name (`workflow`, `business-calendar`, `scheduling-rule`).
    pub resource: String,
}

/// Entities type block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntitiesDefinition {
    /// Entity type.
    pub entities_type: String,
}

/// Base settings of a config definition.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBody {
    /// Name parameter.
    pub name: Option<ParameterDefinition>,
    /// Template path relative to the config file.
    pub template: Option<String>,
    /// Skip flag.
    pub skip: Option<SkipDefinition>,
    /// Pre-existing remote object to take over.
    pub origin_object_id: Option<String>,
    /// Named parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDefinition>,
}

/// Override of a group.
#[derive(Debug, Deserialize)]
pub struct GroupOverride {
    /// Group name.
    pub group: String,
    /// Overridden settings.
    #[serde(rename = "override")]
    pub body: ConfigBody,
}

/// Override of an environment.
#[derive(Debug, Deserialize)]
pub struct EnvironmentOverride {
    /// Environment name.
    pub environment: String,
    /// Overridden settings.
    #[serde(rename = "override")]
    pub body: ConfigBody,
}

/// `skip:` as a plain flag or deferred to an environment variable.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkipDefinition {
    /// Literal flag.
    Flag(bool),
    /// `{ type: environment, name: VAR, default: false }`.
    Environment {
        /// Must be `environment`.
        #[serde(rename = "type")]
        kind: String,
        /// Variable name.
        name: String,
        /// Value when the variable is unset.
        #[serde(default)]
        default: Option<bool>,
    },
}

/// A parameter: a typed block or a plain value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterDefinition {
    /// Block with a `type:` discriminator.
    Typed(TypedParameter),
    /// Any other YAML value, taken as a value parameter.
    Plain(serde_yaml::Value),
}

/// Typed parameter block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypedParameter {
    /// `{ type: value, value: ... }`.
    Value {
        /// The value.
        value: serde_yaml::Value,
    },
    /// `{ type: list, values: [...] }`.
    List {
        /// The values.
        values: Vec<serde_yaml::Value>,
    },
    /// `{ type: environment, name: VAR, default: ... }`.
    Environment {
        /// Variable name.
        name: String,
        /// Default value.
        #[serde(default)]
        default: Option<String>,
    },
    /// `{ type: reference, project, configType, configId, property }`.
    Reference {
        /// Referenced project; the owner's when omitted.
        #[serde(default)]
        project: Option<String>,
        /// Referenced type; the owner's when omitted.
        #[serde(default, rename = "configType")]
        config_type: Option<String>,
        /// Referenced config id; the owner's when omitted.
        #[serde(default, rename = "configId")]
        config_id: Option<String>,
        /// Referenced property.
        property: String,
    },
    /// `{ type: compound, format, references: [param, ...] }`.
    Compound {
        /// Format string.
        format: String,
        /// Names of sibling parameters used by the format.
        #[serde(default)]
        references: Vec<String>,
    },
}
