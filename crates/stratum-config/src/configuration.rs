//! Configurations, their type variants, and the projects that own them.
//!
//! A [`Configuration`] is one deployable (or reference-only) object for
//! one environment. Its outgoing references are derived from its
//! parameters without resolving anything, which is all the graph layer
//! needs to order configurations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use stratum_common::types::Coordinate;

use crate::parameter::{Parameter, ParameterReference};
use crate::template::Template;

/// Resource kinds of the automation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationResource {
    /// Automation workflow.
    Workflow,
    /// Business calendar used by scheduling rules.
    BusinessCalendar,
    /// Scheduling rule.
    SchedulingRule,
}

impl AutomationResource {
    /// Returns the coordinate type name of the resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::BusinessCalendar => "business-calendar",
            Self::SchedulingRule => "scheduling-rule",
        }
    }

    /// Returns the URL path segment of the resource collection.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Workflow => "workflows",
            Self::BusinessCalendar => "business-calendars",
            Self::SchedulingRule => "scheduling-rules",
        }
    }

    /// Parses a resource from its coordinate type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "workflow" => Some(Self::Workflow),
            "business-calendar" => Some(Self::BusinessCalendar),
            "scheduling-rule" => Some(Self::SchedulingRule),
            _ => None,
        }
    }
}

impl fmt::Display for AutomationResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of configuration type variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigType {
    /// Classic configuration API object, upserted by name.
    ClassicApi {
        /// Id of the API in the [`ApiRegistry`](crate::api::ApiRegistry).
        api: String,
    },
    /// Settings object, upserted by external id.
    Settings {
        /// Settings schema id.
        schema_id: String,
        /// Optional pinned schema version.
        schema_version: Option<String>,
    },
    /// Automation resource, upserted by id.
    Automation {
        /// Resource kind.
        resource: AutomationResource,
    },
    /// Storage bucket definition.
    Bucket,
    /// Filter segment.
    Segment,
    /// Pre-existing monitored entity; referenced only, never deployed.
    Entity {
        /// Entity type (for example `HOST`).
        entity_type: String,
    },
}

impl ConfigType {
    /// Returns the type name used in coordinates.
    #[must_use]
    pub fn type_id(&self) -> &str {
        match self {
            Self::ClassicApi { api } => api,
            Self::Settings { schema_id, .. } => schema_id,
            Self::Automation { resource } => resource.as_str(),
            Self::Bucket => "bucket",
            Self::Segment => "segment",
            Self::Entity { entity_type } => entity_type,
        }
    }

    /// Returns whether configurations of this type are sent to the platform.
    #[must_use]
    pub const fn is_deployable(&self) -> bool {
        !matches!(self, Self::Entity { .. })
    }
}

/// One configuration for one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Identity of the configuration.
    pub coordinate: Coordinate,
    /// Environment group the configuration was loaded for.
    pub group: String,
    /// Environment the configuration was loaded for.
    pub environment: String,
    /// Type variant.
    pub config_type: ConfigType,
    /// Named parameters, resolved at deploy time.
    pub parameters: BTreeMap<String, Parameter>,
    /// Whether deployment is suppressed.
    pub skip: bool,
    /// Id of a pre-existing remote object this configuration takes over.
    pub origin_object_id: Option<String>,
    /// Payload template.
    pub template: Template,
}

impl Configuration {
    /// Iterates over every parameter reference of every parameter.
    pub fn parameter_references(&self) -> impl Iterator<Item = &ParameterReference> {
        self.parameters.values().flat_map(Parameter::references)
    }

    /// Returns the de-duplicated coordinates this configuration references.
    ///
    /// References to the configuration's own coordinate (intra-config
    /// parameter references) are included.
    #[must_use]
    pub fn references(&self) -> Vec<Coordinate> {
        self.parameter_references()
            .map(|r| r.coordinate.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns whether any parameter references a property of `other`.
    #[must_use]
    pub fn has_dependency_on(&self, other: &Self) -> bool {
        self.coordinate != other.coordinate
            && self
                .parameter_references()
                .any(|r| r.coordinate == other.coordinate)
    }
}

/// A project: every configuration it owns, per environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// Project name, the first coordinate component of its configurations.
    pub id: String,
    /// Configurations keyed by environment name.
    pub configs: BTreeMap<String, Vec<Configuration>>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configs: BTreeMap::new(),
        }
    }

    /// Adds a configuration under its environment.
    pub fn add(&mut self, config: Configuration) {
        self.configs
            .entry(config.environment.clone())
            .or_default()
            .push(config);
    }

    /// Returns the configurations loaded for `environment`.
    #[must_use]
    pub fn configs_for(&self, environment: &str) -> &[Configuration] {
        self.configs
            .get(environment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the other projects referenced by this project's
    /// configurations in `environment`.
    #[must_use]
    pub fn dependencies_for(&self, environment: &str) -> BTreeSet<String> {
        self.configs_for(environment)
            .iter()
            .flat_map(Configuration::parameter_references)
            .map(|r| &r.coordinate.project)
            .filter(|project| **project != self.id)
            .cloned()
            .collect()
    }

    /// Returns whether this project references `other` in `environment`.
    #[must_use]
    pub fn has_dependency_on(&self, environment: &str, other: &Self) -> bool {
        self.id != other.id
            && self
                .configs_for(environment)
                .iter()
                .flat_map(Configuration::parameter_references)
                .any(|r| r.coordinate.project == other.id)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{config, reference};
    use super::*;

    #[test]
    fn type_id_matches_variant() {
        assert_eq!(
            ConfigType::ClassicApi {
                api: "dashboard".into()
            }
            .type_id(),
            "dashboard"
        );
        assert_eq!(
            ConfigType::Settings {
                schema_id: "builtin:tags.auto-tagging".into(),
                schema_version: None,
            }
            .type_id(),
            "builtin:tags.auto-tagging"
        );
        assert_eq!(
            ConfigType::Automation {
                resource: AutomationResource::BusinessCalendar
            }
            .type_id(),
            "business-calendar"
        );
        assert_eq!(ConfigType::Bucket.type_id(), "bucket");
    }

    #[test]
    fn only_entities_are_not_deployable() {
        assert!(ConfigType::Segment.is_deployable());
        assert!(
            !ConfigType::Entity {
                entity_type: "HOST".into()
            }
            .is_deployable()
        );
    }

    #[test]
    fn automation_resource_names_roundtrip() {
        for resource in [
            AutomationResource::Workflow,
            AutomationResource::BusinessCalendar,
            AutomationResource::SchedulingRule,
        ] {
            assert_eq!(AutomationResource::from_name(resource.as_str()), Some(resource));
        }
        assert_eq!(AutomationResource::from_name("dashboard"), None);
    }

    #[test]
    fn references_are_deduplicated_and_include_self() {
        let mut d1 = config("p", "dashboard", "d1");
        let _ = d1
            .parameters
            .insert("a".into(), reference("p", "auto-tag", "tags", "id"));
        let _ = d1
            .parameters
            .insert("b".into(), reference("p", "auto-tag", "tags", "name"));
        let _ = d1
            .parameters
            .insert("c".into(), reference("p", "dashboard", "d1", "a"));

        let refs = d1.references();
        assert_eq!(
            refs,
            vec![
                Coordinate::new("p", "auto-tag", "tags"),
                Coordinate::new("p", "dashboard", "d1"),
            ]
        );
    }

    #[test]
    fn self_reference_is_not_a_dependency() {
        let mut d1 = config("p", "dashboard", "d1");
        let _ = d1
            .parameters
            .insert("c".into(), reference("p", "dashboard", "d1", "a"));
        assert!(!d1.has_dependency_on(&d1.clone()));
    }

    #[test]
    fn dependency_detected_through_reference() {
        let tags = config("p", "auto-tag", "tags");
        let mut d1 = config("p", "dashboard", "d1");
        let _ = d1
            .parameters
            .insert("tag".into(), reference("p", "auto-tag", "tags", "id"));
        assert!(d1.has_dependency_on(&tags));
        assert!(!tags.has_dependency_on(&d1));
    }

    #[test]
    fn project_dependencies_exclude_itself() {
        let mut project = Project::new("app");
        let mut d1 = config("app", "dashboard", "d1");
        let _ = d1
            .parameters
            .insert("tag".into(), reference("infra", "auto-tag", "tags", "id"));
        let _ = d1
            .parameters
            .insert("own".into(), reference("app", "alerting-profile", "a", "id"));
        project.add(d1);

        let deps = project.dependencies_for("dev");
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["infra"]);
        assert!(project.dependencies_for("prod").is_empty());
        assert!(project.has_dependency_on("dev", &Project::new("infra")));
        assert!(!project.has_dependency_on("dev", &Project::new("other")));
    }
}
