//! Registry of classic configuration APIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A classic configuration API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    /// Id used as coordinate type.
    pub id: String,
    /// URL path of the API collection.
    pub url_path: String,
    /// Whether several objects may share one name.
    pub non_unique_name: bool,
    /// Whether the API holds exactly one object per environment.
    pub single_configuration: bool,
}

impl Api {
    /// Creates a unique-name collection API.
    #[must_use]
    pub fn new(id: impl Into<String>, url_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url_path: url_path.into(),
            non_unique_name: false,
            single_configuration: false,
        }
    }

    /// Marks the API as allowing duplicate names.
    #[must_use]
    pub const fn with_non_unique_name(mut self) -> Self {
        self.non_unique_name = true;
        self
    }

    /// Marks the API as a single-configuration API.
    #[must_use]
    pub const fn with_single_configuration(mut self) -> Self {
        self.single_configuration = true;
        self
    }
}

/// Lookup of the classic APIs known to a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRegistry {
    apis: BTreeMap<String, Api>,
}

impl ApiRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            apis: BTreeMap::new(),
        }
    }

    /// Creates the registry of built-in APIs.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for api in [
            Api::new("alerting-profile", "/api/config/v1/alertingProfiles"),
            Api::new("auto-tag", "/api/config/v1/autoTags"),
            Api::new("dashboard", "/api/config/v1/dashboards").with_non_unique_name(),
            Api::new("management-zone", "/api/config/v1/managementZones"),
            Api::new("notification", "/api/config/v1/notifications"),
            Api::new("request-attributes", "/api/config/v1/service/requestAttributes"),
            Api::new(
                "frequent-issue-detection",
                "/api/config/v1/frequentIssueDetection",
            )
            .with_single_configuration(),
        ] {
            registry.insert(api);
        }
        registry
    }

    /// Adds or replaces an API.
    pub fn insert(&mut self, api: Api) {
        let _ = self.apis.insert(api.id.clone(), api);
    }

    /// Looks up an API by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Api> {
        self.apis.get(id)
    }

    /// Returns whether an API id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.apis.contains_key(id)
    }

    /// Iterates over the registered APIs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Api> {
        self.apis.values()
    }
}

impl Default for ApiRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
