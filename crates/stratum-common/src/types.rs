//! Domain primitive types used across the Stratum workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identity of a configuration: project, type and config id.
///
/// Ordering is lexicographic over the three components, which is the
/// same as ordering by the rendered `project:type:id` string for ids
/// that do not contain `:`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Owning project.
    pub project: String,
    /// Type name (classic API id, settings schema, automation resource, ...).
    #[serde(rename = "type")]
    pub config_type: String,
    /// Config id, unique per project and type.
    pub config_id: String,
}

impl Coordinate {
    /// Creates a coordinate from its three components.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        config_type: impl Into<String>,
        config_id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            config_type: config_type.into(),
            config_id: config_id.into(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.project, self.config_type, self.config_id)
    }
}

/// A deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, unique per manifest.
    pub name: String,
    /// Group the environment belongs to (used for group overrides).
    pub group: String,
    /// Base URL of the remote platform.
    pub url: String,
    /// Name of the process environment variable holding the API token.
    #[serde(rename = "token")]
    pub token_env: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_displays_as_colon_triple() {
        let c = Coordinate::new("infra", "dashboard", "d1");
        assert_eq!(c.to_string(), "infra:dashboard:d1");
    }

    #[test]
    fn coordinate_orders_by_project_then_type_then_id() {
        let mut coords = vec![
            Coordinate::new("b", "auto-tag", "x"),
            Coordinate::new("a", "dashboard", "z"),
            Coordinate::new("a", "dashboard", "a"),
            Coordinate::new("a", "auto-tag", "q"),
        ];
        coords.sort();
        let rendered: Vec<String> = coords.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "a:auto-tag:q",
                "a:dashboard:a",
                "a:dashboard:z",
                "b:auto-tag:x"
            ]
        );
    }
}
