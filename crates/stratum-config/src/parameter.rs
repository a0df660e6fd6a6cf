//! Configuration parameters and their resolution.
//!
//! Parameters are resolved lazily, once, right before a configuration is
//! rendered. Their references are available without resolving anything so
//! the graph layer can order configurations (and parameters within one
//! configuration) ahead of time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stratum_common::types::Coordinate;
use thiserror::Error;

use crate::entity::EntityMap;
use crate::template::{self, Escape, RenderError};

/// A reference to a property of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterReference {
    /// Referenced configuration.
    pub coordinate: Coordinate,
    /// Referenced property (or parameter name, for intra-config references).
    pub property: String,
}

impl ParameterReference {
    /// Creates a reference to `property` of the configuration at `coordinate`.
    #[must_use]
    pub fn new(coordinate: Coordinate, property: impl Into<String>) -> Self {
        Self {
            coordinate,
            property: property.into(),
        }
    }
}

impl fmt::Display for ParameterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.coordinate, self.property)
    }
}

/// A named parameter of a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// A terminal JSON value.
    Value(Value),
    /// A list of terminal values, resolved to a JSON array.
    List(Vec<Value>),
    /// A process environment variable.
    Environment {
        /// Variable name.
        name: String,
        /// Value used when the variable is unset.
        default: Option<String>,
    },
    /// A property of another configuration, or another parameter of the
    /// same configuration.
    Reference(ParameterReference),
    /// A format string over other parameters of the same configuration.
    Compound {
        /// Format string using `{{ .name }}` placeholders.
        format: String,
        /// Parameters the format string uses.
        references: Vec<ParameterReference>,
    },
}

impl Parameter {
    /// Returns the kind name used in configuration files.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::List(_) => "list",
            Self::Environment { .. } => "environment",
            Self::Reference(_) => "reference",
            Self::Compound { .. } => "compound",
        }
    }

    /// Returns the references of this parameter without resolving it.
    #[must_use]
    pub fn references(&self) -> &[ParameterReference] {
        match self {
            Self::Reference(reference) => std::slice::from_ref(reference),
            Self::Compound { references, .. } => references,
            Self::Value(_) | Self::List(_) | Self::Environment { .. } => &[],
        }
    }

    /// Resolves the parameter to a concrete value.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity, property or own parameter is
    /// not available, if an environment variable is unset without default,
    /// or if a compound format cannot be rendered.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, ResolveError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::List(values) => Ok(Value::Array(values.clone())),
            Self::Environment { name, default } => resolve_environment(ctx, name, default.as_deref()),
            Self::Reference(reference) => resolve_reference(ctx, reference),
            Self::Compound { format, references } => {
                let mut values = BTreeMap::new();
                for reference in references {
                    let value = resolve_reference(ctx, reference)?;
                    let _ = values.insert(reference.property.clone(), value);
                }
                template::render_text(format, &values, Escape::None)
                    .map(Value::String)
                    .map_err(|source| ResolveError::Compound {
                        parameter: ctx.parameter.to_string(),
                        source,
                    })
            }
        }
    }
}

/// Everything a parameter may consult while resolving.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Configuration owning the parameter.
    pub coordinate: &'a Coordinate,
    /// Environment being deployed.
    pub environment: &'a str,
    /// Name of the parameter being resolved.
    pub parameter: &'a str,
    /// Entities deployed earlier in this pass.
    pub entities: &'a EntityMap,
    /// Parameters of the owning configuration resolved so far.
    pub resolved_parameters: &'a BTreeMap<String, Value>,
    /// Whether references to skipped configurations are errors.
    pub strict_skipped_references: bool,
}

/// Failure to resolve a single parameter.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The referenced configuration has not been deployed in this pass.
    #[error("parameter `{parameter}` references `{reference}`, but that configuration has not been deployed")]
    EntityNotFound {
        /// Parameter being resolved.
        parameter: String,
        /// Unresolvable reference.
        reference: ParameterReference,
    },

    /// The referenced configuration has no such property.
    #[error("parameter `{parameter}` references `{reference}`, but that configuration has no property `{}`", .reference.property)]
    PropertyNotFound {
        /// Parameter being resolved.
        parameter: String,
        /// Unresolvable reference.
        reference: ParameterReference,
    },

    /// The referenced configuration was skipped and strict mode is on.
    #[error("parameter `{parameter}` references `{reference}`, but that configuration is skipped")]
    SkippedReference {
        /// Parameter being resolved.
        parameter: String,
        /// Reference into the skipped configuration.
        reference: ParameterReference,
    },

    /// A parameter of the same configuration is not resolved yet.
    #[error("parameter `{parameter}` references parameter `{property}` of the same configuration, which is not resolved")]
    OwnParameterNotResolved {
        /// Parameter being resolved.
        parameter: String,
        /// Missing sibling parameter.
        property: String,
    },

    /// An environment variable is unset and has no default.
    #[error("parameter `{parameter}` needs environment variable `{name}`, which is not set")]
    EnvironmentVariableMissing {
        /// Parameter being resolved.
        parameter: String,
        /// Variable name.
        name: String,
    },

    /// A compound format failed to render.
    #[error("compound parameter `{parameter}`: {source}")]
    Compound {
        /// Parameter being resolved.
        parameter: String,
        /// Render failure.
        source: RenderError,
    },
}

fn resolve_environment(
    ctx: &ResolveContext<'_>,
    name: &str,
    default: Option<&str>,
) -> Result<Value, ResolveError> {
    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(Value::String(value)),
        (Err(_), Some(default)) => Ok(Value::String(default.to_string())),
        (Err(_), None) => Err(ResolveError::EnvironmentVariableMissing {
            parameter: ctx.parameter.to_string(),
            name: name.to_string(),
        }),
    }
}

fn resolve_reference(
    ctx: &ResolveContext<'_>,
    reference: &ParameterReference,
) -> Result<Value, ResolveError> {
    if reference.coordinate == *ctx.coordinate {
        return ctx
            .resolved_parameters
            .get(&reference.property)
            .cloned()
            .ok_or_else(|| ResolveError::OwnParameterNotResolved {
                parameter: ctx.parameter.to_string(),
                property: reference.property.clone(),
            });
    }

    let Some(entity) = ctx.entities.get(&reference.coordinate) else {
        return Err(ResolveError::EntityNotFound {
            parameter: ctx.parameter.to_string(),
            reference: reference.clone(),
        });
    };

    if entity.skip {
        if ctx.strict_skipped_references {
            return Err(ResolveError::SkippedReference {
                parameter: ctx.parameter.to_string(),
                reference: reference.clone(),
            });
        }
        tracing::warn!(
            coordinate = %ctx.coordinate,
            environment = ctx.environment,
            reference = %reference,
            "reference to skipped configuration resolves to null"
        );
        return Ok(entity.properties.get(&reference.property).cloned().unwrap_or(Value::Null));
    }

    entity
        .properties
        .get(&reference.property)
        .cloned()
        .ok_or_else(|| ResolveError::PropertyNotFound {
            parameter: ctx.parameter.to_string(),
            reference: reference.clone(),
        })
}
