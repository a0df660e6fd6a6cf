//! Resolved entity store.
//!
//! Every configuration deployed (or skipped) during one environment pass
//! leaves a [`ResolvedEntity`] behind. Later configurations resolve their
//! references against this store, so it is only ever written by the single
//! thread deploying that environment. Stores are never shared between
//! environments.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use stratum_common::types::Coordinate;


/// The outcome of deploying one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntity {
    /// Name of the remote object (config id for skipped configurations).
    pub entity_name: String,
    /// Configuration the entity was produced by.
    pub coordinate: Coordinate,
    /// Properties available to references: resolved parameters plus the
    /// remote id and name.
    pub properties: BTreeMap<String, Value>,
    /// Whether the configuration was skipped.
    pub skip: bool,
}

impl ResolvedEntity {
    /// Creates the placeholder entity of a skipped configuration.
    #[must_use]
    pub fn skipped(coordinate: Coordinate) -> Self {
        Self {
            entity_name: coordinate.config_id.clone(),
            coordinate,
            properties: BTreeMap::new(),
            skip: true,
        }
    }
}

/// Append-only store of the entities resolved in one environment pass.
#[derive(Debug, Default)]
pub struct EntityMap {
    entities: HashMap<Coordinate, ResolvedEntity>,
    names: HashMap<String, HashSet<String>>,
}

impl EntityMap {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity under its coordinate.
    pub fn put(&mut self, entity: ResolvedEntity) {
        let _ = self.entities.insert(entity.coordinate.clone(), entity);
    }

    /// Looks up the entity of a coordinate (exact match).
    #[must_use]
    pub fn get(&self, coordinate: &Coordinate) -> Option<&ResolvedEntity> {
        self.entities.get(coordinate)
    }

    /// Returns a read-only view of every stored entity.
    #[must_use]
    pub const fn snapshot(&self) -> &HashMap<Coordinate, ResolvedEntity> {
        &self.entities
    }

    /// Records that `name` was deployed through the classic API `api`.
    ///
    /// Returns `false` if the name was already taken in this pass.
    pub fn register_name(&mut self, api: &str, name: &str) -> bool {
        self.names
            .entry(api.to_string())
            .or_default()
            .insert(name.to_string())
    }

    /// Returns whether `name` was already deployed through `api`.
    #[must_use]
    pub fn contains_name(&self, api: &str, name: &str) -> bool {
        self.names.get(api).is_some_and(|names| names.contains(name))
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns whether nothing was stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
