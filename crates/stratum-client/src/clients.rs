//! Client traits, one per configuration family.
//!
//! The deployer only talks to these traits. [`RestClient`](crate::rest::RestClient)
//! implements all of them against the platform; tests plug in recording
//! doubles.

use std::sync::Arc;

use serde_json::Value;
use stratum_common::error::Result;
use stratum_config::api::Api;
use stratum_config::configuration::AutomationResource;

/// Identity of an object on the platform after an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Platform id of the object.
    pub id: String,
    /// Object name as the platform reports it.
    pub name: String,
}

/// A settings object to create or update.
#[derive(Debug, Clone, Copy)]
pub struct SettingsObject<'a> {
    /// Settings schema id.
    pub schema_id: &'a str,
    /// Pinned schema version.
    pub schema_version: Option<&'a str>,
    /// Scope the object applies to.
    pub scope: &'a str,
    /// Stable external id used to find the object again.
    pub external_id: &'a str,
    /// Existing object to take over when none carries the external id yet.
    pub origin_object_id: Option<&'a str>,
    /// Rendered object value.
    pub value: &'a Value,
}

/// Classic configuration API client, keyed by object name.
pub trait ClassicClient: Send + Sync {
    /// Creates or updates the object called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn upsert_by_name(&self, api: &Api, name: &str, payload: &Value) -> Result<RemoteObject>;

    /// Deletes the object called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::NotFound`](stratum_common::error::StratumError::NotFound)
    /// if no such object exists, or another error if the request fails.
    fn delete_by_name(&self, api: &Api, name: &str) -> Result<()>;
}

/// Settings API client, keyed by external id.
pub trait SettingsClient: Send + Sync {
    /// Creates or updates a settings object.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn upsert(&self, object: &SettingsObject<'_>) -> Result<RemoteObject>;

    /// Deletes the object of `schema_id` carrying `external_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such object exists, or another error if
    /// the request fails.
    fn delete_by_external_id(&self, schema_id: &str, external_id: &str) -> Result<()>;
}

/// Automation API client, keyed by object id.
pub trait AutomationClient: Send + Sync {
    /// Creates or updates the resource with id `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn upsert(&self, resource: AutomationResource, id: &str, payload: &Value) -> Result<RemoteObject>;

    /// Deletes the resource with id `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such resource exists, or another error if
    /// the request fails.
    fn delete(&self, resource: AutomationResource, id: &str) -> Result<()>;
}

/// Storage bucket client, keyed by bucket name.
pub trait BucketClient: Send + Sync {
    /// Creates or updates the bucket `bucket_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn upsert(&self, bucket_name: &str, payload: &Value) -> Result<RemoteObject>;

    /// Deletes the bucket `bucket_name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such bucket exists, or another error if
    /// the request fails.
    fn delete(&self, bucket_name: &str) -> Result<()>;
}

/// Filter segment client, keyed by external id.
pub trait SegmentClient: Send + Sync {
    /// Creates or updates the segment carrying `external_id`, taking over
    /// `origin_object_id` when no segment carries it yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn upsert(
        &self,
        external_id: &str,
        origin_object_id: Option<&str>,
        payload: &Value,
    ) -> Result<RemoteObject>;

    /// Deletes the segment carrying `external_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such segment exists, or another error if
    /// the request fails.
    fn delete_by_external_id(&self, external_id: &str) -> Result<()>;
}

/// The clients of one environment.
#[derive(Clone)]
pub struct ClientSet {
    /// Classic configuration API.
    pub classic: Arc<dyn ClassicClient>,
    /// Settings API.
    pub settings: Arc<dyn SettingsClient>,
    /// Automation API.
    pub automation: Arc<dyn AutomationClient>,
    /// Storage bucket API.
    pub buckets: Arc<dyn BucketClient>,
    /// Filter segment API.
    pub segments: Arc<dyn SegmentClient>,
}

impl ClientSet {
    /// Uses one client for every family.
    pub fn uniform<C>(client: Arc<C>) -> Self
    where
        C: ClassicClient + SettingsClient + AutomationClient + BucketClient + SegmentClient + 'static,
    {
        Self {
            classic: client.clone(),
            settings: client.clone(),
            automation: client.clone(),
            buckets: client.clone(),
            segments: client,
        }
    }
}
