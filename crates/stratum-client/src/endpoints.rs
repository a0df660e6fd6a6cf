//! URLs of the platform APIs.

use stratum_config::api::Api;
use stratum_config::configuration::AutomationResource;

const SETTINGS_OBJECTS: &str = "/api/v2/settings/objects";
const AUTOMATION: &str = "/platform/automation/v1";
const BUCKETS: &str = "/platform/storage/management/v1/bucket-definitions";
const SEGMENTS: &str = "/platform/storage/filter-segments/v1/filter-segments";

/// Collection URL of a classic API.
#[must_use]
pub fn classic_collection(base: &str, api: &Api) -> String {
    format!("{base}{}", api.url_path)
}

/// URL of one classic API object.
#[must_use]
pub fn classic_object(base: &str, api: &Api, id: &str) -> String {
    format!("{base}{}/{id}", api.url_path)
}

/// Collection URL of settings objects.
#[must_use]
pub fn settings_collection(base: &str) -> String {
    format!("{base}{SETTINGS_OBJECTS}")
}

/// URL of one settings object.
#[must_use]
pub fn settings_object(base: &str, object_id: &str) -> String {
    format!("{base}{SETTINGS_OBJECTS}/{object_id}")
}

/// Settings filter selecting the object carrying `external_id`.
#[must_use]
pub fn external_id_filter(external_id: &str) -> String {
    format!("externalId = '{external_id}'")
}

/// Collection URL of an automation resource.
#[must_use]
pub fn automation_collection(base: &str, resource: AutomationResource) -> String {
    format!("{base}{AUTOMATION}/{}", resource.collection())
}

/// URL of one automation resource.
#[must_use]
pub fn automation_object(base: &str, resource: AutomationResource, id: &str) -> String {
    format!("{base}{AUTOMATION}/{}/{id}", resource.collection())
}

/// Collection URL of bucket definitions.
#[must_use]
pub fn bucket_collection(base: &str) -> String {
    format!("{base}{BUCKETS}")
}

/// URL of one bucket definition.
#[must_use]
pub fn bucket_object(base: &str, bucket_name: &str) -> String {
    format!("{base}{BUCKETS}/{bucket_name}")
}

/// Collection URL of filter segments.
#[must_use]
pub fn segment_collection(base: &str) -> String {
    format!("{base}{SEGMENTS}")
}

/// URL of one filter segment.
#[must_use]
pub fn segment_object(base: &str, uid: &str) -> String {
    format!("{base}{SEGMENTS}/{uid}")
}
