//! Blocking HTTP implementation of every client trait.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use stratum_common::config::StratumConfig;
use stratum_common::error::{Result, StratumError};
use stratum_common::types::Environment;
use stratum_config::api::Api;
use stratum_config::configuration::AutomationResource;

use crate::clients::{
    AutomationClient, BucketClient, ClassicClient, RemoteObject, SegmentClient, SettingsClient,
    SettingsObject,
};
use crate::endpoints;

/// Client for one environment of the platform.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    token: String,
    http: Client,
}

impl RestClient {
    /// Creates a client for `environment`, reading its API token from the
    /// environment variable the manifest names.
    ///
    /// # Errors
    ///
    /// Returns an error if the token variable is unset or the HTTP client
    /// cannot be built.
    pub fn new(environment: &Environment, config: &StratumConfig) -> Result<Self> {
        let token = std::env::var(&environment.token_env).map_err(|_| StratumError::Config {
            message: format!(
                "environment variable {} holding the token of environment `{}` is not set",
                environment.token_env, environment.name
            ),
        })?;
        Self::with_token(
            &environment.url,
            token,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Creates a client with an explicit token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_token(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StratumError::Http {
                status: 0,
                url: base_url.to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    /// Base URL of the environment.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Api-Token {}", self.token))
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Value> {
        let response = request.send().map_err(|e| StratumError::Http {
            status: 0,
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| StratumError::Http {
            status,
            url: url.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;
        tracing::debug!(status, url, "response received");
        if let Some(err) = status_error(status, url, &body) {
            return Err(err);
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(self.request(Method::GET, url).query(query), url)
    }

    fn put(&self, url: &str, body: &Value) -> Result<Value> {
        self.send(self.request(Method::PUT, url).json(body), url)
    }

    fn post(&self, url: &str, body: &Value) -> Result<Value> {
        self.send(self.request(Method::POST, url).json(body), url)
    }

    fn delete_url(&self, url: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, url), url).map(drop)
    }

    fn find_classic(&self, api: &Api, name: &str) -> Result<Option<String>> {
        let list = self.get(&endpoints::classic_collection(&self.base_url, api), &[])?;
        Ok(find_in_list(&list, "values", "name", name, "id"))
    }

    fn find_settings(&self, schema_id: &str, external_id: &str) -> Result<Option<String>> {
        let filter = endpoints::external_id_filter(external_id);
        let list = self.get(
            &endpoints::settings_collection(&self.base_url),
            &[
                ("schemaIds", schema_id),
                ("filter", filter.as_str()),
                ("fields", "objectId,externalId"),
            ],
        )?;
        Ok(find_in_list(&list, "items", "externalId", external_id, "objectId"))
    }

    fn find_segment(&self, external_id: &str) -> Result<Option<String>> {
        let list = self.get(
            &endpoints::segment_collection(&self.base_url),
            &[("add-fields", "EXTERNALID")],
        )?;
        Ok(find_in_list(&list, "filterSegments", "externalId", external_id, "uid"))
    }
}

/// Maps a non-success HTTP status to an error.
///
/// 401 and 403 become `PermissionDenied`, 404 `NotFound`, every other
/// status outside 2xx `Http`.
#[must_use]
pub fn status_error(status: u16, url: &str, body: &str) -> Option<StratumError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(StratumError::PermissionDenied {
            message: format!("HTTP {status} from {url}: {body}"),
        }),
        404 => Some(StratumError::NotFound {
            kind: "remote object",
            id: url.to_string(),
        }),
        _ => Some(StratumError::Http {
            status,
            url: url.to_string(),
            message: body.to_string(),
        }),
    }
}

/// Finds `wanted` in `list[collection][*][key]` and returns the entry's
/// `id_field`.
fn find_in_list(list: &Value, collection: &str, key: &str, wanted: &str, id_field: &str) -> Option<String> {
    list.get(collection)?
        .as_array()?
        .iter()
        .find(|item| item.get(key).and_then(Value::as_str) == Some(wanted))
        .and_then(|item| item.get(id_field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

impl ClassicClient for RestClient {
    fn upsert_by_name(&self, api: &Api, name: &str, payload: &Value) -> Result<RemoteObject> {
        if api.single_configuration {
            let url = endpoints::classic_collection(&self.base_url, api);
            let _ = self.put(&url, payload)?;
            return Ok(RemoteObject {
                id: api.id.clone(),
                name: name.to_string(),
            });
        }

        if let Some(id) = self.find_classic(api, name)? {
            tracing::debug!(api = %api.id, name, id = %id, "updating existing object");
            let _ = self.put(&endpoints::classic_object(&self.base_url, api, &id), payload)?;
            return Ok(RemoteObject {
                id,
                name: name.to_string(),
            });
        }

        let url = endpoints::classic_collection(&self.base_url, api);
        let created = self.post(&url, payload)?;
        let id = str_field(&created, "id").ok_or_else(|| StratumError::Http {
            status: 200,
            url,
            message: "create response carries no id".into(),
        })?;
        Ok(RemoteObject {
            id,
            name: str_field(&created, "name").unwrap_or_else(|| name.to_string()),
        })
    }

    fn delete_by_name(&self, api: &Api, name: &str) -> Result<()> {
        if api.single_configuration {
            tracing::warn!(api = %api.id, "single-configuration objects cannot be deleted");
            return Ok(());
        }
        let id = self
            .find_classic(api, name)?
            .ok_or_else(|| StratumError::NotFound {
                kind: "classic object",
                id: format!("{}/{name}", api.id),
            })?;
        self.delete_url(&endpoints::classic_object(&self.base_url, api, &id))
    }
}

impl SettingsClient for RestClient {
    fn upsert(&self, object: &SettingsObject<'_>) -> Result<RemoteObject> {
        let existing = self
            .find_settings(object.schema_id, object.external_id)?
            .or_else(|| object.origin_object_id.map(str::to_string));

        if let Some(object_id) = existing {
            let mut body = json!({ "value": object.value, "externalId": object.external_id });
            if let Some(version) = object.schema_version {
                body["schemaVersion"] = json!(version);
            }
            let _ = self.put(&endpoints::settings_object(&self.base_url, &object_id), &body)?;
            return Ok(RemoteObject {
                id: object_id,
                name: object.external_id.to_string(),
            });
        }

        let mut item = json!({
            "schemaId": object.schema_id,
            "scope": object.scope,
            "externalId": object.external_id,
            "value": object.value,
        });
        if let Some(version) = object.schema_version {
            item["schemaVersion"] = json!(version);
        }
        let url = endpoints::settings_collection(&self.base_url);
        let created = self.post(&url, &json!([item]))?;
        let id = created
            .get(0)
            .and_then(|c| str_field(c, "objectId"))
            .ok_or_else(|| StratumError::Http {
                status: 200,
                url,
                message: "create response carries no objectId".into(),
            })?;
        Ok(RemoteObject {
            id,
            name: object.external_id.to_string(),
        })
    }

    fn delete_by_external_id(&self, schema_id: &str, external_id: &str) -> Result<()> {
        let object_id = self
            .find_settings(schema_id, external_id)?
            .ok_or_else(|| StratumError::NotFound {
                kind: "settings object",
                id: external_id.to_string(),
            })?;
        self.delete_url(&endpoints::settings_object(&self.base_url, &object_id))
    }
}

impl AutomationClient for RestClient {
    fn upsert(&self, resource: AutomationResource, id: &str, payload: &Value) -> Result<RemoteObject> {
        let mut body = payload.clone();
        if let Some(map) = body.as_object_mut() {
            let _ = map.insert("id".into(), json!(id));
        }
        let name = str_field(payload, "title").unwrap_or_else(|| id.to_string());

        match self.put(&endpoints::automation_object(&self.base_url, resource, id), &body) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%resource, id, "creating automation resource");
                let _ = self.post(&endpoints::automation_collection(&self.base_url, resource), &body)?;
            }
            Err(e) => return Err(e),
        }
        Ok(RemoteObject {
            id: id.to_string(),
            name,
        })
    }

    fn delete(&self, resource: AutomationResource, id: &str) -> Result<()> {
        self.delete_url(&endpoints::automation_object(&self.base_url, resource, id))
    }
}

impl BucketClient for RestClient {
    fn upsert(&self, bucket_name: &str, payload: &Value) -> Result<RemoteObject> {
        let mut body = payload.clone();
        if let Some(map) = body.as_object_mut() {
            let _ = map.insert("bucketName".into(), json!(bucket_name));
        }
        match self.put(&endpoints::bucket_object(&self.base_url, bucket_name), &body) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                let _ = self.post(&endpoints::bucket_collection(&self.base_url), &body)?;
            }
            Err(e) => return Err(e),
        }
        Ok(RemoteObject {
            id: bucket_name.to_string(),
            name: bucket_name.to_string(),
        })
    }

    fn delete(&self, bucket_name: &str) -> Result<()> {
        self.delete_url(&endpoints::bucket_object(&self.base_url, bucket_name))
    }
}

impl SegmentClient for RestClient {
    fn upsert(
        &self,
        external_id: &str,
        origin_object_id: Option<&str>,
        payload: &Value,
    ) -> Result<RemoteObject> {
        let mut body = payload.clone();
        if let Some(map) = body.as_object_mut() {
            let _ = map.insert("externalId".into(), json!(external_id));
        }
        let name = str_field(payload, "name").unwrap_or_else(|| external_id.to_string());

        let existing = self
            .find_segment(external_id)?
            .or_else(|| origin_object_id.map(str::to_string));
        if let Some(uid) = existing {
            let _ = self.put(&endpoints::segment_object(&self.base_url, &uid), &body)?;
            return Ok(RemoteObject { id: uid, name });
        }

        let url = endpoints::segment_collection(&self.base_url);
        let created = self.post(&url, &body)?;
        let uid = str_field(&created, "uid").ok_or_else(|| StratumError::Http {
            status: 200,
            url,
            message: "create response carries no uid".into(),
        })?;
        Ok(RemoteObject { id: uid, name })
    }

    fn delete_by_external_id(&self, external_id: &str) -> Result<()> {
        let uid = self
            .find_segment(external_id)?
            .ok_or_else(|| StratumError::NotFound {
                kind: "segment",
                id: external_id.to_string(),
            })?;
        self.delete_url(&endpoints::segment_object(&self.base_url, &uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_are_not_errors() {
        assert!(status_error(200, "u", "").is_none());
        assert!(status_error(204, "u", "").is_none());
    }

    #[test]
    fn auth_failures_map_to_permission_denied() {
        for status in [401, 403] {
            let err = status_error(status, "https://x/api", "nope").expect("error");
            assert!(matches!(err, StratumError::PermissionDenied { .. }), "{err}");
        }
    }

    #[test]
    fn missing_object_maps_to_not_found() {
        let err = status_error(404, "https://x/api/1", "").expect("error");
        assert!(err.is_not_found());
    }

    #[test]
    fn other_failures_keep_status_and_body() {
        let err = status_error(500, "https://x/api", "boom").expect("error");
        assert!(matches!(
            err,
            StratumError::Http { status: 500, ref message, .. } if message == "boom"
        ));
    }

    #[test]
    fn find_in_list_matches_by_key() {
        let list = json!({
            "values": [
                { "id": "1", "name": "a" },
                { "id": "2", "name": "b" }
            ]
        });
        assert_eq!(find_in_list(&list, "values", "name", "b", "id"), Some("2".into()));
        assert_eq!(find_in_list(&list, "values", "name", "c", "id"), None);
        assert_eq!(find_in_list(&json!({}), "values", "name", "a", "id"), None);
    }

    #[test]
    fn base_url_is_normalised() {
        let client =
            RestClient::with_token("https://env.example.com/", "t", Duration::from_secs(5))
                .expect("client");
        assert_eq!(client.base_url(), "https://env.example.com");
    }

    #[test]
    fn missing_token_variable_is_a_config_error() {
        let env = Environment {
            name: "dev".into(),
            group: "default".into(),
            url: "https://env.example.com".into(),
            token_env: "STRATUM_TEST_SURELY_UNSET_TOKEN".into(),
        };
        let err = RestClient::new(&env, &StratumConfig::default()).unwrap_err();
        assert!(err.to_string().contains("STRATUM_TEST_SURELY_UNSET_TOKEN"));
    }
}
