//! Loading and ordering shared by every command.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stratum_client::clients::ClientSet;
use stratum_client::rest::RestClient;
use stratum_common::config::StratumConfig;
use stratum_common::types::Environment;
use stratum_config::api::ApiRegistry;
use stratum_config::configuration::{Configuration, Project};
use stratum_config::loader;
use stratum_graph::sort::get_sorted_configs_for_environments;

use crate::output;

/// The projects of a manifest, loaded for the selected environments.
#[derive(Debug)]
pub struct Workspace {
    /// Environments selected on the command line, all when none were given.
    pub environments: Vec<Environment>,
    /// Loaded and validated projects.
    pub projects: Vec<Project>,
}

impl Workspace {
    /// Loads the manifest at `path` and its projects for `selected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, an environment is
    /// unknown, or any project fails to load or validate. Every load error
    /// is printed before returning.
    pub fn load(path: &Path, selected: &[String], apis: &ApiRegistry) -> anyhow::Result<Self> {
        let manifest = loader::load_manifest(path).map_err(|e| anyhow::anyhow!("{e}"))?;
        let environments = manifest
            .select_environments(selected)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let projects = loader::load_projects(&manifest, &environments, apis)
            .map_err(|errors| output::fail("loading projects", &errors))?;
        Ok(Self {
            environments,
            projects,
        })
    }

    /// Names of the selected environments, in manifest order.
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.name.clone()).collect()
    }

    /// Computes the deploy order of every selected environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment cannot be ordered; every sort
    /// error is printed first.
    pub fn sorted(&self) -> anyhow::Result<BTreeMap<String, Vec<Configuration>>> {
        let (sorted, errors) =
            get_sorted_configs_for_environments(&self.projects, &self.environment_names());
        if errors.is_empty() {
            Ok(sorted)
        } else {
            Err(output::fail("sorting configurations", &errors))
        }
    }

    /// Builds the REST clients of every selected environment.
    ///
    /// Dry runs never reach the platform, so their clients carry no token
    /// and unset token variables are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a token variable is unset or a client cannot be
    /// built; every failing environment is printed first.
    pub fn clients(&self, config: &StratumConfig) -> anyhow::Result<BTreeMap<String, ClientSet>> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let mut clients = BTreeMap::new();
        let mut errors = Vec::new();
        for environment in &self.environments {
            let client = if config.dry_run {
                RestClient::with_token(&environment.url, "", timeout)
            } else {
                RestClient::new(environment, config)
            };
            match client {
                Ok(client) => {
                    let _ = clients.insert(environment.name.clone(), ClientSet::uniform(Arc::new(client)));
                }
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(clients)
        } else {
            Err(output::fail("creating clients", &errors))
        }
    }
}
