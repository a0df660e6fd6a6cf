//! `stratum deploy`: Deploy every project to the selected environments.

use std::path::PathBuf;

use clap::Args;
use stratum_common::config::StratumConfig;
use stratum_common::constants::{DEFAULT_MANIFEST, DEFAULT_REQUEST_TIMEOUT_SECS};
use stratum_config::api::ApiRegistry;
use stratum_deploy::{DeployOptions, deploy_environments};

use crate::output;
use crate::workspace::Workspace;

/// Arguments for the `deploy` command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Path to the manifest file.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Environment to deploy to; repeat for several. All when omitted.
    #[arg(short = 'e', long = "environment")]
    pub environments: Vec<String>,

    /// Resolve and render everything without changing remote state.
    #[arg(long, env = "STRATUM_DRY_RUN")]
    pub dry_run: bool,

    /// Keep deploying after a configuration failed.
    #[arg(long, env = "STRATUM_CONTINUE_ON_ERROR")]
    pub continue_on_error: bool,

    /// Fail references to skipped configurations instead of resolving them to null.
    #[arg(long, env = "STRATUM_STRICT_SKIPPED_REFERENCES")]
    pub strict_skipped_references: bool,

    /// Timeout of a single remote request, in seconds.
    #[arg(long, env = "STRATUM_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl DeployArgs {
    fn config(&self) -> StratumConfig {
        StratumConfig {
            manifest: self.manifest.clone(),
            dry_run: self.dry_run,
            continue_on_error: self.continue_on_error,
            strict_skipped_references: self.strict_skipped_references,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// Executes the `deploy` command.
///
/// Loads and validates the projects, orders each environment's
/// configurations and deploys the environments in parallel.
///
/// # Errors
///
/// Returns an error if loading, sorting or any deployment fails.
pub fn execute(args: DeployArgs) -> anyhow::Result<()> {
    let config = args.config();
    let apis = ApiRegistry::builtin();
    let workspace = Workspace::load(&config.manifest, &args.environments, &apis)?;
    let sorted = workspace.sorted()?;
    let clients = workspace.clients(&config)?;

    let results = deploy_environments(&clients, &apis, &sorted, DeployOptions::from(&config));

    let mut failed = 0;
    for (environment, errors) in &results {
        let deployed = sorted.get(environment).map_or(0, Vec::len);
        if errors.is_empty() {
            println!(
                "  \u{2713} {environment}: {} {}",
                output::count(deployed, "config"),
                if config.dry_run { "validated" } else { "deployed" }
            );
        } else {
            println!(
                "  \u{2717} {environment}: {}",
                output::count(errors.len(), "error")
            );
            output::print_errors(errors);
            failed += errors.len();
        }
    }

    if failed > 0 {
        anyhow::bail!("deployment finished with {}", output::count(failed, "error"));
    }
    Ok(())
}
