//! `stratum delete`: Remove the objects listed in a delete file.

use std::path::PathBuf;

use clap::Args;
use stratum_common::config::StratumConfig;
use stratum_common::constants::{DEFAULT_MANIFEST, DEFAULT_REQUEST_TIMEOUT_SECS};
use stratum_config::api::ApiRegistry;
use stratum_config::loader;
use stratum_deploy::delete::{delete_configs, load_delete_file};

use crate::output;
use crate::workspace::Workspace;

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Delete file listing the objects to remove.
    pub delete_file: PathBuf,

    /// Path to the manifest file.
    #[arg(short = 'm', long, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Environment to delete from; repeat for several. All when omitted.
    #[arg(short = 'e', long = "environment")]
    pub environments: Vec<String>,

    /// Timeout of a single remote request, in seconds.
    #[arg(long, env = "STRATUM_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

/// Executes the `delete` command.
///
/// Only the manifest's environments are needed; its projects are not
/// loaded.
///
/// # Errors
///
/// Returns an error if the manifest or delete file cannot be read, or any
/// deletion fails.
pub fn execute(args: DeleteArgs) -> anyhow::Result<()> {
    let manifest = loader::load_manifest(&args.manifest).map_err(|e| anyhow::anyhow!("{e}"))?;
    let environments = manifest
        .select_environments(&args.environments)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let pointers = load_delete_file(&args.delete_file).map_err(|e| anyhow::anyhow!("{e}"))?;
    let workspace = Workspace {
        environments,
        projects: Vec::new(),
    };
    let config = StratumConfig {
        manifest: args.manifest.clone(),
        request_timeout_secs: args.request_timeout_secs,
        ..StratumConfig::default()
    };
    let clients = workspace.clients(&config)?;
    let apis = ApiRegistry::builtin();

    let mut failed = 0;
    for (environment, set) in &clients {
        let errors = delete_configs(set, &apis, environment, &pointers);
        if errors.is_empty() {
            println!(
                "  \u{2713} {environment}: {} processed",
                output::count(pointers.len(), "object")
            );
        } else {
            println!("  \u{2717} {environment}: {}", output::count(errors.len(), "error"));
            output::print_errors(&errors);
            failed += errors.len();
        }
    }

    if failed > 0 {
        anyhow::bail!("deletion finished with {}", output::count(failed, "error"));
    }
    Ok(())
}
