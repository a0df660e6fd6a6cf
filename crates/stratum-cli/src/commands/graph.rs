//! `stratum graph`: Write each environment's reference graph as DOT.

use std::path::PathBuf;

use clap::Args;
use stratum_common::constants::DEFAULT_MANIFEST;
use stratum_config::api::ApiRegistry;
use stratum_graph::dot::render_dot;

use crate::workspace::Workspace;

/// Arguments for the `graph` command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Path to the manifest file.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Environment to export; repeat for several. All when omitted.
    #[arg(short = 'e', long = "environment")]
    pub environments: Vec<String>,

    /// Directory the `<environment>.dot` files are written to.
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,
}

/// Executes the `graph` command.
///
/// The graph is exported even when it contains cycles, which makes the
/// files useful for tracking down a circular dependency.
///
/// # Errors
///
/// Returns an error if loading fails or a file cannot be written.
pub fn execute(args: GraphArgs) -> anyhow::Result<()> {
    let apis = ApiRegistry::builtin();
    let workspace = Workspace::load(&args.manifest, &args.environments, &apis)?;
    std::fs::create_dir_all(&args.output)?;

    for environment in workspace.environment_names() {
        let configs: Vec<_> = workspace
            .projects
            .iter()
            .flat_map(|p| p.configs_for(&environment).iter().cloned())
            .collect();
        let path = args.output.join(format!("{environment}.dot"));
        std::fs::write(&path, render_dot(&configs))?;
        tracing::info!(environment = %environment, path = %path.display(), "graph written");
        println!("  \u{2713} {}", path.display());
    }
    Ok(())
}
