//! `stratum plan`: Display the deploy order without deploying.

use std::path::PathBuf;

use clap::Args;
use stratum_common::constants::DEFAULT_MANIFEST;
use stratum_config::api::ApiRegistry;

use crate::output;
use crate::workspace::Workspace;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the manifest file.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Environment to plan; repeat for several. All when omitted.
    #[arg(short = 'e', long = "environment")]
    pub environments: Vec<String>,
}

/// Executes the `plan` command.
///
/// Loads and validates the projects, orders each environment and prints
/// the configurations in the order a deploy would process them.
///
/// # Errors
///
/// Returns an error if loading, validation or ordering fails.
pub fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let apis = ApiRegistry::builtin();
    let workspace = Workspace::load(&args.manifest, &args.environments, &apis)?;
    let sorted = workspace.sorted()?;

    for (environment, configs) in &sorted {
        let title = format!("Deploy order for: {environment}");
        println!("{title}");
        println!("{}", output::rule(&title));
        for (position, config) in configs.iter().enumerate() {
            let marker = if config.skip { "skip" } else { "+" };
            println!("  {:>4}. {marker} {}", position + 1, config.coordinate);
        }
        println!();
        let skipped = configs.iter().filter(|c| c.skip).count();
        println!(
            "  {} to deploy, {} skipped.",
            output::count(configs.len() - skipped, "config"),
            skipped
        );
        println!();
    }
    Ok(())
}
