//! CLI command definitions and dispatch.

pub mod delete;
pub mod deploy;
pub mod graph;
pub mod plan;

use clap::{Parser, Subcommand, ValueEnum};

/// Stratum: deploy configuration-as-code projects in dependency order.
#[derive(Parser, Debug)]
#[command(name = "stratum", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Format of the log lines written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy every project of the manifest to the selected environments.
    Deploy(deploy::DeployArgs),
    /// Print the deploy order per environment without touching any platform.
    Plan(plan::PlanArgs),
    /// Write the reference graph of each environment as a DOT file.
    Graph(graph::GraphArgs),
    /// Delete the objects listed in a delete file.
    Delete(delete::DeleteArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Deploy(args) => deploy::execute(args),
        Command::Plan(args) => plan::execute(args),
        Command::Graph(args) => graph::execute(args),
        Command::Delete(args) => delete::execute(args),
    }
}
