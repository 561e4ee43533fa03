//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

pub use crate::commands::datalake::DatalakeCommands;
pub use crate::commands::vm::VmCommands;

/// armctl - manage cloud resources through the resource-management API
#[derive(Parser, Debug)]
#[command(name = "armctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a runtime config file (replaces ~/.armctl/armctl-runtime.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Capture HTTP traffic for this command and print it afterwards
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Bearer token for the management API
    #[arg(long, global = true, env = "ARMCTL_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Subscription to operate on (overrides configuration)
    #[arg(long, global = true)]
    pub subscription: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Virtual machine management
    #[command(subcommand)]
    Vm(VmCommands),

    /// Data Lake Analytics management
    #[command(subcommand)]
    Datalake(DatalakeCommands),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value output
    Table,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "armctl",
            "vm",
            "sql-extension",
            "set",
            "--resource-group",
            "rg",
            "--vm-name",
            "vm1",
            "--debug",
            "--output",
            "json",
            "-vv",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }
}
