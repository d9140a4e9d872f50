//! CLI structure and command definitions
//!
//! Commands are grouped by resource area the same way the API is:
//! `cloudctl compute load-balancer create ...`

use clap::{Parser, Subcommand};

pub mod compute;

pub use compute::*;

/// Command-line client for cloud load balancers
#[derive(Parser, Debug)]
#[command(name = "cloudctl")]
#[command(version, about = "Command-line client for cloud load balancers")]
#[command(long_about = "
Command-line client for cloud load balancers

Credentials come from --access-token, the CLOUDCTL_ACCESS_TOKEN environment
variable, or a context in the config file (in that order).

EXAMPLES:
    # Create a load balancer in front of two droplets
    cloudctl compute load-balancer create --name web-lb --region nyc3 --droplet-ids 3164444,3164445

    # Create and wait until it is active
    cloudctl compute lb c --name web-lb --region nyc3 --tag-name web --wait

    # Get JSON output for scripting
    cloudctl compute lb create --name web-lb --region nyc3 -o json

For more help on a specific command, run:
    cloudctl <command> --help
")]
pub struct Cli {
    /// API access token
    #[arg(
        long,
        short = 't',
        global = true,
        env = "CLOUDCTL_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub access_token: Option<String>,

    /// Override the base URL of the API
    #[arg(long, short = 'u', global = true, env = "CLOUDCTL_API_URL")]
    pub api_url: Option<String>,

    /// Config file context to use
    #[arg(long, short = 'c', global = true, env = "CLOUDCTL_CONTEXT")]
    pub context: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "CLOUDCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Maximum number of retries for requests that fail at the transport level
    #[arg(long, global = true, value_name = "N")]
    pub http_retry_max: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    Table,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute resources
    #[command(subcommand)]
    Compute(ComputeCommands),
}
