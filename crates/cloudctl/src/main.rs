use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cloudctl_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands, ComputeCommands};
use connection::{ConnectionArgs, ConnectionManager};
use error::CloudCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Notices and diagnostics go to stderr; only color them for a terminal
    if !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli).await {
        e.print_diagnostic();
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "cloudctl=warn,cloudctl_core=warn",
            1 => "cloudctl=info,cloudctl_core=info",
            2 => "cloudctl=debug,cloudctl_core=debug",
            _ => "cloudctl=trace,cloudctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Load configuration from the specified path or the default location
fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), CloudCtlError> {
    match config_file {
        Some(config_file) => {
            let path = PathBuf::from(config_file);
            debug!("Loading config from explicit path: {:?}", path);
            let config = Config::load_from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            debug!("Loading config from default location");
            Ok((Config::load()?, None))
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CloudCtlError> {
    let (config, config_path) = load_config(cli.config_file.as_deref())?;
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);
    execute_command(cli, &conn_mgr).await
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), CloudCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let conn_args = ConnectionArgs::from(cli);
    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Compute(ComputeCommands::LoadBalancer(lb_cmd)) => {
            commands::load_balancer::handle_load_balancer_command(
                conn_mgr, &conn_args, lb_cmd, cli.output,
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Format command for human-readable logging
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Compute(ComputeCommands::LoadBalancer(cli::LoadBalancerCommands::Create(args))) => {
            format!(
                "compute load-balancer create --name {} --region {}{}",
                args.name,
                args.region,
                if args.wait.wait { " --wait" } else { "" }
            )
        }
    }
}
