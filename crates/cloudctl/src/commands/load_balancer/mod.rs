//! Load balancer command implementations

pub mod display;

use std::time::Duration;

use cloudctl_core::{
    CancelReason, CreateOutcome, HealthCheck, LoadBalancerSpec, ProgressCallback, ProgressEvent,
    StickySessions, create_load_balancer, parse_forwarding_rules,
};
use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{CreateLoadBalancerArgs, LoadBalancerCommands, OutputFormat};
use crate::commands::async_utils::{cancel_on_ctrl_c, format_status, new_spinner};
use crate::connection::{ConnectionArgs, ConnectionManager};
use crate::error::{CloudCtlError, Result as CliResult};
use crate::output::{print_lines, print_notice, print_output};

const NOTICE_IN_PROGRESS: &str =
    "Load balancer creation is in progress, waiting for load balancer to become active";
const NOTICE_CREATED: &str = "Load balancer created";
const NOTICE_STOPPED: &str = "Stopped waiting; the load balancer is still being created";

pub async fn handle_load_balancer_command(
    conn_mgr: &ConnectionManager,
    conn_args: &ConnectionArgs,
    command: &LoadBalancerCommands,
    output: OutputFormat,
) -> CliResult<()> {
    match command {
        LoadBalancerCommands::Create(args) => create(conn_mgr, conn_args, args, output).await,
    }
}

/// Build the creation request from command-line arguments
pub fn build_spec(args: &CreateLoadBalancerArgs) -> CliResult<LoadBalancerSpec> {
    let mut spec = LoadBalancerSpec::new(&args.name, &args.region)
        .with_algorithm(&args.algorithm)
        .with_droplet_ids(args.droplet_ids.iter().copied())
        .with_redirect_http_to_https(args.redirect_http_to_https)
        .with_proxy_protocol(args.enable_proxy_protocol)
        .with_backend_keepalive(args.enable_backend_keepalive)
        .with_lets_encrypt_dns_records_disabled(args.disable_lets_encrypt_dns_records);

    if let Some(size) = &args.size {
        spec = spec.with_size(size);
    }
    if let Some(size_unit) = args.size_unit {
        spec = spec.with_size_unit(size_unit);
    }
    if let Some(tag) = &args.tag_name {
        spec = spec.with_tag(tag);
    }
    if let Some(vpc_uuid) = &args.vpc_uuid {
        spec = spec.with_vpc_uuid(vpc_uuid);
    }
    if let Some(project_id) = &args.project_id {
        spec = spec.with_project_id(project_id);
    }
    if let Some(seconds) = args.http_idle_timeout_seconds {
        spec = spec.with_http_idle_timeout_seconds(seconds);
    }
    if let Some(rules) = &args.forwarding_rules {
        spec = spec.with_forwarding_rules(parse_forwarding_rules(rules)?);
    }
    if let Some(check) = &args.health_check {
        spec = spec.with_health_check(check.parse::<HealthCheck>()?);
    }
    if let Some(policy) = &args.sticky_sessions {
        spec = spec.with_sticky_sessions(policy.parse::<StickySessions>()?);
    }

    Ok(spec)
}

async fn create(
    conn_mgr: &ConnectionManager,
    conn_args: &ConnectionArgs,
    args: &CreateLoadBalancerArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let spec = build_spec(args)?;
    let connection = conn_mgr.connect(conn_args)?;

    let cancel = CancellationToken::new();
    let options = args.wait.wait_options(&connection.wait, cancel.clone());
    let ctrl_c = args.wait.wait.then(|| cancel_on_ctrl_c(cancel));

    let spinner = if args.wait.wait {
        new_spinner()
    } else {
        ProgressBar::hidden()
    };

    info!("Creating load balancer '{}' in {}", spec.name, spec.region);
    let result = create_load_balancer(
        &connection.client,
        &spec,
        args.wait.wait,
        &options,
        Some(progress_reporter(spinner.clone())),
    )
    .await;

    if let Some(handle) = ctrl_c {
        handle.abort();
    }
    if !spinner.is_finished() {
        spinner.finish_and_clear();
    }

    let lb = match result? {
        CreateOutcome::Created(lb) => lb,
        CreateOutcome::Cancelled {
            reason: CancelReason::Requested,
            ..
        } => return Err(CloudCtlError::Interrupted),
        CreateOutcome::Cancelled {
            reason: CancelReason::DeadlineExceeded(timeout),
            last_known,
        } => {
            return Err(CloudCtlError::Timeout {
                message: format!(
                    "load balancer {} was still {} after {}s",
                    last_known.id,
                    last_known.status,
                    timeout.as_secs()
                ),
            });
        }
    };

    match output {
        OutputFormat::Table => print_lines(&display::render(&[lb], &args.display)?),
        format => print_output(vec![lb], format),
    }
}

/// Turn workflow events into notices and spinner updates
fn progress_reporter(spinner: ProgressBar) -> ProgressCallback {
    Box::new(move |event| match event {
        ProgressEvent::Submitted { id, status } => {
            debug!("Load balancer {} submitted with status {}", id, status);
        }
        ProgressEvent::Waiting { .. } => {
            spinner.suspend(|| print_notice(NOTICE_IN_PROGRESS));
            spinner.set_message("Waiting for load balancer to become active");
            spinner.enable_steady_tick(Duration::from_millis(100));
        }
        ProgressEvent::Polling {
            status, attempt, ..
        } => {
            spinner.set_message(format!("Status: {} (check {})", format_status(&status), attempt));
        }
        ProgressEvent::Created { .. } => {
            spinner.finish_and_clear();
            print_notice(NOTICE_CREATED);
        }
        ProgressEvent::Errored { .. } => spinner.finish_and_clear(),
        ProgressEvent::Cancelled { reason, .. } => {
            spinner.finish_and_clear();
            if reason == CancelReason::Requested {
                print_notice(NOTICE_STOPPED);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, ComputeCommands};
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn parse_create(extra: &[&str]) -> CreateLoadBalancerArgs {
        let mut argv = vec![
            "cloudctl",
            "compute",
            "load-balancer",
            "create",
            "--name",
            "my-lb-name",
            "--region",
            "venus",
        ];
        argv.extend_from_slice(extra);

        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Compute(ComputeCommands::LoadBalancer(LoadBalancerCommands::Create(args))) => {
                args
            }
        }
    }

    #[test]
    fn test_build_spec_from_reference_flags() {
        let args = parse_create(&[
            "--droplet-ids",
            "22,66",
            "--size",
            "lb-small",
            "--redirect-http-to-https",
            "--enable-proxy-protocol",
            "--enable-backend-keepalive",
            "--tag-name",
            "magic-lb",
            "--vpc-uuid",
            "00000000-0000-4000-8000-000000000000",
            "--disable-lets-encrypt-dns-records",
        ]);

        let expected = LoadBalancerSpec::new("my-lb-name", "venus")
            .with_size("lb-small")
            .with_droplet_ids([22, 66])
            .with_tag("magic-lb")
            .with_redirect_http_to_https(true)
            .with_proxy_protocol(true)
            .with_backend_keepalive(true)
            .with_lets_encrypt_dns_records_disabled(true)
            .with_vpc_uuid("00000000-0000-4000-8000-000000000000");

        assert_eq!(build_spec(&args).unwrap(), expected);
    }

    #[test]
    fn test_build_spec_parses_policies() {
        let args = parse_create(&[
            "--forwarding-rules",
            "entry_protocol:https,entry_port:443,target_protocol:http,target_port:80,certificate_id:abc",
            "--health-check",
            "protocol:http,port:80,path:/healthz",
            "--sticky-sessions",
            "type:cookies,cookie_name:lb,cookie_ttl_seconds:300",
            "--algorithm",
            "least_connections",
        ]);

        let spec = build_spec(&args).unwrap();
        assert_eq!(spec.algorithm, "least_connections");
        assert_eq!(spec.forwarding_rules.len(), 1);
        assert_eq!(spec.forwarding_rules[0].certificate_id, "abc");
        assert_eq!(spec.health_check.path.as_deref(), Some("/healthz"));
        assert_eq!(spec.sticky_sessions.cookie_ttl_seconds, Some(300));
    }

    #[test]
    fn test_bad_policy_is_invalid_input() {
        let args = parse_create(&["--health-check", "protocol:http,port:eighty"]);

        let err = build_spec(&args).unwrap_err();
        assert!(matches!(err, CloudCtlError::InvalidInput { .. }));
    }

    #[test]
    fn test_wait_flags_require_wait() {
        let result = Cli::try_parse_from([
            "cloudctl",
            "compute",
            "lb",
            "c",
            "--name",
            "lb",
            "--region",
            "nyc3",
            "--wait-timeout",
            "60",
        ]);
        assert!(result.is_err());
    }
}
