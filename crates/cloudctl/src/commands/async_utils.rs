//! Shared utilities for commands that support the --wait flag
//!
//! Wraps the core poll loop settings with CLI flags, a spinner and Ctrl-C
//! handling.

use std::time::Duration;

use clap::Args;
use cloudctl_core::{LoadBalancerStatus, WaitConfig, WaitOptions};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Common CLI arguments for operations that can wait for completion
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Wait for the resource to become active before returning
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds (0 waits forever)
    #[arg(long, requires = "wait", value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Seconds between status checks
    #[arg(
        long,
        requires = "wait",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: Option<u64>,
}

impl WaitArgs {
    /// Combine flags with the context's defaults; flags win
    pub fn wait_options(&self, defaults: &WaitConfig, cancel: CancellationToken) -> WaitOptions {
        let interval = self.poll_interval.unwrap_or(defaults.poll_interval_secs).max(1);
        let timeout = self
            .wait_timeout
            .or(defaults.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        WaitOptions::default()
            .with_interval(Duration::from_secs(interval))
            .with_timeout(timeout)
            .with_cancellation(cancel)
    }
}

/// Cancel `token` when the user presses Ctrl-C
///
/// Abort the returned handle once waiting is over.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Received Ctrl-C, cancelling wait");
            token.cancel();
        }
    })
}

/// Spinner shown on stderr while polling; hidden when stderr isn't a terminal
pub fn new_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb
}

/// Format a status for the spinner with a status icon
pub fn format_status(status: &LoadBalancerStatus) -> String {
    match status {
        LoadBalancerStatus::Active => format!("\u{2713} {}", status), // checkmark
        LoadBalancerStatus::Errored => format!("\u{2717} {}", status), // x mark
        LoadBalancerStatus::New => format!("\u{21bb} {}", status),    // arrow circle
        LoadBalancerStatus::Unknown(_) => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_context_defaults() {
        let args = WaitArgs {
            wait: true,
            wait_timeout: Some(60),
            poll_interval: Some(2),
        };
        let defaults = WaitConfig {
            poll_interval_secs: 10,
            timeout_secs: Some(600),
        };

        let options = args.wait_options(&defaults, CancellationToken::new());
        assert_eq!(options.interval, Duration::from_secs(2));
        assert_eq!(options.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_context_defaults_apply_without_flags() {
        let args = WaitArgs {
            wait: true,
            ..Default::default()
        };
        let defaults = WaitConfig {
            poll_interval_secs: 10,
            timeout_secs: Some(600),
        };

        let options = args.wait_options(&defaults, CancellationToken::new());
        assert_eq!(options.interval, Duration::from_secs(10));
        assert_eq!(options.timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let args = WaitArgs {
            wait: true,
            wait_timeout: Some(0),
            poll_interval: None,
        };

        let options = args.wait_options(&WaitConfig::default(), CancellationToken::new());
        assert_eq!(options.interval, Duration::from_secs(5));
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_token_is_shared() {
        let token = CancellationToken::new();
        let options = WaitArgs::default().wait_options(&WaitConfig::default(), token.clone());

        token.cancel();
        assert!(options.cancel.is_cancelled());
    }

    #[test]
    fn test_format_status() {
        assert!(format_status(&LoadBalancerStatus::Active).contains("active"));
        assert!(format_status(&LoadBalancerStatus::New).contains("new"));
        assert_eq!(
            format_status(&LoadBalancerStatus::Unknown("resizing".to_string())),
            "resizing"
        );
    }
}
