//! Progress tracking and status polling for load balancer creation
//!
//! A freshly created load balancer starts out `new` and has to be polled
//! until it reaches `active` or `errored`. This module provides that loop
//! with optional progress callbacks for UI updates, a cancellation token and
//! an optional deadline.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::LoadBalancerApi;
use crate::error::{CoreError, Result};
use crate::load_balancer::{LoadBalancer, LoadBalancerStatus};

/// Interval between status polls when nothing else is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Progress events emitted during create and wait
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The creation request was accepted
    Submitted {
        id: String,
        status: LoadBalancerStatus,
    },
    /// About to start polling for a terminal status
    Waiting { id: String },
    /// One poll finished
    Polling {
        id: String,
        status: LoadBalancerStatus,
        attempt: u32,
        elapsed: Duration,
    },
    /// Creation finished successfully
    Created { id: String },
    /// The load balancer reported `errored`
    Errored { id: String },
    /// Waiting stopped before a terminal status was seen
    Cancelled { id: String, reason: CancelReason },
}

/// Callback type for progress updates
///
/// The CLI uses this for notices and its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Why waiting stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancellation token fired
    Requested,
    /// The configured timeout elapsed
    DeadlineExceeded(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => f.write_str("cancelled"),
            CancelReason::DeadlineExceeded(timeout) => {
                write!(f, "timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// How to wait for a terminal status
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl WaitOptions {
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Result of [`poll_load_balancer`] when no error occurred
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The load balancer is `active`
    Active(LoadBalancer),
    /// Polling stopped early; carries the last snapshot seen
    Cancelled {
        reason: CancelReason,
        last_known: LoadBalancer,
    },
}

/// Poll a load balancer until it becomes active
///
/// Each poll replaces the snapshot wholesale. `new` and unknown statuses
/// keep the loop going; `errored` ends it with
/// [`CoreError::CreationErrored`]. Cancellation and the deadline are checked
/// both while a request is in flight and while sleeping.
///
/// # Example
///
/// ```rust,ignore
/// use cloudctl_core::{poll_load_balancer, ProgressEvent, WaitOptions};
/// use std::time::Duration;
///
/// let created = client.create_load_balancer(&spec).await?;
/// let options = WaitOptions::default().with_timeout(Some(Duration::from_secs(600)));
///
/// let callback: ProgressCallback = Box::new(|event| {
///     if let ProgressEvent::Polling { status, elapsed, .. } = event {
///         println!("Status: {} ({:.0}s)", status, elapsed.as_secs());
///     }
/// });
/// let outcome = poll_load_balancer(&client, created, &options, Some(&callback)).await?;
/// ```
pub async fn poll_load_balancer<A>(
    api: &A,
    initial: LoadBalancer,
    options: &WaitOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<PollOutcome>
where
    A: LoadBalancerApi + ?Sized,
{
    let start = Instant::now();
    let deadline = options.timeout.map(|timeout| (start + timeout, timeout));
    let id = initial.id.clone();
    let mut current = initial;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let fetched = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => {
                return Ok(stop(CancelReason::Requested, current, on_progress));
            }
            timeout = deadline_elapsed(deadline) => {
                return Ok(stop(CancelReason::DeadlineExceeded(timeout), current, on_progress));
            }
            result = api.get_load_balancer(&id) => result?,
        };
        current = fetched;

        let elapsed = start.elapsed();
        info!(
            id = %current.id,
            status = %current.status,
            attempt,
            elapsed_secs = elapsed.as_secs(),
            "Polled load balancer"
        );
        emit(
            on_progress,
            ProgressEvent::Polling {
                id: current.id.clone(),
                status: current.status.clone(),
                attempt,
                elapsed,
            },
        );

        match current.status {
            LoadBalancerStatus::Active => return Ok(PollOutcome::Active(current)),
            LoadBalancerStatus::Errored => {
                emit(
                    on_progress,
                    ProgressEvent::Errored {
                        id: current.id.clone(),
                    },
                );
                return Err(CoreError::CreationErrored(Box::new(current)));
            }
            LoadBalancerStatus::New | LoadBalancerStatus::Unknown(_) => {}
        }

        tokio::select! {
            biased;
            _ = options.cancel.cancelled() => {
                return Ok(stop(CancelReason::Requested, current, on_progress));
            }
            timeout = deadline_elapsed(deadline) => {
                return Ok(stop(CancelReason::DeadlineExceeded(timeout), current, on_progress));
            }
            _ = tokio::time::sleep(options.interval) => {}
        }
    }
}

/// Resolves with the configured timeout once the deadline passes; never
/// resolves without one.
async fn deadline_elapsed(deadline: Option<(Instant, Duration)>) -> Duration {
    match deadline {
        Some((at, timeout)) => {
            tokio::time::sleep_until(at).await;
            timeout
        }
        None => std::future::pending().await,
    }
}

fn stop(
    reason: CancelReason,
    last_known: LoadBalancer,
    on_progress: Option<&ProgressCallback>,
) -> PollOutcome {
    info!(id = %last_known.id, %reason, "Stopped waiting for load balancer");
    emit(
        on_progress,
        ProgressEvent::Cancelled {
            id: last_known.id.clone(),
            reason,
        },
    );
    PollOutcome::Cancelled { reason, last_known }
}

/// Helper to emit progress events
pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
