//! Load balancer workflows - create, optionally followed by waiting
//!
//! These compose the API calls with progress reporting and the poll loop.

use tracing::info;

use super::model::{LoadBalancer, LoadBalancerSpec};
use crate::client::LoadBalancerApi;
use crate::error::Result;
use crate::progress::{
    CancelReason, PollOutcome, ProgressCallback, ProgressEvent, WaitOptions, emit,
    poll_load_balancer,
};

/// How a create invocation ended, when it didn't fail
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Created, and active if waiting was requested
    Created(LoadBalancer),
    /// Waiting was cancelled or timed out before a terminal status
    Cancelled {
        reason: CancelReason,
        last_known: LoadBalancer,
    },
}

impl CreateOutcome {
    /// The most recent snapshot, whichever way the workflow ended
    pub fn load_balancer(&self) -> &LoadBalancer {
        match self {
            CreateOutcome::Created(lb) => lb,
            CreateOutcome::Cancelled { last_known, .. } => last_known,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CreateOutcome::Cancelled { .. })
    }
}

/// Create a load balancer, waiting for it to become active if asked to
///
/// With `wait == false` this submits the request and returns the resource
/// as the API answered it. Otherwise see [`create_load_balancer_and_wait`].
/// The creation request is sent exactly once; failures propagate as is.
pub async fn create_load_balancer<A>(
    api: &A,
    spec: &LoadBalancerSpec,
    wait: bool,
    options: &WaitOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<CreateOutcome>
where
    A: LoadBalancerApi + ?Sized,
{
    if wait {
        return create_load_balancer_and_wait(api, spec, options, on_progress).await;
    }

    let created = submit(api, spec, on_progress.as_ref()).await?;
    emit(
        on_progress.as_ref(),
        ProgressEvent::Created {
            id: created.id.clone(),
        },
    );
    Ok(CreateOutcome::Created(created))
}

/// Create a load balancer and wait for it to become active
///
/// This is a convenience workflow that:
/// 1. Submits the creation request
/// 2. Reports `Waiting`, then polls until `active`, `errored`, cancellation
///    or the deadline
/// 3. Reports `Created` and returns the active snapshot
///
/// An `errored` status surfaces as [`CoreError::CreationErrored`]; a
/// cancelled wait is a [`CreateOutcome::Cancelled`], not an error.
///
/// [`CoreError::CreationErrored`]: crate::error::CoreError::CreationErrored
///
/// # Example
///
/// ```rust,ignore
/// use cloudctl_core::{create_load_balancer_and_wait, LoadBalancerSpec, WaitOptions};
///
/// let spec = LoadBalancerSpec::new("my-lb", "nyc3")
///     .with_size("lb-small")
///     .with_droplet_ids([3164444, 3164445]);
///
/// let outcome = create_load_balancer_and_wait(
///     &client,
///     &spec,
///     &WaitOptions::default(),
///     None, // No progress callback
/// )
/// .await?;
///
/// println!("Load balancer {} is {}", outcome.load_balancer().id, outcome.load_balancer().status);
/// ```
pub async fn create_load_balancer_and_wait<A>(
    api: &A,
    spec: &LoadBalancerSpec,
    options: &WaitOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<CreateOutcome>
where
    A: LoadBalancerApi + ?Sized,
{
    let created = submit(api, spec, on_progress.as_ref()).await?;

    emit(
        on_progress.as_ref(),
        ProgressEvent::Waiting {
            id: created.id.clone(),
        },
    );

    match poll_load_balancer(api, created, options, on_progress.as_ref()).await? {
        PollOutcome::Active(active) => {
            info!(id = %active.id, "Load balancer is active");
            emit(
                on_progress.as_ref(),
                ProgressEvent::Created {
                    id: active.id.clone(),
                },
            );
            Ok(CreateOutcome::Created(active))
        }
        PollOutcome::Cancelled { reason, last_known } => {
            Ok(CreateOutcome::Cancelled { reason, last_known })
        }
    }
}

async fn submit<A>(
    api: &A,
    spec: &LoadBalancerSpec,
    on_progress: Option<&ProgressCallback>,
) -> Result<LoadBalancer>
where
    A: LoadBalancerApi + ?Sized,
{
    let created = api.create_load_balancer(spec).await?;
    info!(id = %created.id, name = %created.name, status = %created.status, "Load balancer submitted");
    emit(
        on_progress,
        ProgressEvent::Submitted {
            id: created.id.clone(),
            status: created.status.clone(),
        },
    );
    Ok(created)
}
