//! # cloudctl-core
//!
//! Shared engine behind the `cloudctl` binary: the load balancer resource
//! model, an HTTP client for the control-plane API, the status poll loop and
//! the create-and-wait workflow, plus configuration contexts.
//!
//! ## Layers
//!
//! - [`load_balancer`] - request/resource types, `key:value` flag parsing,
//!   and the create workflows
//! - [`client`] - `reqwest` client implementing [`LoadBalancerApi`]
//! - [`progress`] - poll loop, progress events, cancellation and deadlines
//! - [`config`] - TOML contexts with environment variable expansion
//! - [`error`] - unified error type
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudctl_core::{ApiClient, ClientConfig, LoadBalancerSpec, WaitOptions, create_load_balancer};
//!
//! let client = ApiClient::new(ClientConfig::new(cloudctl_core::DEFAULT_API_URL, token))?;
//! let spec = LoadBalancerSpec::new("my-lb", "nyc3").with_size("lb-small");
//!
//! let outcome = create_load_balancer(&client, &spec, true, &WaitOptions::default(), None).await?;
//! println!("{}", outcome.load_balancer().id);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod load_balancer;
pub mod progress;

pub use client::{ApiClient, ClientConfig, DEFAULT_API_URL, LoadBalancerApi};
pub use config::{Config, ConfigError, Context, RetryConfig, WaitConfig};
pub use error::{CoreError, Result};
pub use load_balancer::{
    CreateOutcome, DEFAULT_ALGORITHM, ForwardingRule, HealthCheck, LoadBalancer,
    LoadBalancerSpec, LoadBalancerStatus, Region, StickySessions, create_load_balancer,
    create_load_balancer_and_wait, parse_forwarding_rules,
};
pub use progress::{
    CancelReason, DEFAULT_POLL_INTERVAL, PollOutcome, ProgressCallback, ProgressEvent,
    WaitOptions, poll_load_balancer,
};
