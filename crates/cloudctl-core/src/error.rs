//! Unified error handling for cloudctl-core
//!
//! # Example
//!
//! ```rust
//! use cloudctl_core::CoreError;
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_unauthorized() {
//!         println!("Check your access token");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! let err = CoreError::Api { status: 404, message: "not found".to_string() };
//! assert!(err.is_not_found());
//! ```

use thiserror::Error;

use crate::config::ConfigError;
use crate::load_balancer::LoadBalancer;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Network or connection failure (after transport retries)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credentials rejected (401/403)
    #[error("Unable to authenticate you (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Non-2xx answer to the creation request
    #[error("Load balancer creation failed (HTTP {status}): {message}")]
    CreationFailed { status: u16, message: String },

    /// The load balancer reached the `errored` status while waiting
    #[error("Load balancer {} reported status errored", .0.id)]
    CreationErrored(Box<LoadBalancer>),

    /// Non-2xx answer to any other request
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx body that didn't match the expected envelope
    #[error("Failed to decode API response: {message}")]
    Decode { message: String, body: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Bad user input (e.g. malformed policy strings)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Unauthorized { .. })
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::Api { status: 404, .. } | CoreError::CreationFailed { status: 404, .. }
        )
    }

    /// Returns true if this is a bad request error (400 or local validation)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::Api { status: 400 | 422, .. }
                | CoreError::CreationFailed { status: 400 | 422, .. }
        )
    }

    /// Returns true if this error is potentially retryable
    ///
    /// Only transport-level failures qualify. Creation failures are never
    /// retryable since the create call is not idempotent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_connect() || e.is_timeout(),
            CoreError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The last snapshot of the resource, for errors that carry one
    #[must_use]
    pub fn last_known(&self) -> Option<&LoadBalancer> {
        match self {
            CoreError::CreationErrored(lb) => Some(lb),
            _ => None,
        }
    }
}
