//! Configuration and context management
//!
//! Contexts are named sets of credentials and settings stored in a TOML
//! file under the platform config directory.

#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod resilience;

pub use config::{Config, Context};
pub use error::{ConfigError, Result};
pub use resilience::{RetryConfig, WaitConfig};
