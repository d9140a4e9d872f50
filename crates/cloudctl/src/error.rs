//! Error types for cloudctl
//!
//! Defines structured error types using thiserror, each with suggestions
//! printed as a cargo-style diagnostic.

use colored::Colorize;
use cloudctl_core::{ConfigError, CoreError};
use thiserror::Error;

/// Exit status after the user interrupted a wait with Ctrl-C
pub const EXIT_INTERRUPTED: i32 = 130;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: no access token configured
///
///   tip: pass a token on the command line:
///       cloudctl --access-token <token> ...
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the cloudctl application
#[derive(Error, Debug)]
pub enum CloudCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Context '{name}' not found")]
    ContextNotFound { name: String },

    #[error("No access token configured")]
    MissingCredentials,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Load balancer creation failed: {message}")]
    CreationFailed { message: String },

    #[error("Load balancer {id} ({name}) in region {region} reported status {status}")]
    CreationErrored {
        id: String,
        name: String,
        region: String,
        status: String,
    },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    /// Waiting was interrupted; a notice has already been printed
    #[error("Interrupted")]
    Interrupted,

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for cloudctl operations
pub type Result<T> = std::result::Result<T, CloudCtlError>;

impl CloudCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CloudCtlError::MissingCredentials => vec![
                "Pass a token: cloudctl --access-token <token> ...".to_string(),
                "Or set the CLOUDCTL_ACCESS_TOKEN environment variable".to_string(),
                "Or add access_token to a [contexts.<name>] table in the config file".to_string(),
            ],
            CloudCtlError::ContextNotFound { name } => vec![
                format!("Add a [contexts.{}] table to the config file", name),
                "Check the context name spelling".to_string(),
            ],
            CloudCtlError::AuthenticationFailed { .. } => vec![
                "Check that the access token is valid and has write scope".to_string(),
                "Ensure the API URL is correct".to_string(),
            ],
            CloudCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL is correct: --api-url <url>".to_string(),
                "Increase transport retries with --http-retry-max".to_string(),
            ],
            CloudCtlError::CreationErrored { .. } => vec![
                "Check the region and size are available for load balancers".to_string(),
                "Inspect the load balancer in the control panel before retrying".to_string(),
            ],
            CloudCtlError::Timeout { .. } => vec![
                "The load balancer may still become active; check its status later".to_string(),
                "Raise the limit with --wait-timeout <secs> (0 waits forever)".to_string(),
            ],
            CloudCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: cloudctl compute load-balancer create --help".to_string(),
                "Policies are comma-separated key:value pairs, e.g. protocol:http,port:80".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CloudCtlError::Interrupted => EXIT_INTERRUPTED,
            _ => 1,
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        if matches!(self, CloudCtlError::Interrupted) {
            return;
        }

        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let CloudCtlError::CreationErrored { id, .. } = self {
            diag = diag.detail(&format!("The resource was created and still exists: {}", id));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CoreError> for CloudCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { status, message } => CloudCtlError::AuthenticationFailed {
                message: format!("HTTP {}: {}", status, message),
            },
            CoreError::CreationFailed { status, message } => CloudCtlError::CreationFailed {
                message: format!("HTTP {}: {}", status, message),
            },
            CoreError::CreationErrored(lb) => CloudCtlError::CreationErrored {
                id: lb.id,
                name: lb.name,
                region: lb.region.slug,
                status: lb.status.to_string(),
            },
            CoreError::Api { status, message } => CloudCtlError::ApiError {
                message: format!("HTTP {}: {}", status, message),
            },
            CoreError::Transport(e) => CloudCtlError::ConnectionError {
                message: e.to_string(),
            },
            CoreError::Decode { message, .. } => CloudCtlError::ApiError {
                message: format!("unexpected response: {}", message),
            },
            CoreError::InvalidUrl(e) => CloudCtlError::InvalidInput {
                message: format!("invalid API URL: {}", e),
            },
            CoreError::Validation(message) => CloudCtlError::InvalidInput { message },
            CoreError::Config(e) => CloudCtlError::from(e),
        }
    }
}

impl From<ConfigError> for CloudCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ContextNotFound { name } => CloudCtlError::ContextNotFound { name },
            other => CloudCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CloudCtlError {
    fn from(err: serde_json::Error) -> Self {
        CloudCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for CloudCtlError {
    fn from(err: serde_yaml::Error) -> Self {
        CloudCtlError::OutputError {
            message: format!("YAML error: {}", err),
        }
    }
}

impl From<std::io::Error> for CloudCtlError {
    fn from(err: std::io::Error) -> Self {
        CloudCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}
