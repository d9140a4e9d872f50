//! Connection management: resolves credentials and settings into an API client
//!
//! Precedence for every value is flag, then environment variable (both via
//! clap), then the selected config context, then the built-in default.

use std::path::PathBuf;

use cloudctl_core::{
    ApiClient, ClientConfig, Config, ConfigError, Context, DEFAULT_API_URL, RetryConfig, WaitConfig,
};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::error::{CloudCtlError, Result as CliResult};

/// User agent string for cloudctl HTTP requests
const CLOUDCTL_USER_AGENT: &str = concat!("cloudctl/", env!("CARGO_PKG_VERSION"));

/// Connection-related global flags
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub access_token: Option<String>,
    pub api_url: Option<String>,
    pub context: Option<String>,
    pub http_retry_max: Option<u32>,
}

impl From<&Cli> for ConnectionArgs {
    fn from(cli: &Cli) -> Self {
        Self {
            access_token: cli.access_token.clone(),
            api_url: cli.api_url.clone(),
            context: cli.context.clone(),
            http_retry_max: cli.http_retry_max,
        }
    }
}

/// Everything a command needs to talk to the API
pub struct Connection {
    pub client: ApiClient,
    pub wait: WaitConfig,
}

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Resolve the context to use
    ///
    /// A missing `--context` is an error; a `default_context` naming a
    /// missing context is ignored with a warning.
    fn context(&self, explicit: Option<&str>) -> CliResult<Option<(String, &Context)>> {
        let resolved = match self.config.resolve_context(explicit) {
            Ok(resolved) => resolved,
            Err(ConfigError::ContextNotFound { name }) if explicit.is_none() => {
                warn!("Default context '{}' not found in config, ignoring it", name);
                None
            }
            Err(e) => return Err(e.into()),
        };
        match &resolved {
            Some((name, _)) if self.config_path.is_some() => {
                info!("Using context: {} from {:?}", name, self.config_path)
            }
            Some((name, _)) => info!("Using context: {}", name),
            None => debug!("No config contexts available"),
        }
        Ok(resolved)
    }

    /// Resolve the client configuration without building a client
    pub fn client_config(&self, args: &ConnectionArgs) -> CliResult<(ClientConfig, WaitConfig)> {
        let context = self.context(args.context.as_deref())?.map(|(_, ctx)| ctx);

        let access_token = args
            .access_token
            .clone()
            .or_else(|| context.and_then(|ctx| ctx.access_token.clone()))
            .filter(|token| !token.trim().is_empty())
            .ok_or(CloudCtlError::MissingCredentials)?;

        let api_url = args
            .api_url
            .clone()
            .or_else(|| context.map(|ctx| ctx.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut retry = context
            .and_then(|ctx| ctx.retry.clone())
            .unwrap_or_default();
        if let Some(retries) = args.http_retry_max {
            retry = RetryConfig {
                enabled: retries > 0,
                max_attempts: retries.saturating_add(1),
                ..retry
            };
        }

        let wait = context
            .and_then(|ctx| ctx.wait.clone())
            .unwrap_or_default();

        debug!("API URL: {}, retry: {:?}, wait: {:?}", api_url, retry, wait);

        let config = ClientConfig::new(api_url, access_token)
            .with_retry(retry)
            .with_user_agent(CLOUDCTL_USER_AGENT);
        Ok((config, wait))
    }

    /// Create an API client plus the wait defaults of the selected context
    pub fn connect(&self, args: &ConnectionArgs) -> CliResult<Connection> {
        let (config, wait) = self.client_config(args)?;
        let client = ApiClient::new(config)?;
        Ok(Connection { client, wait })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(toml: &str) -> ConnectionManager {
        let config: Config = toml::from_str(toml).unwrap();
        ConnectionManager::with_config_path(config, None)
    }

    const CONFIG: &str = r#"
default_context = "work"

[contexts.work]
access_token = "work-token"
api_url = "http://work.example"

[contexts.work.retry]
max_attempts = 7

[contexts.work.wait]
poll_interval_secs = 2

[contexts.home]
access_token = "home-token"
"#;

    #[test]
    fn test_flags_override_context() {
        let mgr = manager(CONFIG);
        let args = ConnectionArgs {
            access_token: Some("flag-token".to_string()),
            api_url: Some("http://flag.example".to_string()),
            ..Default::default()
        };

        let (config, wait) = mgr.client_config(&args).unwrap();
        assert_eq!(config.access_token, "flag-token");
        assert_eq!(config.base_url, "http://flag.example");
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(wait.poll_interval_secs, 2);
    }

    #[test]
    fn test_default_context_supplies_credentials() {
        let mgr = manager(CONFIG);
        let (config, _) = mgr.client_config(&ConnectionArgs::default()).unwrap();

        assert_eq!(config.access_token, "work-token");
        assert_eq!(config.base_url, "http://work.example");
        assert_eq!(config.user_agent, CLOUDCTL_USER_AGENT);
    }

    #[test]
    fn test_explicit_context() {
        let mgr = manager(CONFIG);
        let args = ConnectionArgs {
            context: Some("home".to_string()),
            ..Default::default()
        };

        let (config, wait) = mgr.client_config(&args).unwrap();
        assert_eq!(config.access_token, "home-token");
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(wait, WaitConfig::default());
    }

    #[test]
    fn test_unknown_context_errors() {
        let mgr = manager(CONFIG);
        let args = ConnectionArgs {
            context: Some("nope".to_string()),
            access_token: Some("token".to_string()),
            ..Default::default()
        };

        let err = mgr.client_config(&args).err().unwrap();
        assert!(matches!(err, CloudCtlError::ContextNotFound { .. }));
    }

    #[test]
    fn test_dangling_default_context_is_ignored() {
        let mgr = manager(
            r#"
default_context = "gone"

[contexts.home]
access_token = "home-token"
"#,
        );
        let args = ConnectionArgs {
            access_token: Some("flag-token".to_string()),
            api_url: Some("http://flag.example".to_string()),
            ..Default::default()
        };

        let (config, wait) = mgr.client_config(&args).unwrap();
        assert_eq!(config.access_token, "flag-token");
        assert_eq!(config.base_url, "http://flag.example");
        assert_eq!(wait, WaitConfig::default());
    }

    #[test]
    fn test_dangling_default_context_without_token() {
        let mgr = manager("default_context = \"gone\"\n");
        let err = mgr.client_config(&ConnectionArgs::default()).err().unwrap();
        assert!(matches!(err, CloudCtlError::MissingCredentials));
    }

    #[test]
    fn test_missing_token() {
        let mgr = manager("");
        let err = mgr.client_config(&ConnectionArgs::default()).err().unwrap();
        assert!(matches!(err, CloudCtlError::MissingCredentials));
    }

    #[test]
    fn test_retry_max_flag() {
        let mgr = manager("");
        let args = ConnectionArgs {
            access_token: Some("token".to_string()),
            http_retry_max: Some(4),
            ..Default::default()
        };
        let (config, _) = mgr.client_config(&args).unwrap();
        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_attempts, 5);

        let args = ConnectionArgs {
            http_retry_max: Some(0),
            ..args
        };
        let (config, _) = mgr.client_config(&args).unwrap();
        assert_eq!(config.retry.attempts(), 1);
    }
}
