//! Load balancer resource model
//!
//! The same sub-structures are used for the creation request and for the
//! resource the API returns. Optional fields inside the policies are skipped
//! when unset, so an unconfigured health check or sticky-session policy goes
//! over the wire as `{}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Balancing algorithm used when the caller doesn't pick one
pub const DEFAULT_ALGORITHM: &str = "round_robin";

/// Lifecycle status reported by the API
///
/// Unknown values are preserved so they can be displayed and polled past.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoadBalancerStatus {
    #[default]
    New,
    Active,
    Errored,
    Unknown(String),
}

impl LoadBalancerStatus {
    /// Returns true once no further polling should happen
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Errored)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::Active => "active",
            Self::Errored => "errored",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for LoadBalancerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => Self::New,
            "active" => Self::Active,
            "errored" => Self::Errored,
            _ => Self::Unknown(value),
        }
    }
}

impl From<LoadBalancerStatus> for String {
    fn from(value: LoadBalancerStatus) -> Self {
        match value {
            LoadBalancerStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for LoadBalancerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health check policy for backend droplets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_timeout_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<u32>,
}

/// Sticky session policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickySessions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_ttl_seconds: Option<u32>,
}

/// A single entry -> target forwarding rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingRule {
    pub entry_protocol: String,
    pub entry_port: u16,
    pub target_protocol: String,
    pub target_port: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub certificate_id: String,
    pub tls_passthrough: bool,
}

impl ForwardingRule {
    /// Whether TLS is terminated on the load balancer for this rule
    #[must_use]
    pub fn terminates_tls(&self) -> bool {
        let secure_entry = matches!(
            self.entry_protocol.to_ascii_lowercase().as_str(),
            "https" | "http2" | "http3"
        );
        secure_entry && !self.tls_passthrough
    }
}

/// Region descriptor embedded in a load balancer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub name: String,
    pub slug: String,
    pub sizes: Vec<String>,
    pub features: Vec<String>,
    pub available: bool,
}

/// A load balancer as returned by the API
///
/// Missing fields deserialize to their zero value. `created_at` is kept as
/// the exact string the API sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub algorithm: String,
    pub status: LoadBalancerStatus,
    pub created_at: String,
    pub forwarding_rules: Vec<ForwardingRule>,
    pub health_check: HealthCheck,
    pub sticky_sessions: StickySessions,
    pub region: Region,
    #[serde(rename = "size")]
    pub size_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_unit: Option<u32>,
    pub vpc_uuid: String,
    pub tag: String,
    pub droplet_ids: Vec<i64>,
    pub redirect_http_to_https: bool,
    pub enable_proxy_protocol: bool,
    pub enable_backend_keepalive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_lets_encrypt_dns_records: Option<bool>,
}

/// Request body for `POST /v2/load_balancers`
///
/// `health_check` and `sticky_sessions` are always serialized, as `{}` when
/// nothing was configured. Flags default to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub algorithm: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_unit: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forwarding_rules: Vec<ForwardingRule>,
    pub health_check: HealthCheck,
    pub sticky_sessions: StickySessions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub droplet_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub redirect_http_to_https: bool,
    pub enable_proxy_protocol: bool,
    pub enable_backend_keepalive: bool,
    pub disable_lets_encrypt_dns_records: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_idle_timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl LoadBalancerSpec {
    /// Create a spec with the required fields and defaults for the rest
    #[must_use]
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
            region: region.into(),
            size: None,
            size_unit: None,
            forwarding_rules: Vec::new(),
            health_check: HealthCheck::default(),
            sticky_sessions: StickySessions::default(),
            droplet_ids: Vec::new(),
            tag: None,
            redirect_http_to_https: false,
            enable_proxy_protocol: false,
            enable_backend_keepalive: false,
            disable_lets_encrypt_dns_records: false,
            http_idle_timeout_seconds: None,
            vpc_uuid: None,
            project_id: None,
        }
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_size_unit(mut self, size_unit: u32) -> Self {
        self.size_unit = Some(size_unit);
        self
    }

    /// Set backend droplets, keeping the given order
    #[must_use]
    pub fn with_droplet_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.droplet_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_vpc_uuid(mut self, vpc_uuid: impl Into<String>) -> Self {
        self.vpc_uuid = Some(vpc_uuid.into());
        self
    }

    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    #[must_use]
    pub fn with_forwarding_rules(mut self, rules: Vec<ForwardingRule>) -> Self {
        self.forwarding_rules = rules;
        self
    }

    #[must_use]
    pub fn with_health_check(mut self, health_check: HealthCheck) -> Self {
        self.health_check = health_check;
        self
    }

    #[must_use]
    pub fn with_sticky_sessions(mut self, sticky_sessions: StickySessions) -> Self {
        self.sticky_sessions = sticky_sessions;
        self
    }

    #[must_use]
    pub fn with_redirect_http_to_https(mut self, enabled: bool) -> Self {
        self.redirect_http_to_https = enabled;
        self
    }

    #[must_use]
    pub fn with_proxy_protocol(mut self, enabled: bool) -> Self {
        self.enable_proxy_protocol = enabled;
        self
    }

    #[must_use]
    pub fn with_backend_keepalive(mut self, enabled: bool) -> Self {
        self.enable_backend_keepalive = enabled;
        self
    }

    #[must_use]
    pub fn with_lets_encrypt_dns_records_disabled(mut self, disabled: bool) -> Self {
        self.disable_lets_encrypt_dns_records = disabled;
        self
    }

    #[must_use]
    pub fn with_http_idle_timeout_seconds(mut self, seconds: u64) -> Self {
        self.http_idle_timeout_seconds = Some(seconds);
        self
    }
}

/// `{"load_balancer": {...}}` wrapper used by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerEnvelope {
    pub load_balancer: LoadBalancer,
}
