//! Table presenter for load balancers

use cloudctl_core::{ForwardingRule, HealthCheck, LoadBalancer, StickySessions};

use crate::cli::compute::DisplayArgs;
use crate::error::{CloudCtlError, Result as CliResult};
use crate::output::render_columns;

/// Placeholder for optional values the API didn't send
const NIL: &str = "<nil>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Ip,
    Name,
    Status,
    CreatedAt,
    Region,
    Size,
    SizeUnit,
    VpcUuid,
    Tag,
    DropletIds,
    Ssl,
    StickySessions,
    HealthCheck,
    ForwardingRules,
    DisableLetsEncryptDnsRecords,
}

impl Column {
    /// Default column order
    pub const ALL: [Column; 16] = [
        Column::Id,
        Column::Ip,
        Column::Name,
        Column::Status,
        Column::CreatedAt,
        Column::Region,
        Column::Size,
        Column::SizeUnit,
        Column::VpcUuid,
        Column::Tag,
        Column::DropletIds,
        Column::Ssl,
        Column::StickySessions,
        Column::HealthCheck,
        Column::ForwardingRules,
        Column::DisableLetsEncryptDnsRecords,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Ip => "IP",
            Column::Name => "Name",
            Column::Status => "Status",
            Column::CreatedAt => "Created At",
            Column::Region => "Region",
            Column::Size => "Size",
            Column::SizeUnit => "Size Unit",
            Column::VpcUuid => "VPC UUID",
            Column::Tag => "Tag",
            Column::DropletIds => "Droplet IDs",
            Column::Ssl => "SSL",
            Column::StickySessions => "Sticky Sessions",
            Column::HealthCheck => "Health Check",
            Column::ForwardingRules => "Forwarding Rules",
            Column::DisableLetsEncryptDnsRecords => "Disable Lets Encrypt DNS Records",
        }
    }

    pub fn value(self, lb: &LoadBalancer) -> String {
        match self {
            Column::Id => lb.id.clone(),
            Column::Ip => lb.ip.clone(),
            Column::Name => lb.name.clone(),
            Column::Status => lb.status.to_string(),
            Column::CreatedAt => lb.created_at.clone(),
            Column::Region => lb.region.slug.clone(),
            Column::Size => lb.size_slug.clone(),
            Column::SizeUnit => or_nil(lb.size_unit),
            Column::VpcUuid => lb.vpc_uuid.clone(),
            Column::Tag => lb.tag.clone(),
            Column::DropletIds => lb
                .droplet_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Column::Ssl => ssl(&lb.forwarding_rules).to_string(),
            Column::StickySessions => sticky_sessions(&lb.sticky_sessions),
            Column::HealthCheck => health_check(&lb.health_check),
            Column::ForwardingRules => lb
                .forwarding_rules
                .iter()
                .map(forwarding_rule)
                .collect::<Vec<_>>()
                .join(" "),
            Column::DisableLetsEncryptDnsRecords => or_nil(lb.disable_lets_encrypt_dns_records),
        }
    }

    /// Look up a column by header, ignoring case and spaces
    pub fn parse(name: &str) -> Option<Column> {
        let wanted = normalize(name);
        Column::ALL
            .into_iter()
            .find(|column| normalize(column.header()) == wanted)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn or_nil<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NIL.to_string(), |v| v.to_string())
}

/// Listeners without rules are reported as SSL-capable
fn ssl(rules: &[ForwardingRule]) -> bool {
    rules.is_empty() || rules.iter().any(ForwardingRule::terminates_tls)
}

fn sticky_sessions(policy: &StickySessions) -> String {
    format!(
        "type:{},cookie_name:{},cookie_ttl_seconds:{}",
        policy.kind.as_deref().unwrap_or_default(),
        policy.cookie_name.as_deref().unwrap_or_default(),
        policy.cookie_ttl_seconds.unwrap_or_default(),
    )
}

fn health_check(policy: &HealthCheck) -> String {
    format!(
        "protocol:{},port:{},path:{},check_interval_seconds:{},response_timeout_seconds:{},healthy_threshold:{},unhealthy_threshold:{}",
        policy.protocol.as_deref().unwrap_or_default(),
        policy.port.unwrap_or_default(),
        policy.path.as_deref().unwrap_or_default(),
        policy.check_interval_seconds.unwrap_or_default(),
        policy.response_timeout_seconds.unwrap_or_default(),
        policy.healthy_threshold.unwrap_or_default(),
        policy.unhealthy_threshold.unwrap_or_default(),
    )
}

fn forwarding_rule(rule: &ForwardingRule) -> String {
    format!(
        "entry_protocol:{},entry_port:{},target_protocol:{},target_port:{},certificate_id:{},tls_passthrough:{}",
        rule.entry_protocol,
        rule.entry_port,
        rule.target_protocol,
        rule.target_port,
        rule.certificate_id,
        rule.tls_passthrough,
    )
}

/// Resolve `--format`; all columns when none were given
pub fn select_columns(names: &[String]) -> CliResult<Vec<Column>> {
    if names.is_empty() {
        return Ok(Column::ALL.to_vec());
    }

    names
        .iter()
        .map(|name| {
            Column::parse(name).ok_or_else(|| CloudCtlError::InvalidInput {
                message: format!(
                    "Unknown column '{}'. Available columns: {}",
                    name,
                    Column::ALL
                        .iter()
                        .map(|c| c.header().replace(' ', ""))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        })
        .collect()
}

/// Render load balancers as an aligned table, one line per entry
pub fn render(lbs: &[LoadBalancer], display: &DisplayArgs) -> CliResult<Vec<String>> {
    let columns = select_columns(&display.format)?;

    let header = (!display.no_header)
        .then(|| columns.iter().map(|c| c.header().to_string()).collect());
    let rows = lbs
        .iter()
        .map(|lb| columns.iter().map(|c| c.value(lb)).collect())
        .collect();

    Ok(render_columns(header, rows))
}
