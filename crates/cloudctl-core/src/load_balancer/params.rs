//! Parsing of the `key:value,key:value` notation used for load balancer
//! policies on the command line
//!
//! ```text
//! --health-check "protocol:http,port:80,path:/healthz,check_interval_seconds:10"
//! --sticky-sessions "type:cookies,cookie_name:lb,cookie_ttl_seconds:300"
//! --forwarding-rules "entry_protocol:http,entry_port:80,target_protocol:http,target_port:8080"
//! ```

use std::str::FromStr;

use super::model::{ForwardingRule, HealthCheck, StickySessions};
use crate::error::{CoreError, Result};

/// Split `a:1,b:2` into key/value pairs. Values may themselves contain `:`.
fn parse_pairs<'a>(input: &'a str, what: &str) -> Result<Vec<(&'a str, &'a str)>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .split_once(':')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "invalid {what} entry '{segment}': expected key:value"
                    ))
                })
        })
        .collect()
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{key}' expects a number, got '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{key}' expects true or false, got '{value}'")))
}

fn unknown_key(what: &str, key: &str) -> CoreError {
    CoreError::Validation(format!("unknown {what} key '{key}'"))
}

impl FromStr for HealthCheck {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut check = HealthCheck::default();
        for (key, value) in parse_pairs(s, "health check")? {
            match key {
                "protocol" => check.protocol = Some(value.to_string()),
                "port" => check.port = Some(parse_number(key, value)?),
                "path" => check.path = Some(value.to_string()),
                "check_interval_seconds" => {
                    check.check_interval_seconds = Some(parse_number(key, value)?)
                }
                "response_timeout_seconds" => {
                    check.response_timeout_seconds = Some(parse_number(key, value)?)
                }
                "healthy_threshold" => check.healthy_threshold = Some(parse_number(key, value)?),
                "unhealthy_threshold" => {
                    check.unhealthy_threshold = Some(parse_number(key, value)?)
                }
                _ => return Err(unknown_key("health check", key)),
            }
        }
        Ok(check)
    }
}

impl FromStr for StickySessions {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut sessions = StickySessions::default();
        for (key, value) in parse_pairs(s, "sticky sessions")? {
            match key {
                "type" => sessions.kind = Some(value.to_string()),
                "cookie_name" => sessions.cookie_name = Some(value.to_string()),
                "cookie_ttl_seconds" => {
                    sessions.cookie_ttl_seconds = Some(parse_number(key, value)?)
                }
                _ => return Err(unknown_key("sticky sessions", key)),
            }
        }
        Ok(sessions)
    }
}

impl FromStr for ForwardingRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut rule = ForwardingRule::default();
        for (key, value) in parse_pairs(s, "forwarding rule")? {
            match key {
                "entry_protocol" => rule.entry_protocol = value.to_string(),
                "entry_port" => rule.entry_port = parse_number(key, value)?,
                "target_protocol" => rule.target_protocol = value.to_string(),
                "target_port" => rule.target_port = parse_number(key, value)?,
                "certificate_id" => rule.certificate_id = value.to_string(),
                "tls_passthrough" => rule.tls_passthrough = parse_bool(key, value)?,
                _ => return Err(unknown_key("forwarding rule", key)),
            }
        }
        if rule.entry_protocol.is_empty() || rule.target_protocol.is_empty() {
            return Err(CoreError::Validation(format!(
                "forwarding rule '{s}' needs entry_protocol and target_protocol"
            )));
        }
        Ok(rule)
    }
}

/// Parse a space-separated list of forwarding rules
pub fn parse_forwarding_rules(input: &str) -> Result<Vec<ForwardingRule>> {
    input.split_whitespace().map(str::parse).collect()
}
