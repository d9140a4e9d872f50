//! Compute command definitions

use clap::{Args, Subcommand};
use cloudctl_core::DEFAULT_ALGORITHM;

use crate::commands::async_utils::WaitArgs;

#[derive(Subcommand, Debug)]
pub enum ComputeCommands {
    /// Manage load balancers
    #[command(subcommand, visible_alias = "lb")]
    LoadBalancer(LoadBalancerCommands),
}

#[derive(Subcommand, Debug)]
pub enum LoadBalancerCommands {
    /// Create a load balancer
    #[command(visible_alias = "c")]
    #[command(after_help = "EXAMPLES:
    # Balance two droplets with default settings
    cloudctl compute load-balancer create --name web-lb --region nyc3 --droplet-ids 22,66

    # HTTPS in front of HTTP, with a health check
    cloudctl compute lb c --name web-lb --region nyc3 --tag-name web \\
        --forwarding-rules \"entry_protocol:https,entry_port:443,target_protocol:http,target_port:80,certificate_id:abc\" \\
        --health-check \"protocol:http,port:80,path:/healthz,check_interval_seconds:10\"

    # Wait for the load balancer to become active, giving up after ten minutes
    cloudctl compute lb create --name web-lb --region nyc3 --wait --wait-timeout 600
")]
    Create(CreateLoadBalancerArgs),
}

/// Arguments for `compute load-balancer create`
#[derive(Args, Debug, Clone)]
pub struct CreateLoadBalancerArgs {
    /// Load balancer name
    #[arg(long)]
    pub name: String,

    /// Region slug, e.g. nyc3
    #[arg(long)]
    pub region: String,

    /// Size slug, e.g. lb-small
    #[arg(long)]
    pub size: Option<String>,

    /// Number of nodes backing the load balancer
    #[arg(long)]
    pub size_unit: Option<u32>,

    /// Balancing algorithm
    #[arg(long, default_value = DEFAULT_ALGORITHM)]
    pub algorithm: String,

    /// Comma-separated droplet IDs to balance
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub droplet_ids: Vec<i64>,

    /// Balance all droplets with this tag
    #[arg(long, value_name = "TAG")]
    pub tag_name: Option<String>,

    /// VPC to place the load balancer in
    #[arg(long)]
    pub vpc_uuid: Option<String>,

    /// Project to assign the load balancer to
    #[arg(long)]
    pub project_id: Option<String>,

    /// Space-separated forwarding rules, each as key:value pairs
    #[arg(long, value_name = "RULES")]
    pub forwarding_rules: Option<String>,

    /// Health check as key:value pairs
    #[arg(long, value_name = "POLICY")]
    pub health_check: Option<String>,

    /// Sticky session policy as key:value pairs
    #[arg(long, value_name = "POLICY")]
    pub sticky_sessions: Option<String>,

    /// Redirect HTTP traffic to HTTPS
    #[arg(long)]
    pub redirect_http_to_https: bool,

    /// Enable the PROXY protocol towards backends
    #[arg(long)]
    pub enable_proxy_protocol: bool,

    /// Keep backend connections alive
    #[arg(long)]
    pub enable_backend_keepalive: bool,

    /// Don't create DNS records for Let's Encrypt certificates
    #[arg(long)]
    pub disable_lets_encrypt_dns_records: bool,

    /// Idle timeout for HTTP connections
    #[arg(long, value_name = "SECS")]
    pub http_idle_timeout_seconds: Option<u64>,

    #[command(flatten)]
    pub wait: WaitArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Column selection for table output
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Columns to display, e.g. ID,Name,Status
    #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
    pub format: Vec<String>,

    /// Don't print the header row
    #[arg(long)]
    pub no_header: bool,
}
