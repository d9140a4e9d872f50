//! Load balancer resource: model, flag parsing and workflows

pub mod model;
pub mod params;
pub mod workflows;

pub use model::{
    DEFAULT_ALGORITHM, ForwardingRule, HealthCheck, LoadBalancer, LoadBalancerEnvelope,
    LoadBalancerSpec, LoadBalancerStatus, Region, StickySessions,
};
pub use params::parse_forwarding_rules;
pub use workflows::{CreateOutcome, create_load_balancer, create_load_balancer_and_wait};
