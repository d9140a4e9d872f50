//! Command implementations

pub mod async_utils;
pub mod load_balancer;
