//! Cluster cost computation over Prometheus cost metrics

pub mod aggregator;
pub mod discount;
pub mod model;
pub mod queries;
pub mod service;
