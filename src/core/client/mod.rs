// Prometheus HTTP API client
pub mod prometheus_client;
pub mod prometheus_transport_trait;
