pub mod cluster_cost;
pub mod info;
