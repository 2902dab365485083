pub mod error_collector;
pub mod query_batch;
pub mod query_executor;
pub mod query_result;
