pub mod cost;
pub mod info;
