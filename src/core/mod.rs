pub mod client;
pub mod persistence;
pub mod prom;
pub mod util;
