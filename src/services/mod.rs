pub mod cache;
pub mod probe;
