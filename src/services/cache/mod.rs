pub mod client;
pub mod valkey;

pub use client::{CacheConnector, CacheError, CacheTarget};
pub use valkey::ValkeyConnector;

#[cfg(test)]
pub mod testing;
