//! Cache connector interface used by the dependency probe.
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Note:
/// - Only `BackendConnection` means "the dependency is not reachable (yet)".
///   The probe retries that one and nothing else.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

impl CacheError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CacheError::BackendConnection(_))
    }
}

/// Host/port of the cache dependency. Fixed at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheTarget {
    pub host: String,
    pub port: u16,
}

impl CacheTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for CacheTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens connections to the cache dependency.
///
/// Every call to `connect` yields an independent connection, so concurrent
/// requests never share connection state.
#[async_trait]
pub trait CacheConnector: Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    fn target(&self) -> &CacheTarget;

    async fn connect(&self) -> CacheResult<Box<dyn CacheConnection>>;
}

/// A single open connection.
#[async_trait]
pub trait CacheConnection: Send {
    // Set UTF-8 string value (no TTL).
    async fn set_string(&mut self, key: &str, value: &str) -> CacheResult<()>;

    // Get UTF-8 string value.
    async fn get_string(&mut self, key: &str) -> CacheResult<Option<String>>;
}
