use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{
    CacheConnection, CacheConnector, CacheError, CacheResult, CacheTarget,
};

/// Valkey/Redis-backed connector.
///
/// This is intentionally small: the probe only needs `SET` and `GET`.
/// No pooling, no connection manager: each `connect` dials a fresh connection.
#[derive(Clone, Debug)]
pub struct ValkeyConnector {
    client: redis::Client,
    target: CacheTarget,
    connect_timeout: Duration,
}

impl ValkeyConnector {
    // Build a connector for `redis://host:port/`. Does not dial.
    pub fn new(target: CacheTarget, connect_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(connection_url(&target))
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(Self {
            client,
            target,
            connect_timeout,
        })
    }
}

fn connection_url(target: &CacheTarget) -> String {
    // IPv6 literals need brackets inside a URL authority.
    if target.host.contains(':') && !target.host.starts_with('[') {
        format!("redis://[{}]:{}/", target.host, target.port)
    } else {
        format!("redis://{}:{}/", target.host, target.port)
    }
}

/// Split redis errors into "dependency unreachable" and everything else.
fn classify(e: redis::RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        CacheError::BackendConnection(e.to_string())
    } else {
        CacheError::BackendCommand(e.to_string())
    }
}

#[async_trait]
impl CacheConnector for ValkeyConnector {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    fn target(&self) -> &CacheTarget {
        &self.target
    }

    async fn connect(&self) -> CacheResult<Box<dyn CacheConnection>> {
        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            CacheError::BackendConnection(format!(
                "timed out after {:?} connecting to {}",
                self.connect_timeout, self.target
            ))
        })?
        .map_err(classify)?;

        Ok(Box::new(ValkeyConnection { conn }))
    }
}

struct ValkeyConnection {
    conn: redis::aio::MultiplexedConnection,
}

#[async_trait]
impl CacheConnection for ValkeyConnection {
    async fn set_string(&mut self, key: &str, value: &str) -> CacheResult<()> {
        // SET replies `OK`; the reply itself carries nothing we need.
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut self.conn)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn get_string(&mut self, key: &str) -> CacheResult<Option<String>> {
        let resp: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.conn)
            .await
            .map_err(classify)?;

        Ok(resp)
    }
}
