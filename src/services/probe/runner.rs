//! Marker round-trip against the cache dependency, with bounded retry.
//!
//! Retry rules:
//! - connectivity failures (refused, dropped, timed out) are retried
//! - a round-trip that returns the wrong value fails at once
//! - any other backend error fails at once
use thiserror::Error;

use crate::services::cache::{CacheConnector, CacheError, CacheTarget};
use crate::services::probe::policy::RetryPolicy;

pub const MARKER_KEY: &str = "test_key";
pub const MARKER_VALUE: &str = "hello";

/// Successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// 1-based attempt that succeeded.
    pub attempts: u32,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The dependency answered, but not with what was written.
    #[error("Unexpected value")]
    UnexpectedValue { attempt: u32, got: Option<String> },

    /// Every attempt failed to reach the dependency.
    #[error("Cannot connect to Redis at {target}")]
    Exhausted {
        target: CacheTarget,
        attempts: u32,
        last_error: Option<CacheError>,
    },

    #[error("{source}")]
    Unexpected { attempt: u32, source: CacheError },
}

impl ProbeError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            ProbeError::UnexpectedValue { attempt, .. } => *attempt,
            ProbeError::Exhausted { attempts, .. } => *attempts,
            ProbeError::Unexpected { attempt, .. } => *attempt,
        }
    }
}

/// Write the marker, read it back, compare. One connection per call.
async fn round_trip<C>(connector: &C) -> Result<Option<String>, CacheError>
where
    C: CacheConnector + ?Sized,
{
    let mut conn = connector.connect().await?;
    conn.set_string(MARKER_KEY, MARKER_VALUE).await?;
    conn.get_string(MARKER_KEY).await
}

/// Run the probe under `policy`.
///
/// Sleeps `policy.delay()` between connectivity failures, never after the last attempt.
pub async fn run<C>(connector: &C, policy: &RetryPolicy) -> Result<ProbeReport, ProbeError>
where
    C: CacheConnector + ?Sized,
{
    let target = connector.target();
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts() {
        match round_trip(connector).await {
            Ok(Some(value)) if value == MARKER_VALUE => {
                tracing::info!(
                    backend = connector.backend_name(),
                    dependency = %target,
                    attempt,
                    "dependency probe succeeded"
                );
                return Ok(ProbeReport { attempts: attempt });
            }
            Ok(got) => {
                tracing::error!(
                    backend = connector.backend_name(),
                    dependency = %target,
                    attempt,
                    ?got,
                    "dependency probe read back an unexpected value"
                );
                return Err(ProbeError::UnexpectedValue { attempt, got });
            }
            Err(e) if e.is_connectivity() => {
                tracing::warn!(
                    backend = connector.backend_name(),
                    dependency = %target,
                    attempt,
                    max_attempts = policy.max_attempts(),
                    error = %e,
                    "dependency unreachable"
                );
                last_error = Some(e);

                if policy.allows_retry_after(attempt) {
                    tokio::time::sleep(policy.delay()).await;
                }
            }
            Err(e) => {
                tracing::error!(
                    backend = connector.backend_name(),
                    dependency = %target,
                    attempt,
                    error = %e,
                    "dependency probe failed"
                );
                return Err(ProbeError::Unexpected { attempt, source: e });
            }
        }
    }

    tracing::error!(
        backend = connector.backend_name(),
        dependency = %target,
        attempts = policy.max_attempts(),
        last_error = ?last_error,
        "dependency probe gave up"
    );

    Err(ProbeError::Exhausted {
        target: target.clone(),
        attempts: policy.max_attempts(),
        last_error,
    })
}
