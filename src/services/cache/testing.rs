//! In-memory connector that replays a fixed script, one step per `connect`.
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use crate::services::cache::client::{
    CacheConnection, CacheConnector, CacheError, CacheResult, CacheTarget,
};

#[derive(Clone, Copy, Debug)]
pub enum Step {
    /// Connection refused.
    Refuse,
    /// Connects, then the connection drops on SET.
    DropOnSet,
    /// Connects and echoes back whatever was written.
    Healthy,
    /// Connects, accepts SET, but GET returns this value instead.
    Corrupt(&'static str),
    /// Connects, accepts SET, but the key is gone on GET.
    Vanish,
    /// Connects, SET is rejected with a command error.
    Reject,
}

/// Steps are consumed in order; the last step repeats once the script runs out.
#[derive(Clone, Debug)]
pub struct ScriptedConnector {
    target: CacheTarget,
    script: Arc<Vec<Step>>,
    attempts: Arc<AtomicU32>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Step>) -> Self {
        assert!(!script.is_empty(), "script needs at least one step");
        Self {
            target: CacheTarget::new("redis", 6379),
            script: Arc::new(script),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Dependency that is down for the first `k` connects, then healthy.
    pub fn down_for(k: usize) -> Self {
        let mut script = vec![Step::Refuse; k];
        script.push(Step::Healthy);
        Self::new(script)
    }

    pub fn with_target(mut self, target: CacheTarget) -> Self {
        self.target = target;
        self
    }

    /// Number of `connect` calls observed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheConnector for ScriptedConnector {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    fn target(&self) -> &CacheTarget {
        &self.target
    }

    async fn connect(&self) -> CacheResult<Box<dyn CacheConnection>> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
        let step = self.script[n.min(self.script.len() - 1)];

        match step {
            Step::Refuse => Err(CacheError::BackendConnection(format!(
                "Connection refused ({})",
                self.target
            ))),
            step => Ok(Box::new(ScriptedConnection { step, stored: None })),
        }
    }
}

struct ScriptedConnection {
    step: Step,
    stored: Option<String>,
}

#[async_trait]
impl CacheConnection for ScriptedConnection {
    async fn set_string(&mut self, _key: &str, value: &str) -> CacheResult<()> {
        match self.step {
            Step::DropOnSet => Err(CacheError::BackendConnection(
                "connection reset by peer".into(),
            )),
            Step::Reject => Err(CacheError::BackendCommand(
                "OOM command not allowed when used memory > 'maxmemory'".into(),
            )),
            _ => {
                self.stored = Some(value.to_string());
                Ok(())
            }
        }
    }

    async fn get_string(&mut self, _key: &str) -> CacheResult<Option<String>> {
        match self.step {
            Step::Corrupt(v) => Ok(Some(v.to_string())),
            Step::Vanish => Ok(None),
            _ => Ok(self.stored.clone()),
        }
    }
}
