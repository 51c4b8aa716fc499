/*
 * Responsibility
 * - 環境変数の読み込み (PORT, REDIS_HOST, REDIS_PORT, DEBUG_MODE, PROBE_* など)
 * - 設定値のバリデーション (不正なら起動失敗)
 * - 起動時に一度だけ読む。handler には AppState 経由で渡す
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::probe::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which demonstration service this process impersonates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureVariant {
    /// `/` as plain text, `/health` as `{"status":"healthy"}`.
    Plain,
    /// `Plain` plus the `/test-redis` dependency probe.
    Redis,
    /// `/` as a JSON status document carrying `DEBUG_MODE`, `/health` as `{"status":"ok"}`.
    Status,
}

impl FromStr for FixtureVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "redis" => Ok(Self::Redis),
            "status" => Ok(Self::Status),
            _ => Err(ConfigError::Invalid("FIXTURE_VARIANT")),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub variant: FixtureVariant,

    pub redis_host: String,
    pub redis_port: u16,

    // Echoed verbatim by the status fixture; never interpreted.
    pub debug_mode: String,

    pub probe_policy: RetryPolicy,
    pub probe_connect_timeout: Duration,

    // Always longer than the probe's worst case, so an exhausted probe answers
    // with its own 500 instead of being cut off.
    pub request_timeout: Duration,
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT_HEADROOM: Duration = Duration::from_secs(5);

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to their defaults; set-but-unparsable keys are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let variant = match lookup("FIXTURE_VARIANT") {
            Some(raw) => raw.parse()?,
            None => FixtureVariant::Redis,
        };

        let redis_host = lookup("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
        if redis_host.trim().is_empty() {
            return Err(ConfigError::Missing("REDIS_HOST"));
        }

        let redis_port: u16 = parse_or(&lookup, "REDIS_PORT", 6379)?;

        let debug_mode = lookup("DEBUG_MODE").unwrap_or_else(|| "false".to_string());

        let max_attempts: u32 =
            parse_or(&lookup, "PROBE_MAX_ATTEMPTS", RetryPolicy::DEFAULT_MAX_ATTEMPTS)?;
        let retry_delay_ms: u64 = parse_or(
            &lookup,
            "PROBE_RETRY_DELAY_MS",
            RetryPolicy::DEFAULT_DELAY.as_millis() as u64,
        )?;
        let probe_policy = RetryPolicy::new(max_attempts, Duration::from_millis(retry_delay_ms))
            .ok_or(ConfigError::Invalid("PROBE_MAX_ATTEMPTS"))?;

        let connect_timeout_ms: u64 = parse_or(&lookup, "PROBE_CONNECT_TIMEOUT_MS", 2000)?;
        if connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid("PROBE_CONNECT_TIMEOUT_MS"));
        }
        let probe_connect_timeout = Duration::from_millis(connect_timeout_ms);

        let request_timeout = probe_policy
            .worst_case(probe_connect_timeout)
            .and_then(|worst| worst.checked_add(REQUEST_TIMEOUT_HEADROOM))
            .ok_or(ConfigError::Invalid("PROBE_MAX_ATTEMPTS"))?
            .max(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            addr,
            app_env,
            variant,
            redis_host,
            redis_port,
            debug_mode,
            probe_policy,
            probe_connect_timeout,
            request_timeout,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
