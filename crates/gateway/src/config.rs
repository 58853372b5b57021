//! Typed runtime configuration: the environment contract from `spec.md` §6,
//! assembled by hand the way the teacher's `orchestrator`/`tls.rs` config
//! structs read `std::env::var` directly rather than pulling in a config
//! framework.

use std::time::Duration;

use thiserror::Error;

const DEFAULT_TOP_K: usize = 10;
const DEFAULT_MIN_EVIDENCE: u32 = 2;
const DEFAULT_POLICY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_DEADLINE_MS: u64 = 15_000;
const DEFAULT_STEP_UP_TTL_S: u64 = 300;
const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Failure constructing a [`GatewayConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was unset.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    /// A variable was set but did not parse as its expected type.
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The unparseable raw value.
        value: String,
    },
}

/// Everything the gateway needs to run, covering exactly the options named
/// in `spec.md` §6.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Connection string for the backing store. Not consumed by
    /// `InMemoryStore`; carried for a real backend to read.
    pub store_url: String,
    /// Base URL of the external policy engine, if one is configured; absent
    /// means the embedded local rule engine is used instead.
    pub policy_engine_url: Option<String>,
    /// Shared secret the gateway signs and verifies bearer tokens with.
    pub token_signing_key: String,
    /// Tenant this gateway instance serves.
    pub tenant: String,
    /// Default `top_k` when a request omits it.
    pub default_top_k: usize,
    /// Default `min_evidence` when a request omits it.
    pub default_min_evidence: u32,
    /// Per-evaluation policy timeout, milliseconds.
    pub policy_timeout_ms: u64,
    /// Whole-request deadline, milliseconds.
    pub request_deadline_ms: u64,
    /// Step-up assertion TTL, seconds.
    pub step_up_ttl_s: u64,
    /// Embedding vector dimension.
    pub embedding_dim: usize,
}

impl GatewayConfig {
    /// Build configuration from the process environment, falling back to
    /// the documented recommendations in `spec.md` §5/§6 for unset values.
    /// `TOKEN_SIGNING_KEY` has no safe default and must be set explicitly.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_url: env_or("STORE_URL", "memory://local"),
            policy_engine_url: non_empty(std::env::var("POLICY_ENGINE_URL").ok()),
            token_signing_key: std::env::var("TOKEN_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("TOKEN_SIGNING_KEY"))?,
            tenant: env_or("TENANT", "default"),
            default_top_k: env_parsed_or("DEFAULT_TOP_K", DEFAULT_TOP_K)?,
            default_min_evidence: env_parsed_or("DEFAULT_MIN_EVIDENCE", DEFAULT_MIN_EVIDENCE)?,
            policy_timeout_ms: env_parsed_or("POLICY_TIMEOUT_MS", DEFAULT_POLICY_TIMEOUT_MS)?,
            request_deadline_ms: env_parsed_or(
                "REQUEST_DEADLINE_MS",
                DEFAULT_REQUEST_DEADLINE_MS,
            )?,
            step_up_ttl_s: env_parsed_or("STEP_UP_TTL_S", DEFAULT_STEP_UP_TTL_S)?,
            embedding_dim: env_parsed_or("EMBEDDING_DIM", DEFAULT_EMBEDDING_DIM)?,
        })
    }

    /// A deterministic configuration for tests and local examples, backed
    /// by the embedded local policy engine (`SPEC_FULL.md` §C.5).
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            store_url: "memory://test".to_string(),
            policy_engine_url: None,
            token_signing_key: "test-signing-key-not-for-production".to_string(),
            tenant: "acme".to_string(),
            default_top_k: DEFAULT_TOP_K,
            default_min_evidence: DEFAULT_MIN_EVIDENCE,
            policy_timeout_ms: DEFAULT_POLICY_TIMEOUT_MS,
            request_deadline_ms: DEFAULT_REQUEST_DEADLINE_MS,
            step_up_ttl_s: DEFAULT_STEP_UP_TTL_S,
            embedding_dim: 8,
        }
    }

    /// [`Self::policy_timeout_ms`] as a [`Duration`].
    #[must_use]
    pub fn policy_timeout(&self) -> Duration {
        Duration::from_millis(self.policy_timeout_ms)
    }

    /// [`Self::request_deadline_ms`] as a [`Duration`].
    #[must_use]
    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn env_or(name: &'static str, default: &str) -> String {
    std::env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_parsed_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(raw) if !raw.is_empty() => {
            raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_tests_config_has_every_field_set() {
        let cfg = GatewayConfig::for_tests();
        assert_eq!(cfg.default_top_k, DEFAULT_TOP_K);
        assert_eq!(cfg.step_up_ttl_s, DEFAULT_STEP_UP_TTL_S);
        assert!(cfg.policy_engine_url.is_none());
    }

    #[test]
    fn durations_convert_from_millis() {
        let cfg = GatewayConfig::for_tests();
        assert_eq!(cfg.policy_timeout(), Duration::from_millis(DEFAULT_POLICY_TIMEOUT_MS));
        assert_eq!(cfg.request_deadline(), Duration::from_millis(DEFAULT_REQUEST_DEADLINE_MS));
    }
}
