use crate::{
    consts::{DEFAULT_MAX_CONCURRENCY, DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_TIMEOUT},
    errors::DasqError,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy of the light availability sampler.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of distinct random coordinates sampled per header. Confidence grows exponentially with it, independent of
    /// square size.
    pub sample_count: usize,
    /// Upper bound on samples in flight at once.
    pub max_concurrency: usize,
    /// Time budget of each individual sample.
    pub sample_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            sample_count: DEFAULT_SAMPLE_COUNT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            sample_timeout: DEFAULT_SAMPLE_TIMEOUT,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), DasqError> {
        if self.sample_count == 0 {
            return Err(DasqError::InvalidConfig("sample_count must be positive".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(DasqError::InvalidConfig("max_concurrency must be positive".to_string()));
        }
        if self.sample_timeout.is_zero() {
            return Err(DasqError::InvalidConfig("sample_timeout must be positive".to_string()));
        }

        Ok(())
    }
}

/// Policy of a getter backed by a local share store.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct StoreGetterConfig {
    /// Upper bound on rows fetched at once, while retrieving by namespace or reconstructing a square.
    pub max_concurrent_rows: usize,
}

impl Default for StoreGetterConfig {
    fn default() -> Self {
        StoreGetterConfig {
            max_concurrent_rows: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Policy of a getter falling back across several sources.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct CascadeConfig {
    /// Number of rounds over all sources before giving up.
    pub attempts: usize,
    /// Pause between two rounds.
    pub backoff: Duration,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        CascadeConfig {
            attempts: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

impl CascadeConfig {
    pub fn validate(&self) -> Result<(), DasqError> {
        if self.attempts == 0 {
            return Err(DasqError::InvalidConfig("attempts must be positive".to_string()));
        }

        Ok(())
    }
}
