//! Configuration management for Strata.
//!
//! Provides runtime configuration for the optimizer and the query session.
//! Options can be set on the structs directly or through their string keys
//! with [`StrataConfig::set`].

use common_error::{StrataError, StrataResult, value_err};
use serde::{Deserialize, Serialize};

/// Key enabling the metadata-only aggregate rewrite.
pub const METADATA_ONLY_QUERY_KEY: &str = "strata.optimizer.metadataOnly";
/// Key bounding the optimizer's fixpoint iterations.
pub const MAX_ITERATIONS_KEY: &str = "strata.optimizer.maxIterations";
/// Key enabling per-rule optimizer traces.
pub const OPTIMIZER_TRACE_KEY: &str = "strata.optimizer.trace";
/// Key holding the session time zone.
pub const SESSION_TIME_ZONE_KEY: &str = "strata.session.timeZone";

/// Default session time zone.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Global Strata configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Optimizer configuration.
    pub optimizer: OptimizerConfig,
    /// Session configuration.
    pub session: SessionConfig,
}

impl StrataConfig {
    /// Set an option by its string key.
    pub fn set(&mut self, key: &str, value: &str) -> StrataResult<()> {
        match key {
            METADATA_ONLY_QUERY_KEY => self.optimizer.metadata_only_query = parse_bool(key, value)?,
            MAX_ITERATIONS_KEY => {
                self.optimizer.max_iterations = value.trim().parse().map_err(|_| {
                    StrataError::invalid_parameter(format!(
                        "`{key}` expects a non-negative integer, got `{value}`"
                    ))
                })?;
            }
            OPTIMIZER_TRACE_KEY => self.optimizer.enable_trace = parse_bool(key, value)?,
            SESSION_TIME_ZONE_KEY => {
                let tz = value.trim();
                if tz.is_empty() {
                    value_err!("`{key}` must not be empty");
                }
                self.session.time_zone = tz.to_string();
            }
            _ => {
                return Err(StrataError::invalid_parameter(format!(
                    "unknown configuration key `{key}`"
                )));
            }
        }
        Ok(())
    }

    /// Read an option by its string key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            METADATA_ONLY_QUERY_KEY => Some(self.optimizer.metadata_only_query.to_string()),
            MAX_ITERATIONS_KEY => Some(self.optimizer.max_iterations.to_string()),
            OPTIMIZER_TRACE_KEY => Some(self.optimizer.enable_trace.to_string()),
            SESSION_TIME_ZONE_KEY => Some(self.session.time_zone.clone()),
            _ => None,
        }
    }

    /// Builder-style variant of [`StrataConfig::set`].
    pub fn with(mut self, key: &str, value: &str) -> StrataResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> StrataResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(StrataError::invalid_parameter(format!(
            "`{key}` expects a boolean, got `{value}`"
        ))),
    }
}

/// Optimizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Answer duplicate-insensitive aggregates over partition columns from
    /// partition metadata instead of scanning the table.
    ///
    /// Off by default: a partition that exists in the catalog but holds no
    /// rows still contributes its values to the rewritten result.
    pub metadata_only_query: bool,
    /// Maximum number of fixpoint iterations.
    pub max_iterations: usize,
    /// Whether to record before/after plans for every rule application.
    pub enable_trace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            metadata_only_query: false,
            max_iterations: 100,
            enable_trace: false,
        }
    }
}

impl OptimizerConfig {
    /// Enable or disable the metadata-only rewrite.
    pub fn with_metadata_only_query(mut self, enable: bool) -> Self {
        self.metadata_only_query = enable;
        self
    }

    /// Create a new config with the given max iterations.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Enable or disable tracing.
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }
}

/// Per-session settings consulted while planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Time zone used to interpret zone-less timestamps.
    pub time_zone: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Set the session time zone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }
}
