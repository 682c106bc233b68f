//! Operator configuration.
//!
//! The scheduler is configured from the environment (read by the binary
//! through clap); this module validates the raw values.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::matcher::PrefixMatcher;

/// Default per-call timeout for provider requests.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

/// Validated scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Name prefixes of managed groups, as configured (untrimmed).
    pub prefixes: Vec<String>,
    /// Upper bound for each individual provider call.
    pub call_timeout: Duration,
}

impl ScheduleConfig {
    /// Build a config from the raw `ASG_PREFIX` value and timeout.
    ///
    /// `None` means the variable was never set, which is fatal. A set but
    /// blank value is accepted and manages nothing.
    pub fn new(raw_prefixes: Option<&str>, call_timeout_secs: u64) -> Result<Self, ConfigError> {
        let raw = raw_prefixes.ok_or(ConfigError::MissingPrefixes)?;
        if call_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(call_timeout_secs));
        }
        Ok(Self {
            prefixes: parse_prefixes(raw),
            call_timeout: Duration::from_secs(call_timeout_secs),
        })
    }

    pub fn matcher(&self) -> PrefixMatcher {
        PrefixMatcher::new(self.prefixes.iter().cloned())
    }
}

/// Split a comma separated prefix list.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}
