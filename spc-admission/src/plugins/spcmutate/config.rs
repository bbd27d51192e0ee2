// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for the mutate-spc admission plugin.

use crate::wait::{DEFAULT_POLL_INTERVAL, DEFAULT_SYNC_TIMEOUT};
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to decode mutate spc plugin config: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid mutate spc plugin config: {0}")]
    Invalid(String),
}

/// Configuration provides configuration for the mutate-spc admission plugin.
///
/// Every field is optional in the JSON form; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// How often the namespace cache's synced flag is sampled.
    pub sync_poll_interval_millis: u64,
    /// How long a request waits for the namespace cache before it is denied.
    pub sync_timeout_millis: u64,
    /// Node selector applied to pods of unannotated namespaces.
    pub default_node_selector: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_poll_interval_millis: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            sync_timeout_millis: DEFAULT_SYNC_TIMEOUT.as_millis() as u64,
            default_node_selector: None,
        }
    }
}

impl Config {
    /// Decode and validate a JSON configuration.
    pub fn from_reader(reader: &mut dyn Read) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_poll_interval_millis == 0 {
            return Err(ConfigError::Invalid(
                "syncPollIntervalMillis must be greater than zero".to_string(),
            ));
        }
        if self.sync_timeout_millis == 0 {
            return Err(ConfigError::Invalid(
                "syncTimeoutMillis must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sync_poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync_poll_interval_millis)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync_poll_interval(), Duration::from_millis(100));
        assert_eq!(config.sync_timeout(), Duration::from_secs(10));
        assert!(config.default_node_selector.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_reader_partial() {
        let mut input = r#"{"syncTimeoutMillis": 2500, "defaultNodeSelector": "region=east"}"#.as_bytes();
        let config = Config::from_reader(&mut input).unwrap();

        assert_eq!(config.sync_poll_interval(), Duration::from_millis(100));
        assert_eq!(config.sync_timeout(), Duration::from_millis(2500));
        assert_eq!(config.default_node_selector.as_deref(), Some("region=east"));
    }

    #[test]
    fn test_from_reader_empty_object() {
        let mut input = "{}".as_bytes();
        assert_eq!(Config::from_reader(&mut input).unwrap(), Config::default());
    }

    #[test]
    fn test_from_reader_rejects_bad_input() {
        let mut input = r#"{"syncTimeoutMilis": 5}"#.as_bytes();
        assert!(matches!(
            Config::from_reader(&mut input),
            Err(ConfigError::Decode(_))
        ));

        let mut input = "not json".as_bytes();
        assert!(matches!(
            Config::from_reader(&mut input),
            Err(ConfigError::Decode(_))
        ));
    }

    #[test]
    fn test_from_reader_rejects_zero_durations() {
        let mut input = r#"{"syncPollIntervalMillis": 0}"#.as_bytes();
        let err = Config::from_reader(&mut input).unwrap_err();
        assert!(err.to_string().contains("syncPollIntervalMillis"));

        let mut input = r#"{"syncTimeoutMillis": 0}"#.as_bytes();
        let err = Config::from_reader(&mut input).unwrap_err();
        assert!(err.to_string().contains("syncTimeoutMillis"));
    }
}
