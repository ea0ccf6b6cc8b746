//! Timeout overrides loaded from a JSON file
//!
//! ```json
//! {
//!   "poll_interval_secs": 10,
//!   "timeouts": {
//!     "memorydb-snapshot": 10800,
//!     "globalaccelerator-accelerator": 1800
//!   }
//! }
//! ```
//!
//! Kinds missing from `timeouts` keep the waiter's own default.

use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use settle_common::ResourceKind;
use settle_common::defaults::default_timeout;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Longest timeout a file may set, one day
const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON configuration
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Parsed but rejected by validation
    #[error("Invalid config file '{path}': {message}")]
    Invalid { path: String, message: String },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-resource wait timeouts and polling interval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, garde::Validate)]
#[serde(deny_unknown_fields)]
pub struct TimeoutOverrides {
    /// Delay between two status checks, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 1, max = 3600))]
    pub poll_interval_secs: Option<u64>,

    /// Timeout in seconds, keyed by resource kind
    #[serde(default)]
    #[garde(custom(validate_timeouts))]
    pub timeouts: BTreeMap<ResourceKind, u64>,
}

fn validate_timeouts(timeouts: &BTreeMap<ResourceKind, u64>, _ctx: &()) -> garde::Result {
    for (kind, secs) in timeouts {
        if *secs == 0 || *secs > MAX_TIMEOUT_SECS {
            return Err(garde::Error::new(format!(
                "timeout for {} must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {secs}",
                kind.key()
            )));
        }
    }
    Ok(())
}

impl TimeoutOverrides {
    /// Load and validate overrides from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(display.clone(), e))?;
        Self::from_json(&content, &display)
    }

    /// Parse and validate overrides; `origin` names the source in errors.
    pub fn from_json(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let overrides: TimeoutOverrides =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.to_string(),
                source,
            })?;

        garde::Validate::validate(&overrides).map_err(|report| ConfigError::Invalid {
            path: origin.to_string(),
            message: report.to_string(),
        })?;

        Ok(overrides)
    }

    /// The configured timeout for `kind`, if any
    pub fn timeout_for(&self, kind: ResourceKind) -> Option<Duration> {
        self.timeouts.get(&kind).copied().map(Duration::from_secs)
    }

    /// The timeout that applies to the primary wait of `kind`
    pub fn effective_timeout(&self, kind: ResourceKind) -> Duration {
        self.timeout_for(kind).unwrap_or_else(|| default_timeout(kind))
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }

    /// Wait options for one resource kind, sharing `cancel` with every other wait.
    pub fn wait_options(&self, kind: ResourceKind, cancel: &CancellationToken) -> WaitOptions {
        let mut options = WaitOptions::default().with_cancellation(cancel.clone());
        if let Some(timeout) = self.timeout_for(kind) {
            options = options.with_timeout(timeout);
        }
        if let Some(interval) = self.poll_interval() {
            options = options.with_poll_interval(interval);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"poll_interval_secs": 10, "timeouts": {{"memorydb-snapshot": 10800}}}}"#
        )
        .unwrap();

        let overrides = TimeoutOverrides::load(file.path()).unwrap();
        assert_eq!(overrides.poll_interval(), Some(Duration::from_secs(10)));
        assert_eq!(
            overrides.timeout_for(ResourceKind::MemorydbSnapshot),
            Some(Duration::from_secs(10800))
        );
        assert_eq!(overrides.timeout_for(ResourceKind::MemorydbUser), None);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let overrides = TimeoutOverrides::from_json("{}", "inline").unwrap();
        assert_eq!(overrides, TimeoutOverrides::default());
        for kind in ResourceKind::ALL {
            assert_eq!(overrides.effective_timeout(kind), default_timeout(kind));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = TimeoutOverrides::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = TimeoutOverrides::from_json(r#"{"poll_interval": 5}"#, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_resource_kind_is_rejected() {
        let err =
            TimeoutOverrides::from_json(r#"{"timeouts": {"ec2-instance": 60}}"#, "inline")
                .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_values_fail_validation() {
        let err = TimeoutOverrides::from_json(r#"{"poll_interval_secs": 0}"#, "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = TimeoutOverrides::from_json(r#"{"timeouts": {"memorydb-acl": 0}}"#, "t.json")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("t.json"), "{message}");
        assert!(message.contains("memorydb-acl"), "{message}");
    }

    #[test]
    fn test_wait_options_only_override_configured_kinds() {
        let overrides = TimeoutOverrides::from_json(
            r#"{"poll_interval_secs": 2, "timeouts": {"memorydb-cluster": 60}}"#,
            "inline",
        )
        .unwrap();
        let cancel = CancellationToken::new();

        let cluster = overrides.wait_options(ResourceKind::MemorydbCluster, &cancel);
        assert_eq!(cluster.timeout, Some(Duration::from_secs(60)));
        assert_eq!(cluster.poll_interval, Some(Duration::from_secs(2)));
        assert!(cluster.cancel.is_some());

        let user = overrides.wait_options(ResourceKind::MemorydbUser, &cancel);
        assert_eq!(user.timeout, None);
    }
}
