//! Configuration types for unzip-progress

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How per-archive completion is judged against the counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Require the synthetic root of an archive without a single top-level directory
    /// to be reported by the extractor before the archive counts as complete
    /// (default: false)
    ///
    /// The synthetic root is still counted in `directory.total`; when this is
    /// false and the root has not been reported, completion is judged as if that
    /// one directory were not expected.
    #[serde(default)]
    pub require_synthetic_root: bool,
}

/// Main configuration for [`crate::UnzipTracker`]
///
/// All fields have sensible defaults, so `Config::default()` works out of the box.
///
/// # Example
///
/// ```
/// use unzip_progress::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "progress_channel_capacity": 64 }"#).unwrap();
/// assert_eq!(config.progress_channel_capacity, 64);
/// assert_eq!(config.event_channel_capacity, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Capacity of the broadcast channel carrying [`crate::Event`]s to subscribers (default: 1000)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Buffer between an extractor and the reconciler during `run_extraction` (default: 500)
    #[serde(default = "default_progress_channel_capacity")]
    pub progress_channel_capacity: usize,

    /// Listings fetched at the same time by `load_listings` (default: 4)
    #[serde(default = "default_max_concurrent_listings")]
    pub max_concurrent_listings: usize,

    /// Archives handed to the extractor at the same time by `unzip_all` (default: 2)
    #[serde(default = "default_max_concurrent_extractions")]
    pub max_concurrent_extractions: usize,

    /// Completion policy
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            progress_channel_capacity: default_progress_channel_capacity(),
            max_concurrent_listings: default_max_concurrent_listings(),
            max_concurrent_extractions: default_max_concurrent_extractions(),
            completion: CompletionConfig::default(),
        }
    }
}

impl Config {
    /// Read a configuration persisted as JSON, rejecting values [`Config::validate`] refuses
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the configuration for values the tracker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(Error::Config {
                message: "event channel capacity must be greater than zero".into(),
                key: Some("event_channel_capacity".into()),
            });
        }
        if self.progress_channel_capacity == 0 {
            return Err(Error::Config {
                message: "progress channel capacity must be greater than zero".into(),
                key: Some("progress_channel_capacity".into()),
            });
        }
        if self.max_concurrent_listings == 0 {
            return Err(Error::Config {
                message: "max_concurrent_listings must be at least 1".into(),
                key: Some("max_concurrent_listings".into()),
            });
        }
        if self.max_concurrent_extractions == 0 {
            return Err(Error::Config {
                message: "max_concurrent_extractions must be at least 1".into(),
                key: Some("max_concurrent_extractions".into()),
            });
        }
        Ok(())
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_progress_channel_capacity() -> usize {
    500
}

fn default_max_concurrent_listings() -> usize {
    4
}

fn default_max_concurrent_extractions() -> usize {
    2
}
