//! Uploader configuration.

use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};
use crate::retry::RetryConfig;

/// Configuration for one upload run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Fixed worker-pool size. Must be at least 1.
    pub worker_count: usize,
    /// Emit a progress line every this many completions.
    pub progress_every: u64,
    /// Capacity of the completion-event channel feeding the aggregator.
    pub event_capacity: usize,
    /// Retry policy for object-store writes.
    pub retry: RetryConfig,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            progress_every: 50,
            event_capacity: 64,
            retry: RetryConfig::default(),
        }
    }
}

impl UploaderConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> UploadResult<()> {
        if self.worker_count < 1 {
            return Err(UploadError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.progress_every < 1 {
            return Err(UploadError::InvalidConfig(
                "progress_every must be at least 1".to_string(),
            ));
        }
        if self.event_capacity < 1 {
            return Err(UploadError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = UploaderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.progress_every, 50);
    }

    #[test]
    fn zero_workers_rejected() {
        let config = UploaderConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UploadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_progress_interval_rejected() {
        let config = UploaderConfig {
            progress_every: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
