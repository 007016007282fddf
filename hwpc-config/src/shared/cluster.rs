use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Worker pool configuration for a simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClusterConfig {
    /// Number of simulation tasks allowed to execute concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ClusterConfig {
    /// Default worker count.
    pub const DEFAULT_WORKERS: usize = 4;

    /// Validates cluster configuration settings.
    ///
    /// Ensures the worker count is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "cluster.workers".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    ClusterConfig::DEFAULT_WORKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_fails_validation() {
        let config = ClusterConfig { workers: 0 };

        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: ClusterConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.workers, ClusterConfig::DEFAULT_WORKERS);
    }
}
