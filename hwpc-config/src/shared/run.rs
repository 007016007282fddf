use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Identity and output destination of one simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// Name of the run, used as the stem of every uploaded archive key.
    pub run_name: String,
    /// Bucket or directory the archives are uploaded into.
    pub output_bucket: String,
}

impl RunConfig {
    /// Validates run configuration settings.
    ///
    /// The run name becomes part of storage keys, so it must be non-empty and free of
    /// path separators.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.run_name.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "run.run_name".to_string(),
                constraint: "must not be empty".to_string(),
            });
        }

        if self.run_name.contains('/') {
            return Err(ValidationError::InvalidFieldValue {
                field: "run.run_name".to_string(),
                constraint: "must not contain `/`".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(run_name: &str) -> RunConfig {
        RunConfig {
            run_name: run_name.to_owned(),
            output_bucket: "hwpc-output".to_owned(),
        }
    }

    #[test]
    fn run_name_must_be_a_key_stem() {
        assert!(config("run42").validate().is_ok());
        assert!(config("").validate().is_err());
        assert!(config("a/b").validate().is_err());
    }
}
