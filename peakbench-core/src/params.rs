//! Run Parameters

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected run parameter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A parameter that must be positive was zero
    #[error("{name} must be a positive integer")]
    Zero {
        /// Parameter name
        name: &'static str,
    },
}

/// Parameters shared by every configuration of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunParameters {
    /// Arithmetic operations chained per element (loop count)
    pub ops_per_element: u32,
    /// Size of the data region the kernel works on, in MiB
    pub working_set_mb: u32,
    /// Times the timed kernel is resubmitted per measurement (cmd loop)
    pub submission_count: u32,
}

impl RunParameters {
    /// Build parameters, rejecting zeros.
    ///
    /// Upper bounds are not checked here; a backend that cannot represent a
    /// combination reports it as a failed measurement.
    pub fn new(
        ops_per_element: u32,
        working_set_mb: u32,
        submission_count: u32,
    ) -> Result<Self, ParameterError> {
        let params = Self {
            ops_per_element,
            working_set_mb,
            submission_count,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that every field is positive
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [
            ("ops_per_element", self.ops_per_element),
            ("working_set_mb", self.working_set_mb),
            ("submission_count", self.submission_count),
        ] {
            if value == 0 {
                return Err(ParameterError::Zero { name });
            }
        }
        Ok(())
    }
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            ops_per_element: 4,
            working_set_mb: 8,
            submission_count: 4,
        }
    }
}
