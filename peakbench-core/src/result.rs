//! Measurement Outcomes
//!
//! Backends report a single `f32`: a throughput in GOPS, or one of two
//! reserved sentinel values. Everything downstream of the backend works with
//! [`BenchmarkResult`] instead of the raw number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value a backend returns when the measurement was attempted but failed
pub const FAILED_SENTINEL: f32 = -1.0;

/// Raw value a backend returns when the configuration cannot run on the device
pub const NOT_SUPPORTED_SENTINEL: f32 = -233.0;

/// Outcome of one configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "gops", rename_all = "kebab-case")]
pub enum BenchmarkResult {
    /// Billions of operations per second (never negative)
    Throughput(f64),
    /// The device/driver cannot implement this configuration
    NotSupported,
    /// The measurement was attempted but did not complete
    Failed,
}

/// Result kind without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultStatus {
    /// A throughput value was produced
    Measured,
    /// Configuration unsupported
    NotSupported,
    /// Measurement failed
    Failed,
}

impl BenchmarkResult {
    /// Classify a raw backend value.
    ///
    /// Returns `None` for values a conforming backend never produces: NaN,
    /// infinities and negative numbers other than the two sentinels.
    pub fn try_from_raw(raw: f32) -> Option<Self> {
        if raw == FAILED_SENTINEL {
            Some(BenchmarkResult::Failed)
        } else if raw == NOT_SUPPORTED_SENTINEL {
            Some(BenchmarkResult::NotSupported)
        } else if raw.is_finite() && raw >= 0.0 {
            // abs() folds -0.0 into 0.0
            Some(BenchmarkResult::Throughput(f64::from(raw.abs())))
        } else {
            None
        }
    }

    /// Classify a raw backend value, treating non-conforming values as `Failed`
    pub fn from_raw(raw: f32) -> Self {
        Self::try_from_raw(raw).unwrap_or(BenchmarkResult::Failed)
    }

    /// Throughput in GOPS if measured
    pub fn gops(&self) -> Option<f64> {
        match *self {
            BenchmarkResult::Throughput(v) => Some(v),
            _ => None,
        }
    }

    /// Payload-free kind
    pub fn status(&self) -> ResultStatus {
        match self {
            BenchmarkResult::Throughput(_) => ResultStatus::Measured,
            BenchmarkResult::NotSupported => ResultStatus::NotSupported,
            BenchmarkResult::Failed => ResultStatus::Failed,
        }
    }

    /// Render for display: `"12.50"`, `"not supported"` or `"error"`
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl From<f32> for BenchmarkResult {
    fn from(raw: f32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Ties round away from zero; `{:.2}` alone rounds them to even.
            // `{:.2}` never switches to exponent notation.
            BenchmarkResult::Throughput(v) => write!(f, "{:.2}", (v * 100.0).round() / 100.0),
            BenchmarkResult::NotSupported => f.write_str("not supported"),
            BenchmarkResult::Failed => f.write_str("error"),
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResultStatus::Measured => "measured",
            ResultStatus::NotSupported => "not-supported",
            ResultStatus::Failed => "failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(BenchmarkResult::from_raw(-1.0), BenchmarkResult::Failed);
        assert_eq!(
            BenchmarkResult::from_raw(-233.0),
            BenchmarkResult::NotSupported
        );
        assert_eq!(
            BenchmarkResult::from_raw(12.5),
            BenchmarkResult::Throughput(12.5)
        );
    }

    #[test]
    fn test_zero_is_valid_throughput() {
        let result = BenchmarkResult::from_raw(0.0);
        assert_eq!(result, BenchmarkResult::Throughput(0.0));
        assert_eq!(result.display(), "0.00");
        assert_eq!(result.status(), ResultStatus::Measured);
        assert_eq!(BenchmarkResult::from_raw(-0.0).display(), "0.00");
    }

    #[test]
    fn test_non_conforming_values() {
        for raw in [-2.0, -0.5, -233.5, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(BenchmarkResult::try_from_raw(raw), None, "{raw}");
            assert_eq!(BenchmarkResult::from_raw(raw), BenchmarkResult::Failed);
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(BenchmarkResult::Throughput(12.5).to_string(), "12.50");
        assert_eq!(BenchmarkResult::Throughput(0.004).to_string(), "0.00");
        assert_eq!(BenchmarkResult::Throughput(2.345678).to_string(), "2.35");
        assert_eq!(BenchmarkResult::Throughput(0.125).to_string(), "0.13");
        assert_eq!(BenchmarkResult::Throughput(12.625).to_string(), "12.63");
        assert_eq!(BenchmarkResult::from_raw(1.375).display(), "1.38");
        assert_eq!(BenchmarkResult::from_raw(0.875).display(), "0.88");
        assert_eq!(BenchmarkResult::NotSupported.to_string(), "not supported");
        assert_eq!(BenchmarkResult::Failed.to_string(), "error");
    }

    #[test]
    fn test_large_values_stay_positional() {
        let rendered = BenchmarkResult::Throughput(123_456_789.126).display();
        assert_eq!(rendered, "123456789.13");
        assert!(!rendered.contains('e'));

        let rendered = BenchmarkResult::from_raw(1.0e12).display();
        assert!(!rendered.contains('e'));
        assert!(rendered.ends_with(".00"));
    }

    #[test]
    fn test_gops() {
        assert_eq!(BenchmarkResult::Throughput(3.0).gops(), Some(3.0));
        assert_eq!(BenchmarkResult::Failed.gops(), None);
        assert_eq!(BenchmarkResult::NotSupported.gops(), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&BenchmarkResult::Throughput(1.5)).unwrap();
        assert_eq!(json, r#"{"status":"throughput","gops":1.5}"#);
        let json = serde_json::to_string(&BenchmarkResult::NotSupported).unwrap();
        assert_eq!(json, r#"{"status":"not-supported"}"#);
    }
}
