#![warn(missing_docs)]
//! PeakBench Core - Measurement Contract
//!
//! This crate defines what a peak-throughput run is made of:
//! - `BenchmarkConfiguration`: storage format × arithmetic format × parallel mode
//! - `MatrixVersion`: versioned, compiled-in tables of configurations
//! - `RunParameters`: loop count, working-set size and submission count
//! - `BenchmarkResult`: a throughput value or a sentinel outcome
//! - `ComputeBackend` / `ResultSink`: the collaborators an orchestrator drives

mod backend;
mod matrix;
mod params;
mod result;
mod sink;

pub use backend::{ComputeBackend, DeviceInfo, UNKNOWN};
pub use matrix::{MatrixVersion, ParseMatrixVersionError, entries};
pub use params::{ParameterError, RunParameters};
pub use result::{BenchmarkResult, FAILED_SENTINEL, NOT_SUPPORTED_SENTINEL, ResultStatus};
pub use sink::{ResultBoard, ResultSink};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit layout used to hold operands in device memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageFormat {
    /// IEEE 754 binary32
    Fp32,
    /// IEEE 754 binary16, one value per storage slot
    Fp16,
    /// IEEE 754 binary16, packed in pairs into 32-bit slots
    Fp16Packed,
    /// IEEE 754 binary64
    Fp64,
    /// 32-bit two's complement integer
    Int32,
    /// 16-bit two's complement integer
    Int16,
    /// 8-bit two's complement integer
    Int8,
    /// bfloat16
    Bf16,
}

impl StorageFormat {
    /// Size of one scalar element in bytes
    pub const fn size_bytes(self) -> usize {
        match self {
            StorageFormat::Fp64 => 8,
            StorageFormat::Fp32 | StorageFormat::Int32 => 4,
            StorageFormat::Fp16
            | StorageFormat::Fp16Packed
            | StorageFormat::Int16
            | StorageFormat::Bf16 => 2,
            StorageFormat::Int8 => 1,
        }
    }

    /// Short lowercase name (matches the serde representation)
    pub const fn name(self) -> &'static str {
        match self {
            StorageFormat::Fp32 => "fp32",
            StorageFormat::Fp16 => "fp16",
            StorageFormat::Fp16Packed => "fp16-packed",
            StorageFormat::Fp64 => "fp64",
            StorageFormat::Int32 => "int32",
            StorageFormat::Int16 => "int16",
            StorageFormat::Int8 => "int8",
            StorageFormat::Bf16 => "bf16",
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric domain the compute instructions operate in
///
/// Independent of [`StorageFormat`]: a backend may be asked to load fp32 data
/// and compute in fp16, which measures conversion-inclusive throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArithmeticFormat {
    /// IEEE 754 binary32
    Fp32,
    /// IEEE 754 binary16
    Fp16,
    /// IEEE 754 binary64
    Fp64,
    /// 32-bit integer
    Int32,
    /// 16-bit integer
    Int16,
    /// 8-bit integer
    Int8,
    /// bfloat16
    Bf16,
}

impl ArithmeticFormat {
    /// Short lowercase name (matches the serde representation)
    pub const fn name(self) -> &'static str {
        match self {
            ArithmeticFormat::Fp32 => "fp32",
            ArithmeticFormat::Fp16 => "fp16",
            ArithmeticFormat::Fp64 => "fp64",
            ArithmeticFormat::Int32 => "int32",
            ArithmeticFormat::Int16 => "int16",
            ArithmeticFormat::Int8 => "int8",
            ArithmeticFormat::Bf16 => "bf16",
        }
    }
}

impl fmt::Display for ArithmeticFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data-parallel width/strategy used per instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParallelMode {
    /// One lane
    Scalar,
    /// Four-lane short vector
    Vec4,
    /// Eight-lane wide vector
    Vec8,
    /// Four-wide dot product on a specialized instruction
    DotProduct,
    /// 16×16 matrix-multiply tile on a specialized instruction
    MatrixMultiply,
}

impl ParallelMode {
    /// Number of elements processed per instruction
    pub const fn width(self) -> usize {
        match self {
            ParallelMode::Scalar => 1,
            ParallelMode::Vec4 | ParallelMode::DotProduct => 4,
            ParallelMode::Vec8 => 8,
            ParallelMode::MatrixMultiply => 256,
        }
    }

    /// Short lowercase name (matches the serde representation)
    pub const fn name(self) -> &'static str {
        match self {
            ParallelMode::Scalar => "scalar",
            ParallelMode::Vec4 => "vec4",
            ParallelMode::Vec8 => "vec8",
            ParallelMode::DotProduct => "dot-product",
            ParallelMode::MatrixMultiply => "matrix-multiply",
        }
    }
}

impl fmt::Display for ParallelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One measurement point of the configuration matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BenchmarkConfiguration {
    /// Fixed display string, unique within a matrix (e.g. `"FP16 dp"`)
    pub label: &'static str,
    /// How operands are stored
    pub storage: StorageFormat,
    /// How operands are computed on
    pub arithmetic: ArithmeticFormat,
    /// Parallel width/strategy
    pub mode: ParallelMode,
}

impl BenchmarkConfiguration {
    /// Create a configuration (usable in `static` tables)
    pub const fn new(
        label: &'static str,
        storage: StorageFormat,
        arithmetic: ArithmeticFormat,
        mode: ParallelMode,
    ) -> Self {
        Self {
            label,
            storage,
            arithmetic,
            mode,
        }
    }
}

impl fmt::Display for BenchmarkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} storage, {} arithmetic, {})",
            self.label, self.storage, self.arithmetic, self.mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_widths() {
        assert_eq!(ParallelMode::Scalar.width(), 1);
        assert_eq!(ParallelMode::Vec4.width(), 4);
        assert_eq!(ParallelMode::Vec8.width(), 8);
        assert_eq!(ParallelMode::DotProduct.width(), 4);
        assert_eq!(ParallelMode::MatrixMultiply.width(), 256);
    }

    #[test]
    fn test_storage_sizes() {
        assert_eq!(StorageFormat::Fp64.size_bytes(), 8);
        assert_eq!(StorageFormat::Fp32.size_bytes(), 4);
        assert_eq!(StorageFormat::Fp16Packed.size_bytes(), 2);
        assert_eq!(StorageFormat::Int8.size_bytes(), 1);
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&StorageFormat::Fp16Packed).unwrap();
        assert_eq!(json, "\"fp16-packed\"");
        let json = serde_json::to_string(&ParallelMode::MatrixMultiply).unwrap();
        assert_eq!(json, format!("\"{}\"", ParallelMode::MatrixMultiply));
        let json = serde_json::to_string(&ArithmeticFormat::Bf16).unwrap();
        assert_eq!(json, "\"bf16\"");
    }

    #[test]
    fn test_configuration_display() {
        let cfg = BenchmarkConfiguration::new(
            "INT8 dp",
            StorageFormat::Int32,
            ArithmeticFormat::Int8,
            ParallelMode::DotProduct,
        );
        assert_eq!(
            cfg.to_string(),
            "INT8 dp (int32 storage, int8 arithmetic, dot-product)"
        );
    }
}
