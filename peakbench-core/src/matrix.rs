//! Configuration Matrix
//!
//! Compiled-in tables of every configuration a backend generation exposes.
//! Two generations exist and their enumerations do not line up: the current
//! one has seven numeric kinds and packings 1/4/256 (vec4 and dot-product
//! share packing 4); the legacy one has five storage kinds, four arithmetic
//! kinds and element packs 1/4/8. Each version also owns its wire codes, so
//! an FFI backend can translate a configuration without the orchestrator
//! knowing which generation it talks to.

use crate::{ArithmeticFormat, BenchmarkConfiguration, ParallelMode, StorageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ArithmeticFormat as A;
use crate::ParallelMode as M;
use crate::StorageFormat as S;

const fn cfg(label: &'static str, s: S, a: A, m: M) -> BenchmarkConfiguration {
    BenchmarkConfiguration::new(label, s, a, m)
}

static CURRENT_MATRIX: [BenchmarkConfiguration; 15] = [
    cfg("FP32", S::Fp32, A::Fp32, M::Scalar),
    cfg("FP32 vec4", S::Fp32, A::Fp32, M::Vec4),
    cfg("FP16", S::Fp32, A::Fp16, M::Scalar),
    cfg("FP16 vec4", S::Fp32, A::Fp16, M::Vec4),
    cfg("FP16 mm", S::Fp16, A::Fp16, M::MatrixMultiply),
    cfg("FP64", S::Fp64, A::Fp64, M::Scalar),
    cfg("FP64 vec4", S::Fp64, A::Fp64, M::Vec4),
    cfg("INT32", S::Int32, A::Int32, M::Scalar),
    cfg("INT32 vec4", S::Int32, A::Int32, M::Vec4),
    cfg("INT16", S::Int32, A::Int16, M::Scalar),
    cfg("INT16 vec4", S::Int32, A::Int16, M::Vec4),
    cfg("INT8 dp", S::Int32, A::Int8, M::DotProduct),
    cfg("INT8 mm", S::Int32, A::Int8, M::MatrixMultiply),
    cfg("BF16 dp", S::Fp32, A::Bf16, M::DotProduct),
    cfg("BF16 mm", S::Fp32, A::Bf16, M::MatrixMultiply),
];

static LEGACY_MATRIX: [BenchmarkConfiguration; 15] = [
    cfg("FP32", S::Fp32, A::Fp32, M::Scalar),
    cfg("FP32 vec4", S::Fp32, A::Fp32, M::Vec4),
    cfg("FP32 vec8", S::Fp32, A::Fp32, M::Vec8),
    cfg("FP16p vec4", S::Fp16Packed, A::Fp32, M::Vec4),
    cfg("FP16p vec8", S::Fp16Packed, A::Fp32, M::Vec8),
    cfg("FP16s", S::Fp16, A::Fp32, M::Scalar),
    cfg("FP16s vec4", S::Fp16, A::Fp32, M::Vec4),
    cfg("FP16s vec8", S::Fp16, A::Fp32, M::Vec8),
    cfg("FP16sa", S::Fp16, A::Fp16, M::Scalar),
    cfg("FP16sa vec4", S::Fp16, A::Fp16, M::Vec4),
    cfg("FP16sa vec8", S::Fp16, A::Fp16, M::Vec8),
    cfg("FP64", S::Fp64, A::Fp64, M::Scalar),
    cfg("FP64 vec4", S::Fp64, A::Fp64, M::Vec4),
    cfg("INT32", S::Int32, A::Int32, M::Scalar),
    cfg("INT32 vec4", S::Int32, A::Int32, M::Vec4),
];

/// Backend generation a configuration matrix belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixVersion {
    /// fp32/fp16/fp64/int32/int16/int8/bf16 with scalar, vec4, dot-product
    /// and matrix-multiply modes
    #[default]
    Current,
    /// fp32/fp16-packed/fp16/fp64/int32 storage with scalar, vec4 and vec8
    Legacy,
}

impl MatrixVersion {
    /// Every known generation
    pub const ALL: [MatrixVersion; 2] = [MatrixVersion::Current, MatrixVersion::Legacy];

    /// The ordered configurations of this generation.
    ///
    /// Always returns the same sequence; callers may enumerate it as often as
    /// they like.
    pub fn entries(self) -> &'static [BenchmarkConfiguration] {
        match self {
            MatrixVersion::Current => &CURRENT_MATRIX,
            MatrixVersion::Legacy => &LEGACY_MATRIX,
        }
    }

    /// Short lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            MatrixVersion::Current => "current",
            MatrixVersion::Legacy => "legacy",
        }
    }

    /// Wire code for a storage format, `None` if this generation lacks it
    pub fn storage_code(self, storage: StorageFormat) -> Option<i32> {
        match self {
            MatrixVersion::Current => match storage {
                S::Fp32 => Some(0),
                S::Fp16 => Some(1),
                S::Fp64 => Some(2),
                S::Int32 => Some(3),
                S::Int16 => Some(4),
                S::Int8 => Some(5),
                S::Bf16 => Some(6),
                S::Fp16Packed => None,
            },
            MatrixVersion::Legacy => match storage {
                S::Fp32 => Some(0),
                S::Fp16Packed => Some(1),
                S::Fp16 => Some(2),
                S::Fp64 => Some(3),
                S::Int32 => Some(4),
                S::Int16 | S::Int8 | S::Bf16 => None,
            },
        }
    }

    /// Wire code for an arithmetic format, `None` if this generation lacks it
    pub fn arithmetic_code(self, arithmetic: ArithmeticFormat) -> Option<i32> {
        match self {
            MatrixVersion::Current => Some(match arithmetic {
                A::Fp32 => 0,
                A::Fp16 => 1,
                A::Fp64 => 2,
                A::Int32 => 3,
                A::Int16 => 4,
                A::Int8 => 5,
                A::Bf16 => 6,
            }),
            MatrixVersion::Legacy => match arithmetic {
                A::Fp32 => Some(0),
                A::Fp16 => Some(1),
                A::Fp64 => Some(2),
                A::Int32 => Some(3),
                A::Int16 | A::Int8 | A::Bf16 => None,
            },
        }
    }

    /// Wire code for a parallel mode, `None` if this generation lacks it.
    ///
    /// The current generation encodes the packing width itself, the legacy
    /// generation an index into its element packs.
    pub fn mode_code(self, mode: ParallelMode) -> Option<i32> {
        match self {
            MatrixVersion::Current => match mode {
                M::Scalar => Some(1),
                M::Vec4 | M::DotProduct => Some(4),
                M::MatrixMultiply => Some(256),
                M::Vec8 => None,
            },
            MatrixVersion::Legacy => match mode {
                M::Scalar => Some(0),
                M::Vec4 => Some(1),
                M::Vec8 => Some(2),
                M::DotProduct | M::MatrixMultiply => None,
            },
        }
    }

    /// Look up a configuration by label
    pub fn find(self, label: &str) -> Option<&'static BenchmarkConfiguration> {
        self.entries().iter().find(|c| c.label == label)
    }
}

impl fmt::Display for MatrixVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown matrix version name
#[derive(Debug, Clone, Error)]
#[error("Unknown matrix version: {0} (expected current or legacy)")]
pub struct ParseMatrixVersionError(pub String);

impl FromStr for MatrixVersion {
    type Err = ParseMatrixVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" | "v2" => Ok(MatrixVersion::Current),
            "legacy" | "v1" => Ok(MatrixVersion::Legacy),
            other => Err(ParseMatrixVersionError(other.to_string())),
        }
    }
}

/// Entries of the default (current) generation
pub fn entries() -> &'static [BenchmarkConfiguration] {
    MatrixVersion::default().entries()
}
