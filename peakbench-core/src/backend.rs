//! Compute Backend Contract

use crate::{ArithmeticFormat, MatrixVersion, ParallelMode, StorageFormat};
use serde::{Deserialize, Serialize};

/// Placeholder for identification strings a backend cannot determine
pub const UNKNOWN: &str = "unknown";

/// Descriptive strings identifying the device under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Board/platform name
    pub platform_name: String,
    /// Version of the compute library the backend is built on
    pub library_version: String,
    /// Device name
    pub device_name: String,
    /// Compute API version
    pub api_version: String,
    /// Driver version
    pub driver_version: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            platform_name: UNKNOWN.to_string(),
            library_version: UNKNOWN.to_string(),
            device_name: UNKNOWN.to_string(),
            api_version: UNKNOWN.to_string(),
            driver_version: UNKNOWN.to_string(),
        }
    }
}

/// Executes one timed kernel per call and reports its throughput.
///
/// `measure` takes `&mut self`: implementations are driven sequentially and
/// never see two calls in flight. A backend that has to cross threads needs
/// `Send`, not `Sync`.
pub trait ComputeBackend {
    /// Static identification, queried once at startup
    fn identify(&self) -> DeviceInfo;

    /// Configuration matrix generation this backend speaks
    fn matrix_version(&self) -> MatrixVersion {
        MatrixVersion::Current
    }

    /// Run one measurement.
    ///
    /// Returns throughput in billions of operations per second, or
    /// [`FAILED_SENTINEL`](crate::FAILED_SENTINEL) /
    /// [`NOT_SUPPORTED_SENTINEL`](crate::NOT_SUPPORTED_SENTINEL).
    fn measure(
        &mut self,
        ops_per_element: u32,
        working_set_mb: u32,
        submission_count: u32,
        storage: StorageFormat,
        arithmetic: ArithmeticFormat,
        mode: ParallelMode,
    ) -> f32;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn identify(&self) -> DeviceInfo {
        (**self).identify()
    }

    fn matrix_version(&self) -> MatrixVersion {
        (**self).matrix_version()
    }

    fn measure(
        &mut self,
        ops_per_element: u32,
        working_set_mb: u32,
        submission_count: u32,
        storage: StorageFormat,
        arithmetic: ArithmeticFormat,
        mode: ParallelMode,
    ) -> f32 {
        (**self).measure(
            ops_per_element,
            working_set_mb,
            submission_count,
            storage,
            arithmetic,
            mode,
        )
    }
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for &mut B {
    fn identify(&self) -> DeviceInfo {
        (**self).identify()
    }

    fn matrix_version(&self) -> MatrixVersion {
        (**self).matrix_version()
    }

    fn measure(
        &mut self,
        ops_per_element: u32,
        working_set_mb: u32,
        submission_count: u32,
        storage: StorageFormat,
        arithmetic: ArithmeticFormat,
        mode: ParallelMode,
    ) -> f32 {
        (**self).measure(
            ops_per_element,
            working_set_mb,
            submission_count,
            storage,
            arithmetic,
            mode,
        )
    }
}
