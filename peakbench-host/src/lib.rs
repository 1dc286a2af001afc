#![warn(missing_docs)]
//! PeakBench Host - Reference CPU Backend
//!
//! A [`ComputeBackend`] that runs the peak kernels on the host CPU:
//! - chained multiply-add over scalar, vec4 and vec8 lanes
//! - int8 and bf16 four-wide dot products
//! - fp16/bf16 arithmetic through the `half` crate
//! - rayon worker pool, optionally pinned one thread per core
//!
//! Matrix-multiply configurations report "not supported": the host has no
//! matrix unit.

mod device;
mod kernel;
mod timer;

pub use timer::{Timer, pin_to_cpu};

use peakbench_core::{
    ArithmeticFormat, ComputeBackend, DeviceInfo, FAILED_SENTINEL, NOT_SUPPORTED_SENTINEL,
    ParallelMode, StorageFormat,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, warn};

/// Bytes in one working-set megabyte
const MIB: u64 = 1024 * 1024;

/// Operations counted per multiply-add (one multiply, one add)
const OPS_PER_MAD: u64 = 2;

/// Host backend errors
#[derive(Debug, Error)]
pub enum HostError {
    /// Rayon refused to build the worker pool
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),
}

/// Host backend options
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    /// Worker threads (0 = one per available core)
    pub threads: usize,
    /// Pin worker `i` to core `i`
    pub pin_threads: bool,
}

/// CPU implementation of the measurement contract
pub struct HostBackend {
    pool: ThreadPool,
    device: DeviceInfo,
}

impl HostBackend {
    /// Backend with one worker per core, unpinned
    pub fn new() -> Result<Self, HostError> {
        Self::with_options(HostOptions::default())
    }

    /// Backend with explicit options
    pub fn with_options(options: HostOptions) -> Result<Self, HostError> {
        let mut builder = ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .thread_name(|i| format!("peakbench-host-{}", i));

        if options.pin_threads {
            builder = builder.start_handler(|i| {
                if let Err(e) = pin_to_cpu(i) {
                    warn!("could not pin host worker {} to cpu {}: {}", i, i, e);
                }
            });
        }

        let pool = builder
            .build()
            .map_err(|e| HostError::PoolBuild(e.to_string()))?;
        let device = device::identify(pool.current_num_threads());

        Ok(Self { pool, device })
    }
}

impl ComputeBackend for HostBackend {
    fn identify(&self) -> DeviceInfo {
        self.device.clone()
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
        if ops_per_element == 0 || working_set_mb == 0 || submission_count == 0 {
            return FAILED_SENTINEL;
        }

        let Some(mut kernel) = kernel::select(storage, arithmetic, mode) else {
            return NOT_SUPPORTED_SENTINEL;
        };

        let width = kernel.width() as u64;
        let element_bytes = kernel.storage_bytes() as u64 * width;
        let elements = u64::from(working_set_mb) * MIB / element_bytes;
        let Ok(elements) = usize::try_from(elements) else {
            return FAILED_SENTINEL;
        };
        if elements == 0 || !kernel.prepare(elements) {
            warn!(
                "host backend could not allocate {} elements of {} bytes",
                elements, element_bytes
            );
            return FAILED_SENTINEL;
        }

        let ops = elements as f64
            * width as f64
            * f64::from(ops_per_element)
            * kernel::CHAIN as f64
            * OPS_PER_MAD as f64;

        let mut best_gops = 0.0f64;
        for submission in 0..submission_count {
            let timer = Timer::start();
            self.pool.install(|| kernel.submit(ops_per_element));
            let nanos = timer.stop();

            // ops per nanosecond == billions of ops per second
            let gops = ops / nanos as f64;
            debug!(
                "submission {}/{}: {} ns, {:.2} GOPS",
                submission + 1,
                submission_count,
                nanos,
                gops
            );
            best_gops = best_gops.max(gops);
        }

        best_gops as f32
    }
}
