#![warn(missing_docs)]
//! # PeakBench
//!
//! Measures the peak arithmetic throughput of a compute device across a fixed
//! matrix of storage formats, arithmetic formats and parallel widths.
//!
//! - **Configuration Matrix**: two compiled-in generations (current and legacy),
//!   each with its own wire codes for FFI backends
//! - **Pluggable Backends**: anything implementing [`ComputeBackend`]; a rayon
//!   based host CPU backend ships in [`HostBackend`]
//! - **One Run at a Time**: an RAII guard rejects a second run while one is in
//!   flight
//! - **Failures Are Data**: a failed, unsupported or panicking configuration
//!   becomes a cell, and the run moves on
//! - **Reports**: human table, JSON and CSV
//!
//! ## Quick Start
//!
//! ```ignore
//! use peakbench::prelude::*;
//!
//! let orchestrator = Orchestrator::new(OrchestratorConfig::default());
//! let mut backend = HostBackend::new()?;
//! let mut board = ResultBoard::new();
//!
//! orchestrator.run_all(
//!     RunParameters::default(),
//!     MatrixVersion::Current.entries(),
//!     &mut backend,
//!     &mut board,
//! )?;
//!
//! for (configuration, result) in board.cells() {
//!     println!("{:<12} {}", configuration.label, result);
//! }
//! ```
//!
//! ## Background Runs
//!
//! ```ignore
//! let mut handle = orchestrator.spawn(params, MatrixVersion::Current.entries(), backend)?;
//! let canceller = handle.canceller();   // hand to a signal handler or UI button
//! handle.drive(&mut board)?;            // delivers results on this thread
//! let backend = handle.join()?;
//! ```

// Re-export core types
pub use peakbench_core::{
    ArithmeticFormat, BenchmarkConfiguration, BenchmarkResult, ComputeBackend, DeviceInfo,
    FAILED_SENTINEL, MatrixVersion, NOT_SUPPORTED_SENTINEL, ParallelMode, ParameterError,
    ResultBoard, ResultSink, ResultStatus, RunParameters, StorageFormat, UNKNOWN, entries,
};

// Re-export the host backend
pub use peakbench_host::{HostBackend, HostError, HostOptions};

// Re-export orchestration
pub use peakbench_cli::{
    Canceller, CollectingSink, MatrixSelection, Orchestrator, OrchestratorConfig,
    OrchestratorError, PeakConfig, ProgressSink, ResolvedRun, RunArgs, RunEvent, RunGuard,
    RunHandle, execute_run, resolve_run, save_report,
};

// Re-export reporting
pub use peakbench_report::{
    OutputFormat, Report, ReportEntry, ReportMeta, ReportSummary, format_human_output,
    generate_csv_report, generate_json_report,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchmarkConfiguration, BenchmarkResult, ComputeBackend, HostBackend, MatrixVersion,
        Orchestrator, OrchestratorConfig, ResultBoard, ResultSink, RunParameters,
    };
}

/// Run the PeakBench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     peakbench::run()
/// }
/// ```
pub use peakbench_cli::run;
