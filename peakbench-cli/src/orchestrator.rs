//! Benchmark Orchestrator
//!
//! Runs a configuration matrix against one backend and hands the results to
//! a sink as they become available.
//!
//! ## Threads
//!
//! ```text
//!  presentation thread                 execution thread ("peakbench-run")
//!  ───────────────────                 ──────────────────────────────────
//!  acquire RunGuard ─────────────────▶ Started
//!                                      for each configuration:
//!                                        settle
//!                                        backend.measure(..)  (catch_unwind)
//!  sink.on_result(..) ◀── mpsc ─────── Result
//!                                      drop RunGuard
//!  sink.on_run_finished() ◀─────────── Finished
//! ```
//!
//! The backend is only ever touched by the execution thread, one call at a
//! time. The sink is only ever touched by the presentation thread.

use peakbench_core::{
    BenchmarkConfiguration, BenchmarkResult, ComputeBackend, ParameterError, ResultSink,
    RunParameters,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the per-run execution thread
pub const RUN_THREAD_NAME: &str = "peakbench-run";

/// Default pause before each configuration
pub const DEFAULT_SETTLE_TIME: Duration = Duration::from_millis(500);

/// Orchestration-level errors. Per-configuration failures are results, not
/// errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Another run holds the exclusivity guard
    #[error("A benchmark run is already in progress")]
    RunInProgress,

    /// Nothing to run
    #[error("Configuration matrix is empty")]
    EmptyMatrix,

    /// A run parameter was zero
    #[error("Invalid run parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    /// The execution thread could not be started
    #[error("Failed to spawn execution thread: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The execution thread went away without finishing the run
    #[error("Execution thread disconnected before the run finished")]
    Disconnected,
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause before each backend call, letting the device settle
    pub settle_time: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_time: DEFAULT_SETTLE_TIME,
        }
    }
}

/// Progress of a run, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The exclusivity window opened
    Started,
    /// One configuration finished
    Result {
        /// Configuration that was measured
        configuration: BenchmarkConfiguration,
        /// Classified outcome
        result: BenchmarkResult,
    },
    /// The exclusivity window closed
    Finished {
        /// Configurations attempted
        completed: usize,
        /// Whether the run stopped early on request
        cancelled: bool,
    },
}

/// Exclusivity token, held for the whole run and released on drop
#[derive(Debug)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(busy: &Arc<AtomicBool>) -> Result<Self, OrchestratorError> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrchestratorError::RunInProgress)?;
        Ok(Self {
            busy: Arc::clone(busy),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Requests a cooperative stop; checked between configurations
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    flag: Arc<AtomicBool>,
}

impl Canceller {
    /// Stop before the next configuration
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Runs configuration matrices, one run at a time.
///
/// Clones share the exclusivity state: a run started through any clone
/// blocks runs through every other.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    busy: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Create an orchestrator
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Whether a run currently holds the exclusivity guard
    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(
        &self,
        params: &RunParameters,
        matrix: &[BenchmarkConfiguration],
    ) -> Result<RunGuard, OrchestratorError> {
        params.validate()?;
        if matrix.is_empty() {
            return Err(OrchestratorError::EmptyMatrix);
        }
        RunGuard::acquire(&self.busy)
    }

    /// Run every configuration of `matrix` and deliver the results to `sink`.
    ///
    /// Blocks until the run is over. The backend runs on a scoped execution
    /// thread; `sink` is called on the current thread only.
    pub fn run_all<B, S>(
        &self,
        params: RunParameters,
        matrix: &[BenchmarkConfiguration],
        backend: &mut B,
        sink: &mut S,
    ) -> Result<(), OrchestratorError>
    where
        B: ComputeBackend + Send + ?Sized,
        S: ResultSink + ?Sized,
    {
        let guard = self.begin(&params, matrix)?;
        let settle = self.config.settle_time;
        let cancel = Canceller::default();
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| -> Result<(), OrchestratorError> {
            let worker = thread::Builder::new()
                .name(RUN_THREAD_NAME.to_string())
                .spawn_scoped(scope, || {
                    execute(backend, params, matrix, settle, &cancel, guard, tx)
                })?;

            let delivered = pump(&rx, sink);
            if worker.join().is_err() {
                return Err(OrchestratorError::Disconnected);
            }
            delivered
        })
    }

    /// Start a run on a new execution thread and return immediately.
    ///
    /// Drive the returned handle to receive the results; join it to get the
    /// backend back.
    pub fn spawn<B>(
        &self,
        params: RunParameters,
        matrix: impl Into<Vec<BenchmarkConfiguration>>,
        mut backend: B,
    ) -> Result<RunHandle<B>, OrchestratorError>
    where
        B: ComputeBackend + Send + 'static,
    {
        let matrix: Vec<BenchmarkConfiguration> = matrix.into();
        let guard = self.begin(&params, &matrix)?;
        let settle = self.config.settle_time;
        let cancel = Canceller::default();
        let (tx, rx) = mpsc::channel();

        let thread = {
            let cancel = cancel.clone();
            thread::Builder::new()
                .name(RUN_THREAD_NAME.to_string())
                .spawn(move || {
                    execute(&mut backend, params, &matrix, settle, &cancel, guard, tx);
                    backend
                })?
        };

        Ok(RunHandle {
            events: rx,
            cancel,
            thread,
            finished: false,
        })
    }
}

/// A run in progress on its execution thread
pub struct RunHandle<B> {
    events: Receiver<RunEvent>,
    cancel: Canceller,
    thread: JoinHandle<B>,
    finished: bool,
}

impl<B> RunHandle<B> {
    /// Token that stops the run before its next configuration
    pub fn canceller(&self) -> Canceller {
        self.cancel.clone()
    }

    /// Stop the run before its next configuration
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the `Finished` event has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block for the next event; `None` after `Finished`
    pub fn next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().ok()?;
        self.finished = matches!(event, RunEvent::Finished { .. });
        Some(event)
    }

    /// Next event if one is ready
    pub fn try_next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => {
                self.finished = matches!(event, RunEvent::Finished { .. });
                Some(event)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Deliver every remaining event to `sink` on the current thread
    pub fn drive<S: ResultSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), OrchestratorError> {
        if self.finished {
            return Ok(());
        }
        let delivered = pump(&self.events, sink);
        self.finished = true;
        delivered
    }

    /// Wait for the execution thread and take the backend back
    pub fn join(self) -> Result<B, OrchestratorError> {
        self.thread
            .join()
            .map_err(|_| OrchestratorError::Disconnected)
    }
}

/// Deliver events until `Finished`. A channel that closes early still closes
/// the sink's window.
fn pump<S: ResultSink + ?Sized>(
    events: &Receiver<RunEvent>,
    sink: &mut S,
) -> Result<(), OrchestratorError> {
    let mut started = false;
    for event in events.iter() {
        match event {
            RunEvent::Started => {
                started = true;
                sink.on_run_started();
            }
            RunEvent::Result {
                configuration,
                result,
            } => sink.on_result(&configuration, result),
            RunEvent::Finished { .. } => {
                sink.on_run_finished();
                return Ok(());
            }
        }
    }

    if started {
        sink.on_run_finished();
    }
    Err(OrchestratorError::Disconnected)
}

/// Execution thread body
fn execute<B: ComputeBackend + ?Sized>(
    backend: &mut B,
    params: RunParameters,
    matrix: &[BenchmarkConfiguration],
    settle: Duration,
    cancel: &Canceller,
    guard: RunGuard,
    events: Sender<RunEvent>,
) {
    let run_start = Instant::now();
    info!(
        "run started: {} configurations, loop {}, count {} MB, cmd loop {}",
        matrix.len(),
        params.ops_per_element,
        params.working_set_mb,
        params.submission_count
    );
    // A dropped receiver only means nobody is watching; the run still completes.
    let _ = events.send(RunEvent::Started);

    let mut completed = 0;
    for configuration in matrix {
        if cancel.is_cancelled() {
            break;
        }
        if !settle.is_zero() {
            thread::sleep(settle);
            if cancel.is_cancelled() {
                break;
            }
        }

        let result = measure_one(backend, &params, configuration);
        completed += 1;
        let _ = events.send(RunEvent::Result {
            configuration: *configuration,
            result,
        });
    }

    let cancelled = completed < matrix.len();
    drop(guard);
    if cancelled {
        info!(
            "run cancelled after {} of {} configurations",
            completed,
            matrix.len()
        );
    } else {
        info!(
            "run finished: {} configurations in {:.2?}",
            completed,
            run_start.elapsed()
        );
    }
    let _ = events.send(RunEvent::Finished {
        completed,
        cancelled,
    });
}

/// One backend call, classified. Panics and out-of-contract values are
/// failures.
fn measure_one<B: ComputeBackend + ?Sized>(
    backend: &mut B,
    params: &RunParameters,
    configuration: &BenchmarkConfiguration,
) -> BenchmarkResult {
    let call_start = Instant::now();
    let raw = panic::catch_unwind(AssertUnwindSafe(|| {
        backend.measure(
            params.ops_per_element,
            params.working_set_mb,
            params.submission_count,
            configuration.storage,
            configuration.arithmetic,
            configuration.mode,
        )
    }));

    let result = match raw {
        Ok(raw) => BenchmarkResult::try_from_raw(raw).unwrap_or_else(|| {
            warn!(
                "{}: backend returned out-of-contract value {}, recording as failed",
                configuration.label, raw
            );
            BenchmarkResult::Failed
        }),
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            warn!("{}: backend panicked: {}", configuration.label, message);
            BenchmarkResult::Failed
        }
    };

    debug!(
        "{} -> {} ({:.2?})",
        configuration.label,
        result,
        call_start.elapsed()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use peakbench_core::{
        ArithmeticFormat, DeviceInfo, MatrixVersion, ParallelMode, ResultBoard, StorageFormat,
    };
    use std::collections::VecDeque;

    fn entry(label: &'static str) -> BenchmarkConfiguration {
        BenchmarkConfiguration::new(
            label,
            StorageFormat::Fp32,
            ArithmeticFormat::Fp32,
            ParallelMode::Scalar,
        )
    }

    fn quick() -> Orchestrator {
        Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::ZERO,
        })
    }

    /// Returns queued values in order, recording every call
    #[derive(Default)]
    struct ScriptedBackend {
        values: VecDeque<f32>,
        calls: Vec<(u32, u32, u32, StorageFormat, ArithmeticFormat, ParallelMode)>,
    }

    impl ScriptedBackend {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                calls: Vec::new(),
            }
        }
    }

    impl ComputeBackend for ScriptedBackend {
        fn identify(&self) -> DeviceInfo {
            DeviceInfo::default()
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
            self.calls.push((
                ops_per_element,
                working_set_mb,
                submission_count,
                storage,
                arithmetic,
                mode,
            ));
            match self.values.pop_front() {
                Some(v) if v.is_nan() => panic!("device lost"),
                Some(v) => v,
                None => 0.0,
            }
        }
    }

    /// Records every callback as a string
    #[derive(Default)]
    struct LogSink {
        log: Vec<String>,
    }

    impl ResultSink for LogSink {
        fn on_run_started(&mut self) {
            self.log.push("started".to_string());
        }

        fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
            self.log
                .push(format!("{}={}", configuration.label, result.display()));
        }

        fn on_run_finished(&mut self) {
            self.log.push("finished".to_string());
        }
    }

    #[test]
    fn test_run_all_delivers_in_order() {
        let matrix = [entry("e1"), entry("e2"), entry("e3")];
        let mut backend = ScriptedBackend::new(&[12.5, -233.0, -1.0]);
        let mut sink = LogSink::default();

        quick()
            .run_all(RunParameters::default(), &matrix, &mut backend, &mut sink)
            .unwrap();

        assert_eq!(
            sink.log,
            [
                "started",
                "e1=12.50",
                "e2=not supported",
                "e3=error",
                "finished"
            ]
        );
    }

    #[test]
    fn test_zero_throughput() {
        let matrix = [entry("only")];
        let params = RunParameters::new(1, 8, 4).unwrap();
        let mut backend = ScriptedBackend::new(&[0.0]);
        let mut board = ResultBoard::new();

        quick()
            .run_all(params, &matrix, &mut backend, &mut board)
            .unwrap();

        assert_eq!(board.cell_text("only").as_deref(), Some("0.00"));
        assert_eq!(
            backend.calls,
            [(
                1,
                8,
                4,
                StorageFormat::Fp32,
                ArithmeticFormat::Fp32,
                ParallelMode::Scalar
            )]
        );
    }

    #[test]
    fn test_backend_receives_configuration_fields() {
        let matrix = MatrixVersion::Current.entries();
        let params = RunParameters::new(16, 32, 8).unwrap();
        let mut backend = ScriptedBackend::default();
        let mut board = ResultBoard::new();

        quick()
            .run_all(params, matrix, &mut backend, &mut board)
            .unwrap();

        assert_eq!(backend.calls.len(), matrix.len());
        for (call, c) in backend.calls.iter().zip(matrix) {
            assert_eq!(*call, (16, 32, 8, c.storage, c.arithmetic, c.mode));
        }
        assert_eq!(board.len(), matrix.len());
        assert_eq!(board.completed_runs(), 1);
    }

    #[test]
    fn test_out_of_contract_values_fail() {
        let matrix = [entry("neg"), entry("frac"), entry("inf")];
        let mut backend = ScriptedBackend::new(&[-5.0, -0.5, f32::INFINITY]);
        let mut board = ResultBoard::new();

        quick()
            .run_all(RunParameters::default(), &matrix, &mut backend, &mut board)
            .unwrap();

        for label in ["neg", "frac", "inf"] {
            assert_eq!(board.get(label), Some(BenchmarkResult::Failed), "{label}");
        }
    }

    #[test]
    fn test_backend_panic_is_contained() {
        let matrix = [entry("a"), entry("b"), entry("c")];
        let mut backend = ScriptedBackend::new(&[1.0, f32::NAN, 3.0]);
        let mut sink = LogSink::default();
        let orchestrator = quick();

        orchestrator
            .run_all(RunParameters::default(), &matrix, &mut backend, &mut sink)
            .unwrap();

        assert_eq!(sink.log, ["started", "a=1.00", "b=error", "c=3.00", "finished"]);
        assert!(!orchestrator.is_running());
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let orchestrator = quick();
        let mut backend = ScriptedBackend::default();
        let mut sink = LogSink::default();

        let err = orchestrator
            .run_all(RunParameters::default(), &[], &mut backend, &mut sink)
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::EmptyMatrix));
        assert!(sink.log.is_empty());
        assert!(!orchestrator.is_running());
    }

    #[test]
    fn test_zero_parameters_rejected() {
        let params = RunParameters {
            ops_per_element: 4,
            working_set_mb: 0,
            submission_count: 4,
        };
        let err = quick()
            .run_all(
                params,
                &[entry("a")],
                &mut ScriptedBackend::default(),
                &mut LogSink::default(),
            )
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidParameters(_)));
    }

    /// Tries to start a second run from inside the first
    struct ReentrantSink {
        orchestrator: Orchestrator,
        running_seen: Vec<bool>,
        nested: Vec<String>,
        board: ResultBoard,
    }

    impl ResultSink for ReentrantSink {
        fn on_run_started(&mut self) {
            self.board.on_run_started();
        }

        fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
            self.running_seen.push(self.orchestrator.is_running());
            let nested = self.orchestrator.run_all(
                RunParameters::default(),
                &[entry("intruder")],
                &mut ScriptedBackend::new(&[99.0]),
                &mut ResultBoard::new(),
            );
            if let Err(e) = nested {
                self.nested.push(e.to_string());
            }
            self.board.on_result(configuration, result);
        }

        fn on_run_finished(&mut self) {
            self.running_seen.push(self.orchestrator.is_running());
            self.board.on_run_finished();
        }
    }

    #[test]
    fn test_second_run_rejected_while_running() {
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(100),
        });
        let matrix = [entry("e1"), entry("e2")];
        let mut sink = ReentrantSink {
            orchestrator: orchestrator.clone(),
            running_seen: Vec::new(),
            nested: Vec::new(),
            board: ResultBoard::new(),
        };

        let mut backend = ScriptedBackend::new(&[1.0, 2.0]);
        orchestrator
            .run_all(RunParameters::default(), &matrix, &mut backend, &mut sink)
            .unwrap();

        // e1 arrives while e2 is still settling
        assert!(sink.running_seen[0]);
        assert_eq!(sink.nested[0], "A benchmark run is already in progress");
        assert_eq!(sink.board.len(), 2);
        assert_eq!(sink.board.get("intruder"), None);
        assert_eq!(sink.board.completed_runs(), 1);
        // The guard is gone by the time the window closes
        assert_eq!(sink.running_seen.last(), Some(&false));
        assert!(!orchestrator.is_running());

        // A fresh run is accepted afterwards
        let mut board = ResultBoard::new();
        orchestrator
            .run_all(
                RunParameters::default(),
                &matrix,
                &mut ScriptedBackend::new(&[5.0, 6.0]),
                &mut board,
            )
            .unwrap();
        assert_eq!(board.cell_text("e2").as_deref(), Some("6.00"));
    }

    #[test]
    fn test_spawn_rejects_concurrent_run() {
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(50),
        });
        let matrix = [entry("e1"), entry("e2")];

        let mut handle = orchestrator
            .spawn(RunParameters::default(), matrix, ScriptedBackend::new(&[1.0, 2.0]))
            .unwrap();
        assert!(orchestrator.is_running());

        let second = orchestrator.spawn(RunParameters::default(), matrix, ScriptedBackend::default());
        assert!(matches!(second, Err(OrchestratorError::RunInProgress)));

        let mut board = ResultBoard::new();
        handle.drive(&mut board).unwrap();
        let backend = handle.join().unwrap();

        assert_eq!(backend.calls.len(), 2);
        assert_eq!(board.cell_text("e1").as_deref(), Some("1.00"));
        assert_eq!(board.cell_text("e2").as_deref(), Some("2.00"));
        assert!(!orchestrator.is_running());
    }

    #[test]
    fn test_spawn_event_sequence() {
        let matrix = [entry("e1"), entry("e2")];
        let mut handle = quick()
            .spawn(RunParameters::default(), matrix, ScriptedBackend::new(&[7.0, -233.0]))
            .unwrap();

        assert_eq!(handle.next_event(), Some(RunEvent::Started));
        assert_eq!(
            handle.next_event(),
            Some(RunEvent::Result {
                configuration: matrix[0],
                result: BenchmarkResult::Throughput(7.0),
            })
        );
        assert_eq!(
            handle.next_event(),
            Some(RunEvent::Result {
                configuration: matrix[1],
                result: BenchmarkResult::NotSupported,
            })
        );
        assert_eq!(
            handle.next_event(),
            Some(RunEvent::Finished {
                completed: 2,
                cancelled: false
            })
        );
        assert!(handle.is_finished());
        assert_eq!(handle.next_event(), None);
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_try_next_event_polls_without_blocking() {
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(300),
        });
        let matrix = [entry("e1"), entry("e2")];
        let mut handle = orchestrator
            .spawn(RunParameters::default(), matrix, ScriptedBackend::new(&[4.0, 5.0]))
            .unwrap();

        assert_eq!(handle.next_event(), Some(RunEvent::Started));
        // First result is still behind the settle window
        assert_eq!(handle.try_next_event(), None);
        assert!(!handle.is_finished());

        let mut events = Vec::new();
        while !handle.is_finished() {
            match handle.try_next_event() {
                Some(event) => events.push(event),
                None => std::thread::sleep(Duration::from_millis(10)),
            }
        }

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            RunEvent::Finished {
                completed: 2,
                cancelled: false
            }
        );
        assert_eq!(handle.try_next_event(), None);
        assert_eq!(handle.join().unwrap().calls.len(), 2);
    }

    /// Cancels the run after its first result
    struct CancelAfterFirst {
        canceller: Canceller,
        inner: LogSink,
    }

    impl ResultSink for CancelAfterFirst {
        fn on_run_started(&mut self) {
            self.inner.on_run_started();
        }

        fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
            self.canceller.cancel();
            self.inner.on_result(configuration, result);
        }

        fn on_run_finished(&mut self) {
            self.inner.on_run_finished();
        }
    }

    #[test]
    fn test_cancel_between_configurations() {
        // The settle window gives the presentation thread time to cancel
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(200),
        });
        let matrix = [entry("e1"), entry("e2"), entry("e3")];
        let mut handle = orchestrator
            .spawn(RunParameters::default(), matrix, ScriptedBackend::new(&[1.0, 2.0, 3.0]))
            .unwrap();

        let mut sink = CancelAfterFirst {
            canceller: handle.canceller(),
            inner: LogSink::default(),
        };
        handle.drive(&mut sink).unwrap();
        let backend = handle.join().unwrap();

        assert_eq!(sink.inner.log, ["started", "e1=1.00", "finished"]);
        assert_eq!(backend.calls.len(), 1);
        assert!(!orchestrator.is_running());
    }

    #[test]
    fn test_cancel_before_first_configuration() {
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(200),
        });
        let mut handle = orchestrator
            .spawn(RunParameters::default(), [entry("e1")], ScriptedBackend::new(&[1.0]))
            .unwrap();
        handle.cancel();

        let mut sink = LogSink::default();
        handle.drive(&mut sink).unwrap();
        let backend = handle.join().unwrap();

        assert_eq!(sink.log, ["started", "finished"]);
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_settle_time_applies_per_configuration() {
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            settle_time: Duration::from_millis(20),
        });
        let matrix = [entry("e1"), entry("e2"), entry("e3")];
        let start = Instant::now();
        orchestrator
            .run_all(
                RunParameters::default(),
                &matrix,
                &mut ScriptedBackend::default(),
                &mut ResultBoard::new(),
            )
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_default_settle_time() {
        assert_eq!(
            Orchestrator::default().config().settle_time,
            Duration::from_millis(500)
        );
    }
}
