//! Terminal Sinks
//!
//! - [`CollectingSink`] keeps every delivered result for the report
//! - [`ProgressSink`] wraps another sink with an `indicatif` bar and prints
//!   each cell as it arrives

use indicatif::{ProgressBar, ProgressStyle};
use peakbench_core::{BenchmarkConfiguration, BenchmarkResult, ResultSink};
use std::time::{Duration, Instant};
use tracing::info;

/// Collects results and the run's wall time
#[derive(Debug, Default)]
pub struct CollectingSink {
    results: Vec<(BenchmarkConfiguration, BenchmarkResult)>,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl CollectingSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Results in delivery order
    pub fn results(&self) -> &[(BenchmarkConfiguration, BenchmarkResult)] {
        &self.results
    }

    /// Take the results, leaving the sink empty
    pub fn take_results(&mut self) -> Vec<(BenchmarkConfiguration, BenchmarkResult)> {
        std::mem::take(&mut self.results)
    }

    /// Time between `on_run_started` and `on_run_finished`
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

impl ResultSink for CollectingSink {
    fn on_run_started(&mut self) {
        self.results.clear();
        self.started = Some(Instant::now());
        self.elapsed = None;
    }

    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
        self.results.push((*configuration, result));
    }

    fn on_run_finished(&mut self) {
        self.elapsed = self.started.map(|s| s.elapsed());
    }
}

/// Progress bar over another sink
pub struct ProgressSink<S> {
    inner: S,
    pb: ProgressBar,
}

impl<S: ResultSink> ProgressSink<S> {
    /// Bar sized for a matrix of `total` configurations
    pub fn new(inner: S, total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { inner, pb }
    }

    /// Sink without a visible bar
    pub fn hidden(inner: S) -> Self {
        Self {
            inner,
            pb: ProgressBar::hidden(),
        }
    }

    /// Unwrap the inner sink
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResultSink> ResultSink for ProgressSink<S> {
    fn on_run_started(&mut self) {
        info!("device busy: benchmark run started");
        self.pb.set_message("settling...");
        self.pb.enable_steady_tick(Duration::from_millis(100));
        self.inner.on_run_started();
    }

    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
        self.pb
            .println(format!("  {:<12} {:>14}", configuration.label, result.display()));
        self.pb.set_message(configuration.label);
        self.pb.inc(1);
        self.inner.on_result(configuration, result);
    }

    fn on_run_finished(&mut self) {
        self.pb.finish_and_clear();
        info!("device idle: benchmark run finished");
        self.inner.on_run_finished();
    }
}
