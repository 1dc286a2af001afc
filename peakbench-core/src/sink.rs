//! Result Sinks
//!
//! A sink is the presentation side of a run. It is told when the run's
//! exclusivity window opens and closes, and receives every result in matrix
//! order. Sinks are not required to be `Send`: the orchestrator delivers on
//! the thread that drives the run, never from the execution thread.

use crate::{BenchmarkConfiguration, BenchmarkResult};

/// Receives the results of a run
pub trait ResultSink {
    /// The run has started; the controlling surface should stop accepting a
    /// new run
    fn on_run_started(&mut self) {}

    /// One configuration finished
    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult);

    /// The run is over; the controlling surface may accept a new run
    fn on_run_finished(&mut self) {}
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn on_run_started(&mut self) {
        (**self).on_run_started()
    }

    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
        (**self).on_result(configuration, result)
    }

    fn on_run_finished(&mut self) {
        (**self).on_run_finished()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn on_run_started(&mut self) {
        (**self).on_run_started()
    }

    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
        (**self).on_result(configuration, result)
    }

    fn on_run_finished(&mut self) {
        (**self).on_run_finished()
    }
}

/// Display state of a controlling surface: one cell per configuration plus
/// the interactivity flag.
///
/// Cells keep the order in which results arrived. A result for a label that
/// already has a cell (a later run) replaces the value in place.
#[derive(Debug, Clone, Default)]
pub struct ResultBoard {
    cells: Vec<(BenchmarkConfiguration, BenchmarkResult)>,
    running: bool,
    completed_runs: usize,
}

impl ResultBoard {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run currently holds the surface
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of runs that delivered `on_run_finished`
    pub fn completed_runs(&self) -> usize {
        self.completed_runs
    }

    /// Result for a configuration label
    pub fn get(&self, label: &str) -> Option<BenchmarkResult> {
        self.cells
            .iter()
            .find(|(c, _)| c.label == label)
            .map(|(_, r)| *r)
    }

    /// Rendered cell text for a configuration label
    pub fn cell_text(&self, label: &str) -> Option<String> {
        self.get(label).map(|r| r.display())
    }

    /// All cells in arrival order
    pub fn cells(&self) -> &[(BenchmarkConfiguration, BenchmarkResult)] {
        &self.cells
    }

    /// Number of filled cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is filled
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl ResultSink for ResultBoard {
    fn on_run_started(&mut self) {
        self.running = true;
    }

    fn on_result(&mut self, configuration: &BenchmarkConfiguration, result: BenchmarkResult) {
        match self
            .cells
            .iter_mut()
            .find(|(c, _)| c.label == configuration.label)
        {
            Some((_, cell)) => *cell = result,
            None => self.cells.push((*configuration, result)),
        }
    }

    fn on_run_finished(&mut self) {
        self.running = false;
        self.completed_runs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixVersion;

    #[test]
    fn test_board_tracks_window() {
        let mut board = ResultBoard::new();
        assert!(!board.is_running());
        board.on_run_started();
        assert!(board.is_running());
        board.on_run_finished();
        assert!(!board.is_running());
        assert_eq!(board.completed_runs(), 1);
    }

    #[test]
    fn test_board_cells() {
        let entries = MatrixVersion::Current.entries();
        let mut board = ResultBoard::new();
        board.on_result(&entries[0], BenchmarkResult::Throughput(12.5));
        board.on_result(&entries[1], BenchmarkResult::NotSupported);

        assert_eq!(board.len(), 2);
        assert_eq!(board.cell_text("FP32").as_deref(), Some("12.50"));
        assert_eq!(board.cell_text("FP32 vec4").as_deref(), Some("not supported"));
        assert_eq!(board.get("FP64"), None);
    }

    #[test]
    fn test_board_replaces_on_rerun() {
        let entries = MatrixVersion::Current.entries();
        let mut board = ResultBoard::new();
        board.on_result(&entries[0], BenchmarkResult::Failed);
        board.on_result(&entries[0], BenchmarkResult::Throughput(1.0));
        assert_eq!(board.len(), 1);
        assert_eq!(board.cell_text("FP32").as_deref(), Some("1.00"));
    }
}
