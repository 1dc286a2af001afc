//! Report Data Structures

use chrono::{DateTime, Utc};
use peakbench_core::{
    ArithmeticFormat, BenchmarkConfiguration, BenchmarkResult, DeviceInfo, MatrixVersion,
    ParallelMode, ResultStatus, RunParameters, StorageFormat,
};
use serde::{Deserialize, Serialize};

/// Complete report of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per delivered result, in matrix order
    pub results: Vec<ReportEntry>,
    /// Aggregate counts
    pub summary: ReportSummary,
}

impl Report {
    /// Build a report from delivered results
    pub fn new(
        meta: ReportMeta,
        results: &[(BenchmarkConfiguration, BenchmarkResult)],
        total_duration_ms: f64,
    ) -> Self {
        let results: Vec<ReportEntry> = results
            .iter()
            .map(|(configuration, result)| ReportEntry::new(configuration, *result))
            .collect();
        let summary = ReportSummary::from_entries(&results, total_duration_ms);

        Self {
            meta,
            results,
            summary,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// peakbench version that produced the report
    pub version: String,
    /// UTC time the run started
    pub timestamp: DateTime<Utc>,
    /// Device under test
    pub device: DeviceInfo,
    /// Host system
    pub system: SystemInfo,
    /// Parameters passed to every measurement
    pub params: RunParameters,
    /// Matrix generation that was run
    pub matrix: MatrixVersion,
    /// Pause between configurations
    pub settle_ms: u64,
}

/// Host system information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Available cores
    pub cpu_cores: u32,
    /// Total RAM in GB (0 when unknown)
    pub memory_gb: f64,
}

/// One configuration's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Configuration label
    pub label: String,
    /// Storage format
    pub storage: StorageFormat,
    /// Arithmetic format
    pub arithmetic: ArithmeticFormat,
    /// Parallel mode
    pub mode: ParallelMode,
    /// Lane width of the mode
    pub width: usize,
    /// Outcome class
    pub status: ResultStatus,
    /// Throughput in GOPS when measured
    pub gops: Option<f64>,
    /// Cell text as shown on screen
    pub display: String,
}

impl ReportEntry {
    /// Entry for one delivered result
    pub fn new(configuration: &BenchmarkConfiguration, result: BenchmarkResult) -> Self {
        Self {
            label: configuration.label.to_string(),
            storage: configuration.storage,
            arithmetic: configuration.arithmetic,
            mode: configuration.mode,
            width: configuration.mode.width(),
            status: result.status(),
            gops: result.gops(),
            display: result.display(),
        }
    }
}

/// Highest measured throughput of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEntry {
    /// Configuration label
    pub label: String,
    /// Throughput in GOPS
    pub gops: f64,
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Delivered results
    pub total: usize,
    /// Results with a throughput value
    pub measured: usize,
    /// Configurations the device does not support
    pub not_supported: usize,
    /// Failed measurements
    pub failed: usize,
    /// Wall time of the run
    pub total_duration_ms: f64,
    /// Highest throughput, if anything was measured
    pub best: Option<BestEntry>,
}

impl ReportSummary {
    /// Aggregate a list of entries
    pub fn from_entries(entries: &[ReportEntry], total_duration_ms: f64) -> Self {
        let mut summary = ReportSummary {
            total: entries.len(),
            total_duration_ms,
            ..Default::default()
        };

        for entry in entries {
            match entry.status {
                ResultStatus::Measured => summary.measured += 1,
                ResultStatus::NotSupported => summary.not_supported += 1,
                ResultStatus::Failed => summary.failed += 1,
            }

            if let Some(gops) = entry.gops {
                let better = summary.best.as_ref().is_none_or(|best| gops > best.gops);
                if better {
                    summary.best = Some(BestEntry {
                        label: entry.label.clone(),
                        gops,
                    });
                }
            }
        }

        summary
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_report() -> Report {
        let entries = MatrixVersion::Current.entries();
        let meta = ReportMeta {
            schema_version: crate::SCHEMA_VERSION,
            version: "0.1.0".to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            device: DeviceInfo {
                device_name: "Test GPU".to_string(),
                ..Default::default()
            },
            system: SystemInfo {
                os: "linux".to_string(),
                arch: "aarch64".to_string(),
                cpu_cores: 8,
                memory_gb: 12.0,
            },
            params: RunParameters::default(),
            matrix: MatrixVersion::Current,
            settle_ms: 500,
        };
        let results = vec![
            (entries[0], BenchmarkResult::Throughput(1234.5)),
            (entries[1], BenchmarkResult::Throughput(2000.0)),
            (entries[4], BenchmarkResult::NotSupported),
            (entries[5], BenchmarkResult::Failed),
        ];
        Report::new(meta, &results, 2500.0)
    }

    #[test]
    fn test_entry_from_result() {
        let entry = ReportEntry::new(
            &MatrixVersion::Current.entries()[12],
            BenchmarkResult::NotSupported,
        );
        assert_eq!(entry.label, "INT8 mm");
        assert_eq!(entry.width, 256);
        assert_eq!(entry.status, ResultStatus::NotSupported);
        assert_eq!(entry.gops, None);
        assert_eq!(entry.display, "not supported");
    }

    #[test]
    fn test_summary_counts() {
        let report = sample_report();
        let summary = &report.summary;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.measured, 2);
        assert_eq!(summary.not_supported, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.best,
            Some(BestEntry {
                label: "FP32 vec4".to_string(),
                gops: 2000.0
            })
        );
    }

    #[test]
    fn test_summary_empty() {
        let summary = ReportSummary::from_entries(&[], 0.0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.best, None);
    }
}
