//! System Metadata Collection
//!
//! Collects host information for report metadata.
//!
//! ## Collected Data
//!
//! - **OS**: Operating system name and architecture
//! - **CPU**: Available core count
//! - **Memory**: Total system RAM in GB
//!
//! Linux-specific data (memory) gracefully degrades on other platforms,
//! returning 0.

use chrono::{DateTime, Utc};
use peakbench_core::{DeviceInfo, MatrixVersion, RunParameters};
use peakbench_report::{ReportMeta, SCHEMA_VERSION, SystemInfo};
use std::time::Duration;

/// Build report metadata for a run started at `timestamp`
pub fn build_report_meta(
    timestamp: DateTime<Utc>,
    device: DeviceInfo,
    params: RunParameters,
    matrix: MatrixVersion,
    settle: Duration,
) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp,
        device,
        system: system_info(),
        params,
        matrix,
        settle_ms: settle.as_millis() as u64,
    }
}

/// Host system information
pub fn system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu_cores: num_cpus(),
        memory_gb: get_memory_gb().unwrap_or(0.0),
    }
}

/// Get number of available CPU cores
fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Get total system memory in GB (Linux only)
fn get_memory_gb() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| parse_mem_total_gb(&content))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_mem_total_gb(meminfo: &str) -> Option<f64> {
    meminfo
        .lines()
        .find(|l| l.starts_with("MemTotal"))
        .and_then(|l| {
            l.split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<u64>().ok())
        })
        .map(|kb| kb as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let meminfo = "MemTotal:       16777216 kB\nMemFree:         1024 kB\n";
        assert_eq!(parse_mem_total_gb(meminfo), Some(16.0));
        assert_eq!(parse_mem_total_gb("MemFree: 1 kB\n"), None);
    }

    #[test]
    fn test_build_meta() {
        let meta = build_report_meta(
            Utc::now(),
            DeviceInfo::default(),
            RunParameters::default(),
            MatrixVersion::Legacy,
            Duration::from_millis(250),
        );
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.settle_ms, 250);
        assert_eq!(meta.matrix, MatrixVersion::Legacy);
        assert!(meta.system.cpu_cores >= 1);
    }
}
