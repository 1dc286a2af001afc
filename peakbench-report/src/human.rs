//! Human Output
//!
//! Terminal table of a run: device block, one row per configuration with
//! its cell text, then a summary.

use crate::report::Report;
use peakbench_core::{BenchmarkResult, ResultStatus};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();
    let meta = &report.meta;

    output.push('\n');
    output.push_str("PeakBench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    output.push_str(&format!("  platform: {}\n", meta.device.platform_name));
    output.push_str(&format!("  library:  {}\n", meta.device.library_version));
    output.push_str(&format!("  device:   {}\n", meta.device.device_name));
    output.push_str(&format!("  api:      {}\n", meta.device.api_version));
    output.push_str(&format!("  driver:   {}\n", meta.device.driver_version));
    output.push_str(&format!(
        "  params:   loop {}  count {} MB  cmd loop {}  ({} matrix)\n\n",
        meta.params.ops_per_element,
        meta.params.working_set_mb,
        meta.params.submission_count,
        meta.matrix
    ));

    let label_width = report
        .results
        .iter()
        .map(|e| e.label.len())
        .max()
        .unwrap_or(12)
        .max(13);

    output.push_str(&format!(
        "  {:<width$}  {:>14}  {}\n",
        "Configuration",
        "GOPS",
        "Formats",
        width = label_width
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for entry in &report.results {
        let icon = match entry.status {
            ResultStatus::Measured => "✓",
            ResultStatus::NotSupported => "⊘",
            ResultStatus::Failed => "✗",
        };
        output.push_str(&format!(
            "{} {:<width$}  {:>14}  {}/{} {}\n",
            icon,
            entry.label,
            entry.display,
            entry.storage,
            entry.arithmetic,
            entry.mode,
            width = label_width
        ));
    }

    let summary = &report.summary;
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Measured: {}  Not supported: {}  Failed: {}\n",
        summary.total, summary.measured, summary.not_supported, summary.failed
    ));
    if let Some(best) = &summary.best {
        output.push_str(&format!(
            "  Peak: {} at {} GOPS\n",
            best.label,
            BenchmarkResult::Throughput(best.gops)
        ));
    }
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        summary.total_duration_ms
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_human_output() {
        let text = format_human_output(&sample_report());

        assert!(text.contains("device:   Test GPU"));
        assert!(text.contains("1234.50"));
        assert!(text.contains("not supported"));
        assert!(text.contains("error"));
        assert!(text.contains("Peak: FP32 vec4 at 2000.00 GOPS"));
        assert!(text.contains("Total: 4  Measured: 2  Not supported: 1  Failed: 1"));
    }

    #[test]
    fn test_rows_in_matrix_order() {
        let text = format_human_output(&sample_report());
        let fp32 = text.find("FP32 ").unwrap();
        let fp16mm = text.find("FP16 mm").unwrap();
        let fp64 = text.find("FP64").unwrap();
        assert!(fp32 < fp16mm && fp16mm < fp64);
    }
}
