//! CSV Output

use crate::report::Report;
use peakbench_core::BenchmarkResult;

/// Column header
const HEADER: &str = "label,storage,arithmetic,mode,width,status,gops";

/// Generate a CSV report, one row per result in matrix order.
///
/// `gops` is empty for results without a throughput value.
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::with_capacity(64 * (report.results.len() + 1));
    output.push_str(HEADER);
    output.push('\n');

    for entry in &report.results {
        let gops = entry
            .gops
            .map(|g| BenchmarkResult::Throughput(g).display())
            .unwrap_or_default();
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape(&entry.label),
            entry.storage,
            entry.arithmetic,
            entry.mode,
            entry.width,
            entry.status,
            gops
        ));
    }

    output
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_csv_rows() {
        let csv = generate_csv_report(&sample_report());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "FP32,fp32,fp32,scalar,1,measured,1234.50");
        assert_eq!(lines[3], "FP16 mm,fp16,fp16,matrix-multiply,256,not-supported,");
        assert_eq!(lines[4], "FP64,fp64,fp64,scalar,1,failed,");
    }

    #[test]
    fn test_csv_gops_ties_round_up() {
        let mut report = sample_report();
        report.results[0].gops = Some(12.625);
        let csv = generate_csv_report(&report);
        assert!(csv.lines().nth(1).unwrap().ends_with(",12.63"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("FP32"), "FP32");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
