//! Configuration loading from peak.toml
//!
//! PeakBench configuration can be specified in a `peak.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use peakbench_core::{MatrixVersion, RunParameters};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration file name looked up by [`PeakConfig::discover`]
pub const CONFIG_FILE: &str = "peak.toml";

/// PeakBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PeakConfig {
    /// Run configuration
    #[serde(default)]
    pub run: RunConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which configuration matrix generation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixSelection {
    /// Whatever the backend reports
    #[default]
    Auto,
    /// Current matrix
    Current,
    /// Legacy matrix
    Legacy,
}

impl MatrixSelection {
    /// Resolve against the backend's own generation
    pub fn resolve(self, backend: MatrixVersion) -> MatrixVersion {
        match self {
            MatrixSelection::Auto => backend,
            MatrixSelection::Current => MatrixVersion::Current,
            MatrixSelection::Legacy => MatrixVersion::Legacy,
        }
    }
}

impl std::str::FromStr for MatrixSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(MatrixSelection::Auto),
            other => other
                .parse::<MatrixVersion>()
                .map(|v| match v {
                    MatrixVersion::Current => MatrixSelection::Current,
                    MatrixVersion::Legacy => MatrixSelection::Legacy,
                })
                .map_err(|e| e.to_string()),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Chained multiply-add iterations per element
    #[serde(rename = "loop", default = "default_loop")]
    pub loop_count: u32,
    /// Working set size in MB
    #[serde(default = "default_count_mb")]
    pub count_mb: u32,
    /// Timed submissions per configuration
    #[serde(default = "default_cmd_loop")]
    pub cmd_loop: u32,
    /// Pause between configurations (e.g., "500ms")
    #[serde(default = "default_settle_time")]
    pub settle_time: String,
    /// Matrix generation: "auto", "current" or "legacy"
    #[serde(default)]
    pub matrix: MatrixSelection,
    /// Pin the host backend's workers one per core
    #[serde(default)]
    pub pin_cpu: bool,
    /// Host backend worker threads (0 = one per core)
    #[serde(default)]
    pub threads: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            loop_count: default_loop(),
            count_mb: default_count_mb(),
            cmd_loop: default_cmd_loop(),
            settle_time: default_settle_time(),
            matrix: MatrixSelection::default(),
            pin_cpu: false,
            threads: 0,
        }
    }
}

impl RunConfig {
    /// Parsed settle time
    pub fn settle(&self) -> anyhow::Result<Duration> {
        Ok(Duration::from_nanos(PeakConfig::parse_duration(
            &self.settle_time,
        )?))
    }
}

fn default_loop() -> u32 {
    RunParameters::default().ops_per_element
}
fn default_count_mb() -> u32 {
    RunParameters::default().working_set_mb
}
fn default_cmd_loop() -> u32 {
    RunParameters::default().submission_count
}
fn default_settle_time() -> String {
    "500ms".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for saved reports
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Save a JSON report after each run
    #[serde(default)]
    pub save_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            save_report: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/peakbench".to_string()
}

impl PeakConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `peak.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# PeakBench Configuration

[run]
# Chained multiply-add iterations per element: 1, 4, 16 or 64
loop = 4
# Working set size in MB: 4, 8, 16 or 32
count_mb = 8
# Timed submissions per configuration (best one counts): 1, 4, 8 or 16
cmd_loop = 4
# Pause between configurations
settle_time = "500ms"
# Matrix generation: "auto", "current" or "legacy"
matrix = "auto"
# Pin host backend workers one per core
pin_cpu = false
# Host backend worker threads (0 = one per core)
threads = 0

[output]
# Default output format: human, json, csv
format = "human"
# Output directory for saved reports
directory = "target/peakbench"
# Save report.json after each run
save_report = false
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
