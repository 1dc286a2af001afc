#![warn(missing_docs)]
//! PeakBench CLI Library
//!
//! Orchestration, configuration and the command-line surface. Use
//! `peakbench::run()` (or `peakbench_cli::run()`) in a main function to get
//! the full CLI against the reference host backend, or drive an
//! [`Orchestrator`] directly with your own [`ComputeBackend`].
//!
//! # Example
//!
//! ```ignore
//! use peakbench_cli::{Orchestrator, OrchestratorConfig};
//! use peakbench_core::{MatrixVersion, ResultBoard, RunParameters};
//!
//! let orchestrator = Orchestrator::new(OrchestratorConfig::default());
//! let mut board = ResultBoard::new();
//! orchestrator.run_all(
//!     RunParameters::default(),
//!     MatrixVersion::Current.entries(),
//!     &mut my_backend,
//!     &mut board,
//! )?;
//! println!("{}", board.cell_text("FP32").unwrap_or_default());
//! ```

mod config;
mod metadata;
mod orchestrator;
mod sinks;

pub use config::*;
pub use metadata::{build_report_meta, system_info};
pub use orchestrator::*;
pub use sinks::{CollectingSink, ProgressSink};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use peakbench_core::{ComputeBackend, DeviceInfo, MatrixVersion, RunParameters};
use peakbench_host::{HostBackend, HostOptions};
use peakbench_report::{OutputFormat, Report, generate_json_report, render};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Choices offered for `--loop`
pub const LOOP_OPTIONS: [u32; 4] = [1, 4, 16, 64];
/// Choices offered for `--count-mb`
pub const COUNT_MB_OPTIONS: [u32; 4] = [4, 8, 16, 32];
/// Choices offered for `--cmd-loop`
pub const CMD_LOOP_OPTIONS: [u32; 4] = [1, 4, 8, 16];
/// Index of the preselected choice in each option set
pub const DEFAULT_OPTION_INDEX: usize = 1;

/// PeakBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "peakbench")]
#[command(author, version, about = "PeakBench - peak arithmetic throughput of a compute device")]
pub struct Cli {
    /// Optional subcommand (Run, List, Info, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Run parameters
    #[command(flatten)]
    pub run: RunArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Parameters of a run; unset values come from peak.toml, then defaults
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Chained multiply-add iterations per element: 1, 4, 16 or 64
    #[arg(long = "loop", global = true, value_parser = parse_loop)]
    pub loop_count: Option<u32>,

    /// Working set size in MB: 4, 8, 16 or 32
    #[arg(long, global = true, value_parser = parse_count_mb)]
    pub count_mb: Option<u32>,

    /// Timed submissions per configuration: 1, 4, 8 or 16
    #[arg(long, global = true, value_parser = parse_cmd_loop)]
    pub cmd_loop: Option<u32>,

    /// Matrix generation: auto, current or legacy
    #[arg(long, global = true)]
    pub matrix: Option<MatrixSelection>,

    /// Pause before each configuration (e.g., "500ms", "0s")
    #[arg(long, global = true)]
    pub settle: Option<String>,

    /// Output format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Pin host backend workers one per core
    #[arg(long, global = true)]
    pub pin_cpu: bool,

    /// Save report.json in the output directory
    #[arg(long, global = true)]
    pub save_report: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configuration matrix (default)
    Run,
    /// Print the configuration matrix
    List,
    /// Print device identification
    Info,
    /// Print a default peak.toml
    Init,
}

fn parse_option(s: &str, options: &[u32]) -> Result<u32, String> {
    let choices = options
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("expected one of {}", choices))?;
    if options.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not one of {}", value, choices))
    }
}

fn parse_loop(s: &str) -> Result<u32, String> {
    parse_option(s, &LOOP_OPTIONS)
}

fn parse_count_mb(s: &str) -> Result<u32, String> {
    parse_option(s, &COUNT_MB_OPTIONS)
}

fn parse_cmd_loop(s: &str) -> Result<u32, String> {
    parse_option(s, &CMD_LOOP_OPTIONS)
}

/// Run the PeakBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the PeakBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Discover peak.toml configuration (CLI flags override)
    let config = PeakConfig::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::List) => list_matrix(&cli.run, &config),
        Some(Commands::Info) => print_info(&cli.run, &config),
        Some(Commands::Init) => {
            print!("{}", PeakConfig::default_toml());
            Ok(())
        }
        Some(Commands::Run) | None => run_benchmarks(&cli.run, &config),
    }
}

/// Logs go to stderr so stdout stays clean for reports. `RUST_LOG` wins over
/// the verbosity flag.
fn init_logging(verbose: bool) {
    // Target prefixes match every peakbench_* crate
    let default = if verbose {
        "peakbench=debug"
    } else {
        "peakbench=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Fully resolved settings of one invocation
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    /// Measurement parameters
    pub params: RunParameters,
    /// Matrix choice
    pub matrix: MatrixSelection,
    /// Pause before each configuration
    pub settle: Duration,
    /// Report format
    pub format: OutputFormat,
    /// Pin host workers
    pub pin_cpu: bool,
    /// Host worker threads (0 = one per core)
    pub threads: usize,
    /// Save report.json
    pub save_report: bool,
    /// Directory for saved reports
    pub directory: PathBuf,
}

/// Layer peak.toml values under CLI flags
pub fn resolve_run(args: &RunArgs, config: &PeakConfig) -> anyhow::Result<ResolvedRun> {
    // peak.toml values obey the same option sets as the flags
    let loop_count = match args.loop_count {
        Some(v) => v,
        None => parse_loop(&config.run.loop_count.to_string())
            .map_err(|e| anyhow::anyhow!("peak.toml run.loop: {}", e))?,
    };
    let count_mb = match args.count_mb {
        Some(v) => v,
        None => parse_count_mb(&config.run.count_mb.to_string())
            .map_err(|e| anyhow::anyhow!("peak.toml run.count_mb: {}", e))?,
    };
    let cmd_loop = match args.cmd_loop {
        Some(v) => v,
        None => parse_cmd_loop(&config.run.cmd_loop.to_string())
            .map_err(|e| anyhow::anyhow!("peak.toml run.cmd_loop: {}", e))?,
    };
    let params = RunParameters::new(loop_count, count_mb, cmd_loop)?;

    let settle = match &args.settle {
        Some(s) => Duration::from_nanos(PeakConfig::parse_duration(s)?),
        None => config.run.settle()?,
    };

    let format_str = args.format.as_deref().unwrap_or(&config.output.format);
    let format: OutputFormat = format_str.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    Ok(ResolvedRun {
        params,
        matrix: args.matrix.unwrap_or(config.run.matrix),
        settle,
        format,
        pin_cpu: args.pin_cpu || config.run.pin_cpu,
        threads: config.run.threads,
        save_report: args.save_report || config.output.save_report,
        directory: PathBuf::from(&config.output.directory),
    })
}

fn host_backend(resolved: &ResolvedRun) -> anyhow::Result<HostBackend> {
    Ok(HostBackend::with_options(HostOptions {
        threads: resolved.threads,
        pin_threads: resolved.pin_cpu,
    })?)
}

fn run_benchmarks(args: &RunArgs, config: &PeakConfig) -> anyhow::Result<()> {
    let resolved = resolve_run(args, config)?;
    let backend = host_backend(&resolved)?;
    let matrix = resolved.matrix.resolve(backend.matrix_version());
    let device = backend.identify();

    eprintln!(
        "Running {} configurations ({} matrix) on {}: loop {}, count {} MB, cmd loop {}\n",
        matrix.entries().len(),
        matrix,
        device.device_name,
        resolved.params.ops_per_element,
        resolved.params.working_set_mb,
        resolved.params.submission_count
    );

    let orchestrator = Orchestrator::new(OrchestratorConfig {
        settle_time: resolved.settle,
    });
    let (report, _backend) = execute_run(&orchestrator, &resolved, matrix, backend, true)?;

    let output = render(&report, resolved.format)?;
    if let Some(ref path) = args.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        eprintln!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if resolved.save_report {
        let path = save_report(&report, &resolved.directory)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Run one matrix on the orchestrator's execution thread and build its
/// report. Returns the backend with the report.
pub fn execute_run<B>(
    orchestrator: &Orchestrator,
    resolved: &ResolvedRun,
    matrix: MatrixVersion,
    backend: B,
    show_progress: bool,
) -> anyhow::Result<(Report, B)>
where
    B: ComputeBackend + Send + 'static,
{
    let device: DeviceInfo = backend.identify();
    let entries = matrix.entries();
    let timestamp = Utc::now();

    let collector = CollectingSink::new();
    let mut sink = if show_progress {
        ProgressSink::new(collector, entries.len())
    } else {
        ProgressSink::hidden(collector)
    };

    let mut handle = orchestrator.spawn(resolved.params, entries, backend)?;
    handle.drive(&mut sink)?;
    let backend = handle.join()?;

    let mut collector = sink.into_inner();
    let total_duration_ms = collector
        .elapsed()
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0);
    let meta = build_report_meta(
        timestamp,
        device,
        resolved.params,
        matrix,
        orchestrator.config().settle_time,
    );
    let report = Report::new(meta, &collector.take_results(), total_duration_ms);

    Ok((report, backend))
}

/// Write `report.json` into `directory`, creating it if needed
pub fn save_report(report: &Report, directory: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join("report.json");
    let json = generate_json_report(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

fn list_matrix(args: &RunArgs, config: &PeakConfig) -> anyhow::Result<()> {
    let selection = args.matrix.unwrap_or(config.run.matrix);
    let matrix = selection.resolve(MatrixVersion::default());
    print!("{}", format_matrix(matrix));
    Ok(())
}

/// Table of a matrix with its wire codes
pub fn format_matrix(matrix: MatrixVersion) -> String {
    let code = |c: Option<i32>| c.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());

    let mut output = format!("PeakBench Matrix ({}):\n", matrix);
    for (i, c) in matrix.entries().iter().enumerate() {
        output.push_str(&format!(
            "├── {:>2} {:<12} {:<12} {:<6} {:<16} [{}/{}/{}]\n",
            i + 1,
            c.label,
            c.storage,
            c.arithmetic,
            c.mode,
            code(matrix.storage_code(c.storage)),
            code(matrix.arithmetic_code(c.arithmetic)),
            code(matrix.mode_code(c.mode)),
        ));
    }
    output.push_str(&format!("{} configurations.\n", matrix.entries().len()));
    output
}

fn print_info(args: &RunArgs, config: &PeakConfig) -> anyhow::Result<()> {
    let resolved = resolve_run(args, config)?;
    let backend = host_backend(&resolved)?;
    print!("{}", format_device(&backend.identify()));
    Ok(())
}

/// Device identification block
pub fn format_device(device: &DeviceInfo) -> String {
    format!(
        "platform: {}\nlibrary:  {}\ndevice:   {}\napi:      {}\ndriver:   {}\n",
        device.platform_name,
        device.library_version,
        device.device_name,
        device.api_version,
        device.driver_version
    )
}
