//! Command-line interface.
//!
//! A single-purpose command: scan one target over a port specification.
//! This layer only parses arguments and wires them into the engine; all
//! scanning behavior lives in [`crate::scanner`].

use crate::error::ScanResult;
use crate::output::{self, ConsoleReporter};
use crate::ports::PortSet;
use crate::scanner::{self, EventSink, NullSink, ScanConfig, DEFAULT_WORKERS};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

/// Output format for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text with live per-port lines.
    Plain,
    /// JSON report on stdout (suppresses live per-port lines).
    Json,
}

/// Spyglass - a concurrent TCP connect scanner with banner grabbing.
#[derive(Parser, Debug)]
#[command(name = "spyglass")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect scanner with banner grabbing", long_about = None)]
pub struct Cli {
    /// Target hostname or IP
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports: range (1-1024), list (22,80,443), or both
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Number of concurrent workers (capped at 500)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Connect timeout in seconds
    #[arg(short = 't', long, default_value_t = 0.6)]
    pub timeout: f64,

    /// Banner/receive timeout in seconds
    #[arg(long, default_value_t = 1.5)]
    pub banner_timeout: f64,

    /// Disable banner grabbing/probing
    #[arg(long)]
    pub no_banner: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Report closed ports and per-port errors too
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Run the scan described by the parsed arguments.
    pub async fn execute(&self) -> ScanResult<()> {
        let ports: PortSet = self.ports.parse()?;

        let mut config = ScanConfig::new(&self.target, ports)
            .with_workers(self.workers)
            .with_connect_timeout(Duration::from_secs_f64(self.timeout.max(0.0)))
            .with_banner_timeout(Duration::from_secs_f64(self.banner_timeout.max(0.0)));
        if self.no_banner {
            config = config.without_banners();
        }
        if self.verbose {
            config = config.with_verbose();
        }

        // JSON output wants a clean stdout, so live progress lines are
        // routed to a discarding sink.
        let sink: Arc<dyn EventSink> = match self.output {
            OutputFormat::Plain => Arc::new(ConsoleReporter::new(&self.target, !self.no_color)),
            OutputFormat::Json => Arc::new(NullSink),
        };

        // Resolve up front so a bad target fails before anything prints,
        // and so the header can show the address the workers will use.
        let ip = crate::resolve::resolve_target(&self.target).await?;
        if self.output == OutputFormat::Plain {
            output::print_scan_header(&config, ip);
        }

        let report = scanner::scan_resolved(config, ip, sink).await;
        output::print_report(&report, self.output);

        Ok(())
    }
}
