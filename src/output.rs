//! Console reporting.
//!
//! `ConsoleReporter` is the event sink handed to the scan engine: it
//! renders per-port progress lines as workers emit them. Each event is
//! written under a single stdout lock so one port's output never
//! interleaves with another's.

use crate::cli::OutputFormat;
use crate::scanner::{EventSink, ScanConfig, ScanEvent, ScanReport};
use console::style;
use std::io::{self, Write};
use std::net::IpAddr;

/// Event sink that prints colored per-port lines to stdout.
pub struct ConsoleReporter {
    target: String,
    color: bool,
}

impl ConsoleReporter {
    pub fn new(target: impl Into<String>, color: bool) -> Self {
        Self {
            target: target.into(),
            color,
        }
    }
}

impl EventSink for ConsoleReporter {
    fn emit(&self, event: &ScanEvent) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // Write errors on stdout are not worth failing a scan over.
        let _ = match event {
            ScanEvent::PortOpen(result) => {
                let mut line = if self.color {
                    format!(
                        "{}",
                        style(format!("[+] {}:{} OPEN", self.target, result.port))
                            .green()
                            .bold()
                    )
                } else {
                    format!("[+] {}:{} OPEN", self.target, result.port)
                };
                if let Some(banner) = &result.banner {
                    if self.color {
                        line.push_str(&format!(" {}", style(format!("— {}", banner)).yellow()));
                    } else {
                        line.push_str(&format!(" — {}", banner));
                    }
                }
                if self.color {
                    line.push_str(&format!(" {}", style(format!("[{}]", result.service)).yellow()));
                } else {
                    line.push_str(&format!(" [{}]", result.service));
                }
                writeln!(out, "{}", line)
            }
            ScanEvent::PortClosed { port } => {
                let line = format!("[-] {}:{} closed/filtered", self.target, port);
                if self.color {
                    writeln!(out, "{}", style(line).red())
                } else {
                    writeln!(out, "{}", line)
                }
            }
            ScanEvent::PortError { port, reason } => {
                let line = format!("[!] {}:{} error: {}", self.target, port, reason);
                if self.color {
                    writeln!(out, "{}", style(line).red())
                } else {
                    writeln!(out, "{}", line)
                }
            }
        };
    }
}

/// Print the pre-scan header.
pub fn print_scan_header(config: &ScanConfig, ip: IpAddr) {
    println!("[*] Scanning {} ({})", config.target, ip);
    println!(
        "[*] Ports: {}  Workers: {}  Banner-grab: {}",
        config.ports.summary(),
        config.workers,
        config.grab_banners
    );
    println!(
        "[*] Started at: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}

/// Print the post-scan summary.
pub fn print_summary(report: &ScanReport) {
    println!(
        "\n[*] Scan finished at: {}",
        report.finished_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "[*] {} open of {} scanned on {}",
        report.open.len(),
        report.ports_scanned,
        report.ip
    );
}

/// Render the final report in the requested format.
pub fn print_report(report: &ScanReport, format: OutputFormat) {
    match format {
        OutputFormat::Plain => print_summary(report),
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => print_error(&format!("could not serialize report: {}", e)),
        },
    }
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}
