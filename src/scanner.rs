//! Scan coordinator: worker pool, task queue, and result aggregation.
//!
//! The coordinator seeds a shared queue with one task per port, spawns a
//! bounded pool of workers that drain it, and blocks until every seeded
//! task has been processed. Workers retire on their own when the queue
//! runs dry; there are no shutdown sentinels. Completion order of the
//! result list is whatever order ports finished in, not seed order.
//!
//! Per-port failures are contained by policy: the worker loop consumes
//! an explicit `Result` per task and continues to the next task no
//! matter what came back.

use crate::classify::classify;
use crate::error::{PortProbeError, ScanError};
use crate::ports::PortSet;
use crate::probe::{clip_banner, grab_banner};
use crate::resolve::resolve_target;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 100;
/// Hard cap on the worker pool size.
pub const MAX_WORKERS: usize = 500;
/// Default per-port connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(600);
/// Default total banner-read budget per open port.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_millis(1500);
/// Floor applied to both timeouts.
const MIN_IO_TIMEOUT: Duration = Duration::from_millis(50);

/// Configuration for one scan run. Immutable once the scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target hostname or IP string, resolved once at scan start.
    pub target: String,
    /// Ports to scan, ascending and deduplicated.
    pub ports: PortSet,
    /// Worker pool size, clamped to [1, MAX_WORKERS].
    pub workers: usize,
    /// Connect timeout per port.
    pub connect_timeout: Duration,
    /// Total banner-read budget per open port.
    pub banner_timeout: Duration,
    /// Whether to probe open ports for banners.
    pub grab_banners: bool,
    /// Whether not-open ports and per-port errors are reported.
    pub verbose: bool,
}

impl ScanConfig {
    /// Create a configuration with default tuning.
    pub fn new(target: impl Into<String>, ports: PortSet) -> Self {
        Self {
            target: target.into(),
            ports,
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
            grab_banners: true,
            verbose: false,
        }
    }

    /// Set the worker pool size (clamped to [1, MAX_WORKERS]).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the connect timeout (floor-clamped).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout.max(MIN_IO_TIMEOUT);
        self
    }

    /// Set the banner-read budget (floor-clamped).
    pub fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout.max(MIN_IO_TIMEOUT);
        self
    }

    /// Disable banner grabbing.
    pub fn without_banners(mut self) -> Self {
        self.grab_banners = false;
        self
    }

    /// Enable verbose per-port reporting.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

/// Result for a single open port.
#[derive(Debug, Clone, Serialize)]
pub struct PortResult {
    pub port: u16,
    /// Best-guess service label, "unknown" when nothing matched.
    pub service: String,
    /// Captured banner, clipped for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// Aggregated outcome of a whole scan run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub ip: IpAddr,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ports_scanned: usize,
    /// Open ports in completion order.
    pub open: Vec<PortResult>,
}

/// Progress events emitted by workers as ports complete.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A port accepted the connection.
    PortOpen(PortResult),
    /// A port refused or timed out (only emitted when verbose).
    PortClosed { port: u16 },
    /// Probing a port failed outright (only emitted when verbose).
    PortError { port: u16, reason: String },
}

/// Sink for progress events, shared across all workers.
///
/// Implementations must serialize their own output; workers emit
/// concurrently.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ScanEvent);
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &ScanEvent) {}
}

/// Outcome of probing one port. Not-open lumps together refused,
/// timed out, and unreachable; finer diagnostics are out of scope.
enum PortOutcome {
    Open(PortResult),
    NotOpen,
}

/// State shared by the coordinator and every worker.
struct ScanContext {
    ip: IpAddr,
    config: ScanConfig,
    queue: Mutex<VecDeque<u16>>,
    results: Mutex<Vec<PortResult>>,
    completed: AtomicUsize,
    sink: Arc<dyn EventSink>,
}

/// Scan a target: resolve it, run the worker pool over the port set,
/// and return the aggregated report.
///
/// Fails only when the target cannot be resolved; that happens before
/// any port is touched.
pub async fn scan(config: ScanConfig, sink: Arc<dyn EventSink>) -> Result<ScanReport, ScanError> {
    let ip = resolve_target(&config.target).await?;
    Ok(scan_resolved(config, ip, sink).await)
}

/// Scan against an already-resolved address, skipping the DNS step.
///
/// Callers that resolved the target themselves (for example to print a
/// header first) use this so resolution still happens exactly once per
/// run.
pub async fn scan_resolved(config: ScanConfig, ip: IpAddr, sink: Arc<dyn EventSink>) -> ScanReport {
    let target = config.target.clone();
    let ports_scanned = config.ports.len();
    let started_at = Utc::now();
    info!(target = %target, ip = %ip, ports = ports_scanned, "starting scan");

    let open = run_scan(config, ip, sink).await;

    ScanReport {
        target,
        ip,
        started_at,
        finished_at: Utc::now(),
        ports_scanned,
        open,
    }
}

/// Run the worker pool against an already-resolved address.
pub async fn run_scan(config: ScanConfig, ip: IpAddr, sink: Arc<dyn EventSink>) -> Vec<PortResult> {
    let total = config.ports.len();
    // No point spawning more workers than there are tasks.
    let workers = config.workers.clamp(1, MAX_WORKERS).min(total.max(1));

    let ctx = Arc::new(ScanContext {
        ip,
        queue: Mutex::new(config.ports.iter().collect()),
        results: Mutex::new(Vec::new()),
        completed: AtomicUsize::new(0),
        sink,
        config,
    });

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        pool.spawn(worker_loop(Arc::clone(&ctx)));
    }

    // Completion barrier: workers only exit once the queue is empty, so
    // draining the pool means every seeded task was processed.
    while pool.join_next().await.is_some() {}

    let completed = ctx.completed.load(Ordering::Relaxed);
    debug_assert_eq!(completed, total);
    info!(total, completed, "scan complete");

    match Arc::try_unwrap(ctx) {
        Ok(ctx) => ctx.results.into_inner(),
        // Unreachable in practice: all workers were joined above.
        Err(ctx) => ctx.results.lock().await.clone(),
    }
}

/// Worker: pull ports off the shared queue until it runs dry.
async fn worker_loop(ctx: Arc<ScanContext>) {
    loop {
        let port = { ctx.queue.lock().await.pop_front() };
        let Some(port) = port else { break };

        match probe_port(ctx.ip, port, &ctx.config).await {
            Ok(PortOutcome::Open(result)) => {
                debug!(port, service = %result.service, "port open");
                ctx.sink.emit(&ScanEvent::PortOpen(result.clone()));
                ctx.results.lock().await.push(result);
            }
            Ok(PortOutcome::NotOpen) => {
                if ctx.config.verbose {
                    ctx.sink.emit(&ScanEvent::PortClosed { port });
                }
            }
            Err(e) => {
                // Contained: one bad port never stops the scan.
                debug!(port, error = %e, "probe failed");
                if ctx.config.verbose {
                    ctx.sink.emit(&ScanEvent::PortError {
                        port,
                        reason: e.to_string(),
                    });
                }
            }
        }

        ctx.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Probe a single port: connect, optionally grab a banner, classify.
///
/// Refusals, resets, and timeouts are ordinary not-open outcomes; only
/// unexpected I/O failures surface as errors, and the caller contains
/// those too.
async fn probe_port(
    ip: IpAddr,
    port: u16,
    config: &ScanConfig,
) -> Result<PortOutcome, PortProbeError> {
    let addr = SocketAddr::new(ip, port);

    match timeout(config.connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(mut stream)) => {
            let banner = if config.grab_banners {
                grab_banner(&mut stream, port, config.banner_timeout)
                    .await
                    .map(clip_banner)
            } else {
                None
            };
            let service = classify(port, banner.as_deref()).to_string();
            Ok(PortOutcome::Open(PortResult {
                port,
                service,
                banner,
            }))
        }
        Ok(Err(e)) => match e.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::TimedOut => Ok(PortOutcome::NotOpen),
            _ => Err(PortProbeError::Io { port, source: e }),
        },
        // Timer elapsed: not-open, same as a refusal. Closed and
        // filtered are deliberately not distinguished.
        Err(_) => Ok(PortOutcome::NotOpen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Instant;

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_config_clamping() {
        let ports: PortSet = "80".parse().unwrap();
        let config = ScanConfig::new("localhost", ports)
            .with_workers(10_000)
            .with_connect_timeout(Duration::from_millis(1))
            .with_banner_timeout(Duration::ZERO);

        assert_eq!(config.workers, MAX_WORKERS);
        assert_eq!(config.connect_timeout, Duration::from_millis(50));
        assert_eq!(config.banner_timeout, Duration::from_millis(50));

        let ports: PortSet = "80".parse().unwrap();
        let config = ScanConfig::new("localhost", ports).with_workers(0);
        assert_eq!(config.workers, 1);
    }

    #[tokio::test]
    async fn test_closed_port_is_not_open() {
        let config = ScanConfig::new("127.0.0.1", "1".parse().unwrap())
            .with_connect_timeout(Duration::from_millis(200));

        let outcome = probe_port(localhost(), 1, &config).await.unwrap();
        assert!(matches!(outcome, PortOutcome::NotOpen));
    }

    #[tokio::test]
    async fn test_closed_port_completes_within_timeout() {
        let config = ScanConfig::new("127.0.0.1", "1".parse().unwrap())
            .with_connect_timeout(Duration::from_millis(200));

        let start = Instant::now();
        let _ = probe_port(localhost(), 1, &config).await;
        // Connect timeout plus a generous scheduling epsilon.
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_port_set_completes() {
        let ports = PortSet::default();
        let config = ScanConfig::new("127.0.0.1", ports);
        let results = run_scan(config, localhost(), Arc::new(NullSink)).await;
        assert!(results.is_empty());
    }
}
