//! End-to-end scan tests against real loopback listeners.
//!
//! Completion order of results is unspecified, so assertions compare
//! port sets, never sequences.

use spyglass::scanner::{run_scan, EventSink, NullSink, ScanConfig, ScanEvent};
use spyglass::PortSet;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Event sink that records everything it sees.
#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<ScanEvent>>,
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &ScanEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Start a listener that accepts connections and optionally greets each
/// one with `banner`. Returns the bound port; the accept loop runs for
/// the rest of the test.
async fn spawn_listener(banner: Option<&'static [u8]>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                if let Some(banner) = banner {
                    let _ = sock.write_all(banner).await;
                }
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(sock);
            });
        }
    });

    port
}

/// Reserve a port that nothing listens on by binding and dropping.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn config_for(ports: &[u16], workers: usize) -> ScanConfig {
    let spec = ports
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let ports: PortSet = spec.parse().unwrap();
    ScanConfig::new("127.0.0.1", ports)
        .with_workers(workers)
        .with_connect_timeout(Duration::from_millis(300))
        .with_banner_timeout(Duration::from_millis(300))
}

#[tokio::test]
async fn open_and_closed_ports_are_separated() {
    let open = vec![
        spawn_listener(None).await,
        spawn_listener(None).await,
        spawn_listener(None).await,
    ];
    let closed = vec![closed_port().await, closed_port().await];

    let mut all: Vec<u16> = open.iter().chain(closed.iter()).copied().collect();
    all.sort_unstable();

    let config = config_for(&all, 10);
    let results = run_scan(config, LOCALHOST, Arc::new(NullSink)).await;

    let found: BTreeSet<u16> = results.iter().map(|r| r.port).collect();
    let expected: BTreeSet<u16> = open.iter().copied().collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn no_results_lost_across_pool_sizes() {
    let open = vec![
        spawn_listener(None).await,
        spawn_listener(None).await,
        spawn_listener(None).await,
        spawn_listener(None).await,
    ];
    let closed = vec![closed_port().await, closed_port().await];
    let all: Vec<u16> = open.iter().chain(closed.iter()).copied().collect();

    for workers in [1, 10, 100] {
        let config = config_for(&all, workers);
        let results = run_scan(config, LOCALHOST, Arc::new(NullSink)).await;
        assert_eq!(
            results.len(),
            open.len(),
            "lost results with {} workers",
            workers
        );
    }
}

#[tokio::test]
async fn banner_drives_classification() {
    let port = spawn_listener(Some(b"SSH-2.0-OpenSSH_8.2\r\n")).await;

    let config = config_for(&[port], 1);
    let results = run_scan(config, LOCALHOST, Arc::new(NullSink)).await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.service, "ssh");
    assert_eq!(result.banner.as_deref(), Some("SSH-2.0-OpenSSH_8.2"));
}

#[tokio::test]
async fn silent_unmapped_port_is_unknown() {
    let port = spawn_listener(None).await;

    let config = config_for(&[port], 1);
    let results = run_scan(config, LOCALHOST, Arc::new(NullSink)).await;

    assert_eq!(results.len(), 1);
    // An ephemeral port with no banner has nothing to classify from.
    assert_eq!(results[0].service, "unknown");
    assert_eq!(results[0].banner, None);
}

#[tokio::test]
async fn verbose_emits_closed_events() {
    let open = vec![spawn_listener(None).await];
    let closed = vec![closed_port().await, closed_port().await];
    let all: Vec<u16> = open.iter().chain(closed.iter()).copied().collect();

    let sink = Arc::new(CollectingSink::default());
    let config = config_for(&all, 5).with_verbose();
    let results = run_scan(config, LOCALHOST, sink.clone()).await;

    assert_eq!(results.len(), 1);

    let events = sink.events.lock().unwrap();
    let open_events = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::PortOpen(_)))
        .count();
    let closed_events = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::PortClosed { .. }))
        .count();
    assert_eq!(open_events, 1);
    assert_eq!(closed_events, closed.len());
}

#[tokio::test]
async fn disabled_banner_grab_still_reports_open() {
    let port = spawn_listener(Some(b"SSH-2.0-OpenSSH_8.2\r\n")).await;

    let config = config_for(&[port], 1).without_banners();
    let results = run_scan(config, LOCALHOST, Arc::new(NullSink)).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].banner, None);
}
