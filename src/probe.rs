//! Banner acquisition for open TCP connections.
//!
//! The prober runs a small state machine against an established stream:
//!
//! 1. Passive read: services like FTP, SMTP, MySQL, and SSH greet
//!    unsolicited, so the first half of the banner budget is spent just
//!    listening.
//! 2. Active probe: if nothing arrived, a lightweight protocol-specific
//!    payload is sent to coax a response. FTP-like and MySQL-like ports
//!    deliberately send nothing; they either greeted already or greet
//!    lazily on their own schedule.
//! 3. Second read with the remaining half of the budget.
//! 4. Decode: lossy UTF-8, trimmed. No bytes means no banner.
//!
//! Every send or receive failure in here is swallowed; the prober always
//! completes with whatever it managed to capture.

use crate::services::service_hint;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Receive buffer size for a single banner read.
const RECV_BUF_SIZE: usize = 2048;

/// Maximum banner length retained in a scan result, in characters.
pub const MAX_BANNER_LEN: usize = 200;

// Probe payloads must match these exact bytes, line terminators
// included; servers expecting these greetings are picky about them.
const HTTP_PROBE: &[u8] = b"GET / HTTP/1.0\r\nHost: localhost\r\n\r\n";
const SMTP_PROBE: &[u8] = b"HELO example.com\r\n";
const CRLF_PROBE: &[u8] = b"\r\n";

/// Attempt to capture a service banner from an open stream.
///
/// `budget` is the total banner timeout, split evenly between the
/// passive and active read phases. Returns `None` when nothing useful
/// was captured.
pub async fn grab_banner(stream: &mut TcpStream, port: u16, budget: Duration) -> Option<String> {
    let phase = budget / 2;
    let mut buf = vec![0u8; RECV_BUF_SIZE];

    let mut n = read_with_timeout(stream, &mut buf, phase).await;
    if n == 0 {
        if let Some(payload) = probe_payload(port) {
            // A failed send is not fatal; the follow-up read may still
            // catch a late unsolicited greeting.
            let _ = stream.write_all(payload).await;
        }
        n = read_with_timeout(stream, &mut buf, phase).await;
    }

    decode_banner(&buf[..n])
}

/// Read once with a timeout, treating any failure as zero bytes.
async fn read_with_timeout(stream: &mut TcpStream, buf: &mut [u8], window: Duration) -> usize {
    match timeout(window, stream.read(buf)).await {
        Ok(Ok(n)) => n,
        _ => 0,
    }
}

/// Select the probe payload for a port, or `None` for services that are
/// expected to greet on their own.
fn probe_payload(port: u16) -> Option<&'static [u8]> {
    let hint = service_hint(port).unwrap_or("");
    if hint.contains("http") || matches!(port, 80 | 8080 | 8000 | 8888) {
        Some(HTTP_PROBE)
    } else if hint.contains("smtp") || matches!(port, 25 | 587) {
        Some(SMTP_PROBE)
    } else if hint.contains("ftp") || matches!(port, 20 | 21) {
        None
    } else if hint.contains("mysql") || port == 3306 {
        None
    } else {
        // A bare newline encourages simple text protocols to respond.
        Some(CRLF_PROBE)
    }
}

/// Decode captured bytes into a banner string.
///
/// Invalid UTF-8 sequences are replaced rather than rejected. An empty
/// capture, or one that trims down to nothing, is reported as absence.
fn decode_banner(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(data).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Clip a banner to [`MAX_BANNER_LEN`] characters for storage/display.
pub fn clip_banner(banner: String) -> String {
    if banner.chars().count() <= MAX_BANNER_LEN {
        banner
    } else {
        banner.chars().take(MAX_BANNER_LEN).collect()
    }
}
