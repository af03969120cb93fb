//! # Spyglass - A Concurrent TCP Connect Scanner
//!
//! Spyglass scans a host over a configurable port set with a bounded
//! pool of concurrent workers, opportunistically grabs a service banner
//! from each open port, and classifies the service behind it from
//! banner content and well-known port hints.
//!
//! ## Features
//!
//! - **TCP connect scanning**: full handshake per port, no privileges needed
//! - **Bounded concurrency**: worker pool draining a shared task queue
//! - **Banner grabbing**: passive read, then a protocol-aware active probe
//! - **Service classification**: banner signatures with a port-table fallback
//! - **Pluggable reporting**: workers emit events into an injected sink
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use spyglass::scanner::{scan, NullSink, ScanConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ports = "22,80,443".parse().unwrap();
//!     let config = ScanConfig::new("scanme.example.com", ports).with_workers(50);
//!
//!     let report = scan(config, Arc::new(NullSink)).await.unwrap();
//!     for result in &report.open {
//!         println!("{} open [{}]", result.port, result.service);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ports`] - Port newtype and port-set specification parsing
//! - [`resolve`] - Target name resolution
//! - [`probe`] - Banner acquisition state machine
//! - [`classify`] - Service classification heuristic
//! - [`scanner`] - The scan coordinator: worker pool, queue, results
//! - [`output`] - Console reporter (event sink implementation)
//! - [`error`] - Error types

pub mod classify;
pub mod cli;
pub mod error;
pub mod output;
pub mod ports;
pub mod probe;
pub mod resolve;
pub mod scanner;
pub mod services;

// Re-export commonly used types
pub use error::{PortProbeError, ScanError};
pub use ports::{Port, PortSet};
pub use scanner::{EventSink, PortResult, ScanConfig, ScanEvent, ScanReport};
