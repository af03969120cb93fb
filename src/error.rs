//! Error types for spyglass.
//!
//! Uses `thiserror` for ergonomic error definitions.
//!
//! The taxonomy is deliberately small: a scan can only abort before any
//! network activity happens, either because the port specification was
//! malformed or because the target did not resolve. Everything that goes
//! wrong for an individual port is contained to that port and never
//! propagates out of the worker that hit it.

use crate::ports::PortSpecError;
use thiserror::Error;

/// Fatal errors that abort a scan before the worker pool starts.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The port specification could not be parsed.
    #[error("invalid port specification: {0}")]
    Ports(#[from] PortSpecError),

    /// The target hostname could not be resolved.
    #[error("could not resolve '{target}': {reason}")]
    Resolution { target: String, reason: String },

    /// Resolution succeeded but returned no addresses.
    #[error("no addresses found for '{0}'")]
    NoAddresses(String),
}

/// Failure while connecting to or probing a single port.
///
/// These never escape the worker loop: the worker reports the outcome
/// (when verbose) and moves on to the next task. Modeling them as an
/// explicit error type keeps the ignore-and-continue policy visible at
/// the call site instead of hidden behind a blanket catch.
#[derive(Error, Debug)]
pub enum PortProbeError {
    #[error("i/o error on port {port}: {source}")]
    Io {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for scan-level operations.
pub type ScanResult<T> = Result<T, ScanError>;
