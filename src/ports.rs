//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers
//! (1-65535). `PortSet` parses a textual specification of singletons and
//! ranges into a sorted, deduplicated sequence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values and
/// ensures port numbers are always in the valid TCP range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port specification parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortSpecError {
    #[error("invalid port number: {0:?}")]
    InvalidNumber(String),
    #[error("malformed range: {0:?}")]
    MalformedRange(String),
    #[error("empty port specification")]
    Empty,
}

/// A deduplicated, ascending set of ports parsed from a specification.
///
/// Supported formats:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1000" (inclusive; reversed bounds are swapped)
/// - Mixed: "22,80,443,8000-9000"
///
/// Whitespace around tokens is ignored and empty tokens are skipped.
/// Values outside 1-65535 are dropped after parsing rather than treated
/// as errors, so "80,70000" yields just port 80.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// All ports in ascending order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Number of ports in the set.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Iterate over the raw port numbers.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().map(|p| p.as_u16())
    }

    /// Compact human-readable summary of the set.
    ///
    /// Large sets collapse to "min-max (N ports)" so scan headers stay
    /// on one line.
    pub fn summary(&self) -> String {
        if self.ports.len() > 40 {
            let lo = self.ports.first().map_or(0, |p| p.as_u16());
            let hi = self.ports.last().map_or(0, |p| p.as_u16());
            format!("{}-{} ({} ports)", lo, hi, self.ports.len())
        } else {
            self.ports
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

impl FromStr for PortSet {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PortSpecError::Empty);
        }

        // Parse into u32 first so out-of-range values can be filtered
        // instead of failing the whole specification.
        let mut seen: BTreeSet<u32> = BTreeSet::new();

        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            if let Some((a, b)) = token.split_once('-') {
                let start: u32 = a
                    .trim()
                    .parse()
                    .map_err(|_| PortSpecError::MalformedRange(token.to_string()))?;
                let end: u32 = b
                    .trim()
                    .parse()
                    .map_err(|_| PortSpecError::MalformedRange(token.to_string()))?;
                // Reversed bounds are swapped, not rejected.
                let (start, end) = if start > end { (end, start) } else { (start, end) };
                // Expanding past the valid port span would only produce
                // values the filter below drops anyway.
                let end = end.min(u32::from(Port::MAX));
                if start <= end {
                    seen.extend(start..=end);
                }
            } else {
                let port: u32 = token
                    .parse()
                    .map_err(|_| PortSpecError::InvalidNumber(token.to_string()))?;
                seen.insert(port);
            }
        }

        let ports = seen
            .into_iter()
            .filter(|&p| p > 0 && p <= u32::from(Port::MAX))
            .map(|p| Port(p as u16))
            .collect();

        Ok(Self { ports })
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
