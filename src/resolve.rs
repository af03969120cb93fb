//! Target resolution.
//!
//! Turns a hostname or literal IP string into the single address used
//! for every connection in the scan. Resolution happens exactly once per
//! run; a failure here aborts the scan before any port is probed.

use crate::error::ScanError;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolve a target string to a single IP address.
///
/// Literal IPs (IPv4 or IPv6) short-circuit without a DNS round trip.
/// Hostnames get one forward lookup and the first returned address wins.
pub async fn resolve_target(target: &str) -> Result<IpAddr, ScanError> {
    let target = target.trim();

    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let lookup = resolver
        .lookup_ip(target)
        .await
        .map_err(|e| ScanError::Resolution {
            target: target.to_string(),
            reason: e.to_string(),
        })?;

    lookup
        .iter()
        .next()
        .ok_or_else(|| ScanError::NoAddresses(target.to_string()))
}
