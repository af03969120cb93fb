//! Well-known port to service hints.
//!
//! One static table serves two purposes: picking a protocol probe for a
//! port that stays silent after connect, and providing the fallback
//! service label when a banner yields no signature match.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Static map of well-known ports to service names.
static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(20, "ftp-data");
    m.insert(21, "ftp");
    m.insert(22, "ssh");
    m.insert(23, "telnet");
    m.insert(25, "smtp");
    m.insert(53, "dns");
    m.insert(67, "dhcp");
    m.insert(69, "tftp");
    m.insert(80, "http");
    m.insert(110, "pop3");
    m.insert(111, "rpcbind");
    m.insert(123, "ntp");
    m.insert(135, "msrpc");
    m.insert(139, "netbios-ssn");
    m.insert(143, "imap");
    m.insert(161, "snmp");
    m.insert(389, "ldap");
    m.insert(443, "https");
    m.insert(445, "microsoft-ds");
    m.insert(587, "smtp-submission");
    m.insert(631, "ipp");
    m.insert(3306, "mysql");
    m.insert(3389, "rdp");
    m.insert(5900, "vnc");
    m.insert(8080, "http-alt");
    m.insert(8443, "https-alt");

    m
});

/// Look up the probable service name for a given port.
///
/// Returns `None` if the port is not in the well-known services table.
pub fn service_hint(port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&port).copied()
}
