//! Service classification from banner content and port hints.
//!
//! Banner signatures take priority over the port table: a service that
//! identifies itself wins regardless of which port it runs on. The
//! signature order is fixed and first match wins, so a banner containing
//! both "ssh" and "http" classifies as ssh.

use crate::services::service_hint;

/// Ordered banner signatures. Each entry maps a set of case-insensitive
/// substrings to a service label.
const BANNER_SIGNATURES: &[(&[&str], &str)] = &[
    (&["ssh"], "ssh"),
    (&["http", "html", "apache", "nginx"], "http"),
    (&["smtp", "esmtp"], "smtp"),
    (&["ftp"], "ftp"),
    (&["mysql", "mariadb"], "mysql"),
    (&["rdp", "microsoft"], "rdp"),
    (&["vnc"], "vnc"),
    (&["pop3"], "pop3"),
    (&["imap"], "imap"),
];

/// Best-guess service label for a port given an optional banner.
///
/// Falls back to the well-known port table when no signature matches,
/// and to "unknown" when the port is unmapped too.
pub fn classify(port: u16, banner: Option<&str>) -> &'static str {
    if let Some(banner) = banner {
        let lower = banner.to_lowercase();
        for (needles, label) in BANNER_SIGNATURES {
            if needles.iter().any(|n| lower.contains(n)) {
                return label;
            }
        }
    }
    service_hint(port).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_wins_over_port() {
        // An SSH banner on a non-SSH port still classifies as ssh.
        assert_eq!(classify(2222, Some("SSH-2.0-OpenSSH_8.2")), "ssh");
        assert_eq!(classify(80, Some("SSH-2.0-OpenSSH_8.2")), "ssh");
    }

    #[test]
    fn test_signature_matching() {
        assert_eq!(classify(9999, Some("Apache/2.4.41 (Ubuntu)")), "http");
        assert_eq!(classify(9999, Some("<html><body>")), "http");
        assert_eq!(classify(9999, Some("220 mail ESMTP Postfix")), "smtp");
        assert_eq!(classify(9999, Some("220 ProFTPD Server")), "ftp");
        assert_eq!(classify(9999, Some("5.7.42-MariaDB")), "mysql");
        assert_eq!(classify(9999, Some("RFB 003.008 VNC")), "vnc");
        assert_eq!(classify(9999, Some("+OK POP3 ready")), "pop3");
        assert_eq!(classify(9999, Some("* OK IMAP4rev1")), "imap");
    }

    #[test]
    fn test_signature_order_is_fixed() {
        // "ssh" is checked before "http".
        assert_eq!(classify(9999, Some("ssh over http tunnel")), "ssh");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify(9999, Some("NGINX/1.18.0")), "http");
    }

    #[test]
    fn test_port_fallback() {
        assert_eq!(classify(22, None), "ssh");
        assert_eq!(classify(443, None), "https");
        assert_eq!(classify(3389, None), "rdp");
        // Banner with no recognizable signature also falls back.
        assert_eq!(classify(22, Some("hello there")), "ssh");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify(9999, None), "unknown");
        assert_eq!(classify(9999, Some("garbage")), "unknown");
    }
}
