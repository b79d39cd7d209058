//! Protocol default-port table.

/// Returns the well-known port for a protocol scheme, if one is defined.
///
/// The table is consulted with the scheme as written in the specifier,
/// before `tcpip` → `tcp` normalization. There is deliberately no entry
/// for `tcp`: a portless tcp destination inherits the listener's bound
/// port instead of a table default.
pub fn default_port(scheme: &str) -> Option<u16> {
    let port = match scheme {
        "ftp" => 21,
        "ssh" => 22,
        "telnet" => 23,
        "smtp" => 25,
        "domain" => 53,
        "http" => 80,
        "ws" => 80,
        "pop3" => 110,
        "nntp" => 119,
        "imap" => 143,
        "ldap" => 389,
        "https" => 443,
        "wss" => 443,
        "rtsp" => 554,
        "ldaps" => 636,
        "imaps" => 993,
        "pop3s" => 995,
        "socks" => 1080,
        "mysql" => 3306,
        "postgres" => 5432,
        "redis" => 6379,
        _ => return None,
    };
    Some(port)
}
