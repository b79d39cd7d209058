//! # netproxy-addr
//!
//! Endpoint records and specifier parsing for the netproxy relay.
//!
//! ## Design Principles
//!
//! - Specifiers are normalized into a structured record once, at config load
//! - Records are immutable; overriding a port clones instead of mutating
//! - Formatting round-trips: parse → format → parse preserves the
//!   protocol/host/port triple
//!
//! ## Specifier Grammar
//!
//! A specifier is resolved in stages:
//!
//! 1. A bare integer means "all interfaces on that port": `8080` reads as
//!    `[::]:8080`
//! 2. A string without `://` is treated as TCP: `example.com:80` reads as
//!    `tcp://example.com:80`
//! 3. Anything else is parsed as a URL, keeping protocol, auth, host, port,
//!    path, query, and fragment
//! 4. A missing port is filled from a protocol default (`http` → 80,
//!    `redis` → 6379, ...) where one exists
//! 5. The legacy `tcpip` scheme is normalized to `tcp`
//!
//! Examples:
//! - `8080` → `tcp://[::]:8080`
//! - `localhost:25` → `tcp://localhost:25`
//! - `http://example.com` → `http://example.com:80/`
//! - `tcpip://10.0.0.1:9000` → `tcp://10.0.0.1:9000`

mod endpoint;
mod error;
mod ports;

pub use endpoint::Endpoint;
pub use error::AddrError;
pub use ports::default_port;
