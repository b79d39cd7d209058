//! Connection relay engine.
//!
//! This module provides:
//! - Single-destination TCP dialing
//! - Destination racing (first successful connect wins)
//! - Bidirectional byte relaying with ordered teardown
//! - Listener management and per-connection task dispatch
//!
//! ## Architecture
//!
//! ```text
//! Client -> RelayListener -> connect_any -> [dial D1, dial D2, ...]
//!                 |                                |
//!                 +--------- relay <--- winning Connection
//! ```
//!
//! Losing dials are closed as soon as a winner exists. If every dial fails,
//! the accepted connection is closed and the failure is reported for that
//! one connection; the listener keeps accepting.

mod conn;
mod dial;
mod error;
mod listener;
mod race;
mod relay;

pub use conn::Connection;
pub use dial::dial;
pub use error::{DialError, ListenError, RaceFailure, RelayError};
pub use listener::{ListenerStats, RelayListener};
pub use race::connect_any;
pub use relay::relay;
