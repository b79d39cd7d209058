//! Error types for the relay engine.

use std::fmt;
use std::io;

use thiserror::Error;

/// A single destination connection attempt that failed.
#[derive(Debug, Error)]
pub enum DialError {
    /// The endpoint names a protocol the dialer cannot handle.
    #[error("unsupported protocol in {endpoint}")]
    UnsupportedProtocol { endpoint: String },

    /// The endpoint has no resolved port to connect to.
    #[error("no port resolved for {endpoint}")]
    MissingPort { endpoint: String },

    /// The connection attempt itself failed.
    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

/// Every destination in a race failed.
///
/// The individual failures are ordered by destination position, so the
/// first element is the first destination's failure and serves as the
/// representative cause.
#[derive(Debug)]
pub struct RaceFailure {
    failures: Vec<DialError>,
}

impl RaceFailure {
    pub(crate) fn new(failures: Vec<DialError>) -> Self {
        Self { failures }
    }

    /// The individual failures, ordered by destination position.
    pub fn failures(&self) -> &[DialError] {
        &self.failures
    }
}

impl fmt::Display for RaceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.first() {
            Some(first) if self.failures.len() == 1 => {
                write!(f, "destination dial failed: {first}")
            }
            Some(first) => write!(
                f,
                "all {} destination dials failed; first: {first}",
                self.failures.len()
            ),
            None => f.write_str("no destinations to dial"),
        }
    }
}

impl std::error::Error for RaceFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A relay attempt that ended in failure.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No destination could be connected; nothing was relayed.
    #[error(transparent)]
    Race(#[from] RaceFailure),

    /// An established stream errored while bytes were being copied.
    #[error("stream failed during relay: {0}")]
    Stream(#[from] io::Error),
}

/// A listener that could not be established.
#[derive(Debug, Error)]
pub enum ListenError {
    /// The listen endpoint names a protocol that cannot be bound.
    #[error("unsupported protocol in {endpoint}")]
    UnsupportedProtocol { endpoint: String },

    /// Binding the listen address failed.
    #[error("bind to {endpoint} failed: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}
