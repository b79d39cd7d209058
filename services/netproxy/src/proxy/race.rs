//! Destination racing.

use futures_util::stream::{FuturesUnordered, StreamExt};
use netproxy_addr::Endpoint;

use super::conn::Connection;
use super::dial::dial;
use super::error::{DialError, RaceFailure};

/// Dials every destination concurrently and returns the first success.
///
/// Losing attempts are dropped as soon as a winner exists, which aborts
/// dials still in flight and closes any socket that connected after the
/// winner. When every destination fails, the failures come back ordered by
/// destination position regardless of completion order.
pub async fn connect_any(destinations: &[Endpoint]) -> Result<Connection, RaceFailure> {
    debug_assert!(
        !destinations.is_empty(),
        "connect_any requires at least one destination"
    );

    let mut attempts: FuturesUnordered<_> = destinations
        .iter()
        .enumerate()
        .map(|(index, endpoint)| async move { (index, dial(endpoint).await) })
        .collect();

    let mut failures: Vec<(usize, DialError)> = Vec::new();
    while let Some((index, outcome)) = attempts.next().await {
        match outcome {
            Ok(connection) => return Ok(connection),
            Err(error) => failures.push((index, error)),
        }
    }

    failures.sort_by_key(|(index, _)| *index);
    Err(RaceFailure::new(
        failures.into_iter().map(|(_, error)| error).collect(),
    ))
}
