//! TCP listener and per-connection relay dispatch.
//!
//! Each configured listen endpoint gets one listener. The accept loop
//! spawns an independent task per connection: race the rule's destinations,
//! then relay bytes both ways. Connection failures are reported and stay
//! contained to that connection; a bind or accept error stops only the
//! listener it happened on.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use netproxy_addr::Endpoint;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, Instrument};

use super::conn::Connection;
use super::error::{ListenError, RelayError};
use super::race::connect_any;
use super::relay::relay;

/// Statistics for a listener.
#[derive(Debug, Default)]
pub struct ListenerStats {
    /// Total connections accepted.
    pub connections_accepted: AtomicU64,
    /// Connections currently being relayed.
    pub connections_active: AtomicU64,
    /// Connections that ended in an error (race or stream).
    pub connections_failed: AtomicU64,
    /// Bytes relayed toward destinations.
    pub bytes_to_dest: AtomicU64,
    /// Bytes relayed back to clients.
    pub bytes_from_dest: AtomicU64,
}

/// A bound relay listener tied to one destination set.
pub struct RelayListener {
    /// Listen endpoint with the actually-bound port filled in.
    listen: Endpoint,
    /// The TCP listener.
    listener: TcpListener,
    /// Fully resolved destinations raced for every accepted connection.
    destinations: Vec<Endpoint>,
    /// Statistics.
    stats: Arc<ListenerStats>,
}

impl RelayListener {
    /// Binds a listener for `listen` and fixes its destination set.
    ///
    /// A listen endpoint without a port binds ephemerally. Destinations
    /// still missing a port inherit the port the socket actually bound,
    /// so the set handed to every relay is fully resolved.
    pub async fn bind(listen: &Endpoint, destinations: &[Endpoint]) -> Result<Self, ListenError> {
        if !listen.is_tcp() {
            return Err(ListenError::UnsupportedProtocol {
                endpoint: listen.to_string(),
            });
        }

        let port = listen.port.unwrap_or(0);
        let listener = TcpListener::bind((listen.host.as_str(), port))
            .await
            .map_err(|source| ListenError::Bind {
                endpoint: listen.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ListenError::Bind {
            endpoint: listen.to_string(),
            source,
        })?;

        let destinations = destinations
            .iter()
            .map(|dest| {
                if dest.port.is_none() && dest.is_tcp() {
                    dest.with_port(local_addr.port())
                } else {
                    dest.clone()
                }
            })
            .collect();

        info!(bind_addr = %local_addr, "Listener bound");

        Ok(Self {
            listen: listen.with_port(local_addr.port()),
            listener,
            destinations,
            stats: Arc::new(ListenerStats::default()),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The listen endpoint, with the bound port substituted in.
    pub fn listen(&self) -> &Endpoint {
        &self.listen
    }

    /// The resolved destination set raced for every connection.
    pub fn destinations(&self) -> &[Endpoint] {
        &self.destinations
    }

    /// Get listener statistics.
    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    /// Run the listener, accepting and relaying connections.
    ///
    /// Returns when accepting fails; other listeners are unaffected.
    pub async fn run(self: Arc<Self>) -> io::Result<()> {
        info!(listen = %self.listen, "Listener started");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    self.stats
                        .connections_accepted
                        .fetch_add(1, Ordering::Relaxed);
                    self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

                    let listener = Arc::clone(&self);
                    tokio::spawn(
                        async move {
                            if let Err(e) = listener.handle_connection(stream, peer_addr).await {
                                listener
                                    .stats
                                    .connections_failed
                                    .fetch_add(1, Ordering::Relaxed);
                                error!(peer_addr = %peer_addr, error = %e, "Connection failed");
                            }
                            listener
                                .stats
                                .connections_active
                                .fetch_sub(1, Ordering::Relaxed);
                        }
                        .instrument(tracing::info_span!("connection", peer = %peer_addr)),
                    );
                }
                Err(e) => {
                    error!(listen = %self.listen, error = %e, "Accept error, listener stopping");
                    return Err(e);
                }
            }
        }
    }

    /// Handle a single accepted connection.
    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), RelayError> {
        debug!(peer_addr = %peer_addr, "Handling connection");

        let source = Connection::new(stream, peer_addr);
        let (bytes_to_dest, bytes_from_dest) =
            relay(source, connect_any(&self.destinations)).await?;

        self.stats
            .bytes_to_dest
            .fetch_add(bytes_to_dest, Ordering::Relaxed);
        self.stats
            .bytes_from_dest
            .fetch_add(bytes_from_dest, Ordering::Relaxed);

        debug!(
            bytes_to_dest = bytes_to_dest,
            bytes_from_dest = bytes_from_dest,
            "Connection closed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_resolves_portless_destinations() {
        let listen = Endpoint::parse("tcp://[::1]:0").unwrap();
        let destinations = [
            Endpoint::parse("tcp://[::1]").unwrap(),
            Endpoint::parse("tcp://[::1]:9").unwrap(),
        ];

        let listener = RelayListener::bind(&listen, &destinations).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert_eq!(listener.destinations()[0].port, Some(port));
        assert_eq!(listener.destinations()[1].port, Some(9));
        assert_eq!(listener.listen().port, Some(port));
    }

    #[tokio::test]
    async fn test_bind_rejects_non_tcp_listen() {
        let listen = Endpoint::parse("udp://[::1]:0").unwrap();
        let destinations = [Endpoint::parse("tcp://[::1]:9").unwrap()];

        let result = RelayListener::bind(&listen, &destinations).await;
        assert!(matches!(
            result,
            Err(ListenError::UnsupportedProtocol { .. })
        ));
    }

    #[test]
    fn test_listener_stats() {
        let stats = ListenerStats::default();
        stats.connections_accepted.fetch_add(1, Ordering::Relaxed);
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
    }
}
