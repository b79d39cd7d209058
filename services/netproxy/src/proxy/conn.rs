//! Connection ownership wrapper.

use std::net::SocketAddr;

use tokio::net::TcpStream;

/// An established bidirectional byte channel.
///
/// The wrapper owns its stream from the moment the socket is connected and
/// is consumed by move when a relay takes over, so a stream can never be
/// wired into two relays or observed half set up. Dropping an unconsumed
/// connection closes the socket.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Wraps a connected stream together with its remote address.
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    /// Remote address of this connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Consumes the wrapper, handing the stream to its final owner.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
