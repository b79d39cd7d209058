//! Single-destination dialing.

use netproxy_addr::Endpoint;
use tokio::net::TcpStream;

use super::conn::Connection;
use super::error::DialError;

/// Attempts one outbound TCP connection to `endpoint`.
///
/// Non-tcp schemes and portless endpoints fail before any I/O happens. The
/// dialer performs no logging and applies no timeout of its own; callers
/// own both concerns.
pub async fn dial(endpoint: &Endpoint) -> Result<Connection, DialError> {
    if !endpoint.is_tcp() {
        return Err(DialError::UnsupportedProtocol {
            endpoint: endpoint.to_string(),
        });
    }
    let Some(port) = endpoint.port else {
        return Err(DialError::MissingPort {
            endpoint: endpoint.to_string(),
        });
    };

    let stream = TcpStream::connect((endpoint.host.as_str(), port))
        .await
        .map_err(|source| DialError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
    let peer = stream.peer_addr().map_err(|source| DialError::Connect {
        endpoint: endpoint.to_string(),
        source,
    })?;

    Ok(Connection::new(stream, peer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unsupported_protocol() {
        let endpoint = Endpoint::parse("udp://[::1]:9000").unwrap();
        let result = dial(&endpoint).await;
        assert!(matches!(
            result,
            Err(DialError::UnsupportedProtocol { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_missing_port() {
        let endpoint = Endpoint::parse("tcp://[::1]").unwrap();
        let result = dial(&endpoint).await;
        assert!(matches!(result, Err(DialError::MissingPort { .. })));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind a listener to find a free port, then close it.
        let probe = tokio::net::TcpListener::bind("[::1]:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let endpoint = Endpoint::parse(&format!("tcp://[::1]:{port}")).unwrap();
        let result = dial(&endpoint).await;
        assert!(matches!(result, Err(DialError::Connect { .. })));
    }

    #[tokio::test]
    async fn test_connect_success() {
        let listener = tokio::net::TcpListener::bind("[::1]:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let endpoint = Endpoint::parse(&format!("tcp://[::1]:{port}")).unwrap();
        let connection = dial(&endpoint).await.unwrap();
        assert_eq!(connection.peer_addr().port(), port);
    }
}
