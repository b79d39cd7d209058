
use std::time::Duration;

use harness::dead_endpoint;
use netproxy::{connect_any, relay, Connection, RaceFailure, RelayError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Builds a connected (client, server) stream pair over loopback.
async fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("[::1]:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (accepted, connected) = tokio::join!(listener.accept(), TcpStream::connect(addr));
    let (server, _) = accepted.unwrap();
    (connected.unwrap(), server)
}

fn wrap(stream: TcpStream) -> Connection {
    let peer = stream.peer_addr().unwrap();
    Connection::new(stream, peer)
}

#[tokio::test]
async fn delivers_both_directions_before_completion() {
    let (mut client, relay_source) = socket_pair().await;
    let (relay_dest, mut server) = socket_pair().await;

    let relay_task = tokio::spawn(relay(wrap(relay_source), async move {
        Ok::<_, RaceFailure>(wrap(relay_dest))
    }));

    client.write_all(b"to-server").await.unwrap();
    let mut buf = [0u8; 9];
    server.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"to-server");

    server.write_all(b"to-client").await.unwrap();
    let mut buf = [0u8; 9];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"to-client");

    // Close both ends; the relay finishes with the per-direction counts.
    drop(client);
    drop(server);

    let (to_dest, from_dest) = timeout(Duration::from_secs(1), relay_task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(to_dest, 9);
    assert_eq!(from_dest, 9);
}

#[tokio::test]
async fn waits_for_both_directions_to_finish() {
    let (mut client, relay_source) = socket_pair().await;
    let (relay_dest, mut server) = socket_pair().await;

    let mut relay_task = tokio::spawn(relay(wrap(relay_source), async move {
        Ok::<_, RaceFailure>(wrap(relay_dest))
    }));

    // The client half-closes its sending side. The server still owes a
    // reply, so the relay must keep running.
    client.write_all(b"last words").await.unwrap();
    client.shutdown().await.unwrap();

    let mut buf = [0u8; 10];
    server.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"last words");

    // The server sees the forwarded end-of-stream.
    assert_eq!(server.read(&mut [0u8; 8]).await.unwrap(), 0);

    assert!(
        timeout(Duration::from_millis(200), &mut relay_task)
            .await
            .is_err(),
        "relay must not finish while the server direction is open"
    );

    server.write_all(b"delayed reply").await.unwrap();
    drop(server);

    let mut reply = Vec::new();
    client.read_to_end(&mut reply).await.unwrap();
    assert_eq!(reply, b"delayed reply");

    let (to_dest, from_dest) = timeout(Duration::from_secs(1), &mut relay_task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(to_dest, 10);
    assert_eq!(from_dest, 13);
}

#[tokio::test]
async fn race_failure_closes_source_without_copying() {
    let (mut client, relay_source) = socket_pair().await;
    let dead = dead_endpoint().await;

    let relay_task = tokio::spawn(async move {
        let destinations = [dead];
        relay(wrap(relay_source), connect_any(&destinations)).await
    });

    let error = timeout(Duration::from_secs(1), relay_task)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(error, RelayError::Race(_)));

    // The source was torn down; the client promptly sees end-of-stream.
    let n = timeout(Duration::from_secs(1), client.read(&mut [0u8; 8]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn destination_failure_ends_relay_and_closes_source() {
    let (mut client, relay_source) = socket_pair().await;
    let (relay_dest, server) = socket_pair().await;

    let mut relay_task = tokio::spawn(relay(wrap(relay_source), async move {
        Ok::<_, RaceFailure>(wrap(relay_dest))
    }));

    // Park unread bytes at the server, then drop it. Closing with unread
    // data resets the connection, which the relay sees as a stream error.
    client.write_all(b"spill").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(server);

    let error = timeout(Duration::from_secs(1), &mut relay_task)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(error, RelayError::Stream(_)));

    // Both ends are gone; the client observes its side closing too.
    match timeout(Duration::from_secs(1), client.read(&mut [0u8; 8]))
        .await
        .unwrap()
    {
        Ok(0) | Err(_) => {}
        Ok(n) => panic!("unexpected {n} bytes after teardown"),
    }
}
