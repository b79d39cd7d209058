//! Bidirectional piping with lifecycle-correct teardown.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::conn::Connection;
use super::error::{RaceFailure, RelayError};

const COPY_BUF_SIZE: usize = 8192;

/// Relays bytes between an accepted connection and a pending destination.
///
/// The destination future (typically `connect_any`) is awaited first; if it
/// fails, the source is closed and the failure propagates without a byte
/// copied. Otherwise both copy directions run until each has seen
/// end-of-stream, or until either direction errors, which ends the whole
/// relay. The destination is closed before the source on every path, each
/// exactly once; that ordering is carried by the declaration order of the
/// two streams.
///
/// Returns `(bytes_to_dest, bytes_from_dest)`.
pub async fn relay<F>(source: Connection, pending: F) -> Result<(u64, u64), RelayError>
where
    F: Future<Output = Result<Connection, RaceFailure>>,
{
    let mut source = source.into_stream();
    let mut dest = pending.await?.into_stream();

    let (mut source_read, mut source_write) = source.split();
    let (mut dest_read, mut dest_write) = dest.split();

    let outbound = copy_direction(&mut source_read, &mut dest_write);
    let inbound = copy_direction(&mut dest_read, &mut source_write);

    let (bytes_to_dest, bytes_from_dest) = tokio::try_join!(outbound, inbound)?;
    Ok((bytes_to_dest, bytes_from_dest))
}

/// Copies one direction until end-of-stream, then forwards the half-close.
async fn copy_direction<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut total = 0u64;
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                writer.write_all(&buf[..n]).await?;
                total += n as u64;
            }
            Err(e) => return Err(e),
        }
    }
    writer.shutdown().await?;
    Ok(total)
}
