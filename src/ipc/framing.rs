//! Newline framing for the one-shot request/reply exchange.
//!
//! # Wire Format
//!
//! ```text
//! <json-body>\n
//! ```
//!
//! The reader does not look for message boundaries. It reads fixed-size
//! chunks until the most recent chunk contains a newline or the peer closes,
//! and returns everything it read. Anything the peer sends after the newline
//! in the same chunk is returned too. That is fine for a single unpipelined
//! reply and nothing else.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Size of each read from the socket.
pub const CHUNK_SIZE: usize = 4096;

/// Read the raw reply from the stream.
///
/// Blocks until a chunk containing `\n` arrives or the peer closes the
/// connection. There is no timeout.
///
/// # Errors
///
/// Returns an error if a read fails.
pub async fn read_reply<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut chunks: Vec<Vec<u8>> = Vec::new();

    loop {
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let n = reader
            .read(&mut chunk)
            .await
            .context("Failed to read reply")?;
        chunk.truncate(n);
        trace!(bytes = n, "Read reply chunk");

        let done = n == 0 || chunk.contains(&b'\n');
        chunks.push(chunk);
        if done {
            break;
        }
    }

    Ok(chunks.concat())
}

/// Write `body` followed by a newline, then flush.
///
/// `body` must not contain a newline itself; compact JSON never does.
///
/// # Errors
///
/// Returns an error if the write or flush fails.
pub async fn write_message<W>(writer: &mut W, body: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buffer = Vec::with_capacity(body.len() + 1);
    buffer.extend_from_slice(body.as_bytes());
    buffer.push(b'\n');

    writer
        .write_all(&buffer)
        .await
        .context("Failed to write request")?;
    writer.flush().await.context("Failed to flush request")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::UnixStream;
    use tokio::time::timeout;

    /// Test timeout to prevent hanging tests.
    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_write_appends_newline() {
        let (mut client, mut server) = UnixStream::pair().expect("Failed to create socket pair");

        write_message(&mut client, r#"{"id":0}"#)
            .await
            .expect("Write failed");
        drop(client);

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.expect("Read failed");
        assert_eq!(received, b"{\"id\":0}\n");
    }

    #[tokio::test]
    async fn test_read_stops_at_newline_without_close() {
        let (mut client, mut server) = UnixStream::pair().expect("Failed to create socket pair");

        server
            .write_all(b"{\"id\":0,\"result\":{}}\n")
            .await
            .expect("Write failed");

        // The server side stays open; the reader must not wait for EOF.
        let reply = timeout(TEST_TIMEOUT, read_reply(&mut client))
            .await
            .expect("Test timed out")
            .expect("Read failed");

        assert_eq!(reply, b"{\"id\":0,\"result\":{}}\n");
        drop(server);
    }

    #[tokio::test]
    async fn test_read_accumulates_multiple_chunks() {
        let (mut client, mut server) = UnixStream::pair().expect("Failed to create socket pair");

        let body = format!("\"{}\"", "x".repeat(CHUNK_SIZE * 3));
        let payload = format!("{}\n", body);
        let writer = tokio::spawn(async move {
            server.write_all(payload.as_bytes()).await.expect("Write failed");
            server
        });

        let reply = timeout(TEST_TIMEOUT, read_reply(&mut client))
            .await
            .expect("Test timed out")
            .expect("Read failed");
        let _server = writer.await.expect("Writer panicked");

        assert_eq!(reply.len(), body.len() + 1);
        assert_eq!(reply.last(), Some(&b'\n'));
    }

    #[tokio::test]
    async fn test_read_returns_partial_reply_on_close() {
        let (mut client, mut server) = UnixStream::pair().expect("Failed to create socket pair");

        server.write_all(b"{\"id\":0}").await.expect("Write failed");
        drop(server);

        let reply = timeout(TEST_TIMEOUT, read_reply(&mut client))
            .await
            .expect("Test timed out")
            .expect("Read failed");

        assert_eq!(reply, b"{\"id\":0}");
    }

    #[tokio::test]
    async fn test_read_empty_on_immediate_close() {
        let (mut client, server) = UnixStream::pair().expect("Failed to create socket pair");
        drop(server);

        let reply = timeout(TEST_TIMEOUT, read_reply(&mut client))
            .await
            .expect("Test timed out")
            .expect("Read failed");

        assert!(reply.is_empty());
    }
}
