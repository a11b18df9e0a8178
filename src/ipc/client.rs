//! One-shot IPC client for the worker socket.
//!
//! `IpcClient` owns a single connection. It sends one request, reads one
//! reply and is dropped, which closes the socket on every exit path.

use std::path::{Path, PathBuf};

use tokio::net::UnixStream;
use tracing::debug;

use crate::error::JlcliError;
use crate::ipc::framing::{read_reply, write_message};
use crate::protocol::RpcRequest;

/// Resolve the default worker socket path: `~/.julia/jlcli/socket`.
///
/// Falls back to `/tmp` as the base directory when no home directory is
/// known.
pub fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".julia")
        .join("jlcli")
        .join("socket")
}

/// Client for a single request/reply exchange with the worker.
///
/// Neither connecting nor reading has a timeout. A worker that accepts the
/// connection but never answers blocks the caller indefinitely.
#[derive(Debug)]
pub struct IpcClient {
    stream: UnixStream,
    socket_path: PathBuf,
}

impl IpcClient {
    /// Connect to the worker at the given socket path.
    ///
    /// # Errors
    ///
    /// Returns `JlcliError::ConnectionFailed` if:
    /// - The socket file does not exist
    /// - Connection is refused (no worker listening)
    /// - Permission denied
    pub async fn connect(socket_path: &Path) -> Result<Self, JlcliError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|source| JlcliError::ConnectionFailed {
                path: socket_path.to_path_buf(),
                source,
            })?;

        debug!(socket = %socket_path.display(), "Connected to worker");

        Ok(Self {
            stream,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Send `request` and return the raw reply bytes.
    ///
    /// Consumes the client; the connection is closed when this returns.
    ///
    /// # Errors
    ///
    /// Returns `JlcliError::Transport` if the write or a read fails.
    pub async fn exchange(self, request: &RpcRequest) -> Result<Vec<u8>, JlcliError> {
        let line = request.to_line().map_err(|e| {
            JlcliError::Transport(anyhow::Error::new(e).context("Failed to serialize request"))
        })?;

        let Self {
            stream,
            socket_path,
        } = self;
        let socket = socket_path.display();
        let (mut reader, mut writer) = stream.into_split();

        write_message(&mut writer, &line)
            .await
            .map_err(|e| JlcliError::Transport(e.context(format!("Worker at {}", socket))))?;
        debug!(%socket, bytes = line.len() + 1, method = request.call.method(), "Request sent");

        let reply = read_reply(&mut reader)
            .await
            .map_err(|e| JlcliError::Transport(e.context(format!("Worker at {}", socket))))?;
        debug!(%socket, bytes = reply.len(), "Reply received");

        Ok(reply)
    }
}

/// Connect to `connection`, send `request` and return the raw reply.
pub async fn send_request(
    request: &RpcRequest,
    connection: &Path,
) -> Result<Vec<u8>, JlcliError> {
    IpcClient::connect(connection).await?.exchange(request).await
}
