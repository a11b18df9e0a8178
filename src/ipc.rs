//! Transport to the Julia worker.
//!
//! One request and one reply travel over a Unix domain socket, each as a
//! single line of JSON:
//!
//! ```text
//! ┌─────────────────┐         Unix Socket          ┌─────────────────────┐
//! │     jlcli       │  ── request JSON + "\n" ──►  │                     │
//! │   (IpcClient)   │  ◄── reply JSON + "\n" ───   │   worker process    │
//! └─────────────────┘                              └─────────────────────┘
//! ```
//!
//! The connection is opened for that single exchange and closed afterwards.
//!
//! # Usage
//!
//! ```ignore
//! use jlcli::ipc::{default_socket_path, IpcClient};
//!
//! let client = IpcClient::connect(&default_socket_path()).await?;
//! let raw_reply = client.exchange(&request).await?;
//! ```

mod client;
mod framing;

pub use client::{default_socket_path, send_request, IpcClient};
pub use framing::{read_reply, write_message, CHUNK_SIZE};
