//! jlcli Library
//!
//! Runs code inside a long-running Julia worker process. One invocation
//! compiles a request, sends it over a Unix domain socket, and turns the
//! reply into output and an exit status:
//!
//! - `compiler` - builds the JSON-RPC request from an `InvocationConfig`
//! - `ipc` - one-shot newline-framed exchange with the worker
//! - `interpreter` - re-emits captured output and classifies the reply
//! - `cli` - command-line adapter producing an `InvocationConfig`
//!
//! # Usage
//!
//! ```ignore
//! use jlcli::{run, InvocationConfig, Mode};
//!
//! let config = InvocationConfig::with_mode(Mode::Eval("println(1)".into()));
//! let outcome = run(config, &mut std::io::stdout(), &mut std::io::stderr()).await?;
//! std::process::exit(outcome.exit_code().into());
//! ```

pub mod callable;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod ipc;
pub mod protocol;
pub mod stdio;

use std::io::Write;

pub use callable::CallableReference;
pub use compiler::compile_request;
pub use config::{InvocationConfig, Mode, TransportOptions};
pub use error::{JlcliError, Result};
pub use interpreter::{handle_response, Outcome};
pub use protocol::{RpcCall, RpcRequest};

/// Compile `config`, exchange it with the worker and interpret the reply.
///
/// Blocks until the worker answers or closes the connection.
pub async fn run<O, E>(config: InvocationConfig, out: &mut O, err: &mut E) -> Result<Outcome>
where
    O: Write,
    E: Write,
{
    let (request, transport) = compile_request(config)?;
    let raw = ipc::send_request(&request, &transport.connection).await?;
    handle_response(&raw, transport.print_result, out, err)
}
