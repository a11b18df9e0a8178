//! JSON-RPC 2.0 request types sent to the worker.
//!
//! Each method has its own parameter struct. The fields every method shares
//! live in [`CommonParams`], flattened into the method's parameter object.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::callable::CallableReference;

/// JSON-RPC protocol version tag.
pub const JSONRPC_VERSION: &str = "2.0";

/// Identifier of the only request ever sent on a connection.
pub const REQUEST_ID: u64 = 0;

/// Target path for the worker's stdin or stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamPath {
    pub path: Option<String>,
}

/// Target for the worker's stderr: `{"to": "stdout"}` or `{"path": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StderrDescriptor {
    Merged { to: StdoutTag },
    Path { path: Option<String> },
}

/// Serializes as the string `"stdout"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StdoutTag {
    Stdout,
}

/// Parameters shared by every method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonParams {
    pub julia: String,
    pub project: Option<String>,
    pub cwd: String,
    pub usemain: bool,
    pub ignorereturn: bool,
    pub stdin: StreamPath,
    pub stdout: StreamPath,
    pub stderr: StderrDescriptor,
}

impl CommonParams {
    /// Keys this struct occupies in a parameter object.
    pub const FIELDS: &'static [&'static str] = &[
        "julia",
        "project",
        "cwd",
        "usemain",
        "ignorereturn",
        "stdin",
        "stdout",
        "stderr",
    ];
}

/// `eval` parameters. Also used for `--include` with a loader snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub code: String,
    pub args: Vec<String>,
}

/// `callmain` and `adhoccli` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableParams {
    #[serde(flatten)]
    pub common: CommonParams,
    #[serde(flatten)]
    pub callable: CallableReference,
    pub args: Vec<String>,
}

/// `callany` parameters: the reference plus caller-supplied JSON fields
/// (usually `args` and `kwargs`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallAnyParams {
    #[serde(flatten)]
    pub common: CommonParams,
    #[serde(flatten)]
    pub callable: CallableReference,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `run` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParams {
    #[serde(flatten)]
    pub common: CommonParams,
    /// Absolute path of the script.
    pub script: String,
    pub args: Vec<String>,
}

/// Method name together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params", rename_all = "lowercase")]
pub enum RpcCall {
    Eval(EvalParams),
    CallMain(CallableParams),
    CallAny(CallAnyParams),
    AdHocCli(CallableParams),
    Run(RunParams),
}

impl RpcCall {
    /// Wire name of the method.
    pub fn method(&self) -> &'static str {
        match self {
            RpcCall::Eval(_) => "eval",
            RpcCall::CallMain(_) => "callmain",
            RpcCall::CallAny(_) => "callany",
            RpcCall::AdHocCli(_) => "adhoccli",
            RpcCall::Run(_) => "run",
        }
    }

    /// Parameters shared by every method.
    pub fn common(&self) -> &CommonParams {
        match self {
            RpcCall::Eval(p) => &p.common,
            RpcCall::CallMain(p) | RpcCall::AdHocCli(p) => &p.common,
            RpcCall::CallAny(p) => &p.common,
            RpcCall::Run(p) => &p.common,
        }
    }
}

/// A complete JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub call: RpcCall,
    pub id: u64,
}

impl RpcRequest {
    /// Wrap `call` with the protocol tag and the fixed request ID.
    pub fn new(call: RpcCall) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            call,
            id: REQUEST_ID,
        }
    }

    /// Serialize to a single line of JSON without the terminator.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
