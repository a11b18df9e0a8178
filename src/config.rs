//! Invocation configuration consumed by the request compiler.

use std::path::PathBuf;

use crate::ipc::default_socket_path;
use crate::stdio::StdioRedirections;

/// Runtime executable used when none is given.
pub const DEFAULT_JULIA: &str = "julia";

/// The selected invocation style.
///
/// Without a mode the positional script is run directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Evaluate a code string.
    Eval(String),
    /// Include a file into the evaluation namespace.
    Include(String),
    /// Call a package's main function with string arguments.
    CallMain(String),
    /// Call any function with JSON-encoded positional and keyword arguments.
    CallAny(String),
    /// Call a function through an ad-hoc command-line interface.
    AdHocCli(String),
}

impl Mode {
    /// The value given to the mode flag.
    pub fn selector(&self) -> &str {
        match self {
            Mode::Eval(s)
            | Mode::Include(s)
            | Mode::CallMain(s)
            | Mode::CallAny(s)
            | Mode::AdHocCli(s) => s,
        }
    }
}

/// Options used after the request is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Worker socket path.
    pub connection: PathBuf,
    /// Render computed values and exceptions on stdout.
    pub print_result: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connection: default_socket_path(),
            print_result: false,
        }
    }
}

/// Everything needed to build one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub mode: Option<Mode>,
    /// First positional value. A script for `run`; the JSON literal for
    /// `callany`; otherwise just the first argument.
    pub script: Option<String>,
    pub args: Vec<String>,
    pub stdio: StdioRedirections,
    pub julia: String,
    pub project: Option<PathBuf>,
    pub usemain: bool,
    pub ignorereturn: bool,
    pub transport: TransportOptions,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            mode: None,
            script: None,
            args: Vec::new(),
            stdio: StdioRedirections::default(),
            julia: DEFAULT_JULIA.to_string(),
            project: None,
            usemain: false,
            ignorereturn: false,
            transport: TransportOptions::default(),
        }
    }
}

impl InvocationConfig {
    /// Config for `mode` with defaults elsewhere.
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// Set the positional values: the first becomes `script`, the rest `args`.
    pub fn with_positionals<I, S>(mut self, positionals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = positionals.into_iter().map(Into::into);
        self.script = iter.next();
        self.args = iter.collect();
        self
    }
}
