//! Request compiler: turns an [`InvocationConfig`] into an [`RpcRequest`].

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::callable::CallableReference;
use crate::config::{InvocationConfig, Mode, TransportOptions};
use crate::error::{JlcliError, Result};
use crate::protocol::{
    CallAnyParams, CallableParams, CommonParams, EvalParams, RpcCall, RpcRequest, RunParams,
    StderrDescriptor, StdoutTag, StreamPath,
};
use crate::stdio::StderrTarget;

/// Code evaluated for `--include`: pops the file name off `ARGS` and
/// includes it into the evaluation module.
pub const INCLUDE_LOADER: &str = "Base.include(@__MODULE__, popfirst!(ARGS))";

/// Parameter names the `callany` JSON object may not override.
const CALLABLE_FIELDS: &[&str] = &["pkgname", "pkguuid", "main"];

/// Build the request for `config`, returning the transport options alongside.
pub fn compile_request(config: InvocationConfig) -> Result<(RpcRequest, TransportOptions)> {
    let InvocationConfig {
        mode,
        script,
        mut args,
        stdio,
        julia,
        project,
        usemain,
        ignorereturn,
        transport,
    } = config;

    // An empty selector or script counts as not given.
    let mode = mode.filter(|m| !m.selector().is_empty());
    let script = script.filter(|s| !s.is_empty());

    if mode.is_none() && script.is_none() {
        return Err(no_mode_error());
    }

    // For everything except `callany` and `run` the positional script is just
    // the first argument.
    let mut script = script;
    match &mode {
        Some(Mode::CallAny(_)) => {
            if !args.is_empty() {
                return Err(JlcliError::config(
                    "`--callany` only takes one JSON object as an argument.",
                ));
            }
        }
        Some(_) => {
            if let Some(first) = script.take() {
                args.insert(0, first);
            }
        }
        None => {}
    }

    let project = project.as_deref().map(resolve_path).transpose()?;
    let cwd = std::env::current_dir()
        .map_err(|e| JlcliError::config(format!("Cannot determine current directory: {}", e)))?;

    let common = CommonParams {
        julia,
        project,
        cwd: path_to_string(cwd)?,
        usemain,
        ignorereturn,
        stdin: StreamPath { path: stdio.stdin },
        stdout: StreamPath { path: stdio.stdout },
        stderr: stderr_descriptor(stdio.stderr),
    };

    let call = match mode {
        Some(Mode::Eval(code)) => RpcCall::Eval(EvalParams { common, code, args }),
        Some(Mode::Include(path)) => {
            let mut include_args = Vec::with_capacity(args.len() + 1);
            include_args.push(path);
            include_args.extend(args);
            RpcCall::Eval(EvalParams {
                common,
                code: INCLUDE_LOADER.to_string(),
                args: include_args,
            })
        }
        Some(Mode::CallMain(reference)) => RpcCall::CallMain(CallableParams {
            common,
            callable: CallableReference::parse(&reference)?,
            args,
        }),
        Some(Mode::CallAny(reference)) => RpcCall::CallAny(CallAnyParams {
            common,
            callable: CallableReference::parse(&reference)?,
            extra: parse_callany_literal(script.as_deref())?,
        }),
        Some(Mode::AdHocCli(reference)) => RpcCall::AdHocCli(CallableParams {
            common,
            callable: CallableReference::parse(&reference)?,
            args,
        }),
        None => {
            let script = script.ok_or_else(no_mode_error)?;
            RpcCall::Run(RunParams {
                common,
                script: resolve_path(Path::new(&script))?,
                args,
            })
        }
    };

    debug!(method = call.method(), "Compiled request");
    Ok((RpcRequest::new(call), transport))
}

fn no_mode_error() -> JlcliError {
    JlcliError::config(
        "At least one of `--eval`, `--include`, `--callmain`, `--callany`, `--adhoccli` \
         and `script` are required.",
    )
}

fn stderr_descriptor(target: StderrTarget) -> StderrDescriptor {
    match target {
        StderrTarget::Stdout => StderrDescriptor::Merged {
            to: StdoutTag::Stdout,
        },
        StderrTarget::Path(path) => StderrDescriptor::Path { path },
    }
}

/// Parse the positional `callany` literal into the fields merged into params.
fn parse_callany_literal(literal: Option<&str>) -> Result<Map<String, Value>> {
    let literal = literal.ok_or_else(|| {
        JlcliError::config("`--callany` requires a JSON object as its argument.")
    })?;

    let value: Value = serde_json::from_str(literal).map_err(|e| {
        JlcliError::config(format!("`--callany` argument is not valid JSON: {}", e))
    })?;

    let Value::Object(fields) = value else {
        return Err(JlcliError::config(
            "`--callany` argument must be a JSON object.",
        ));
    };

    if let Some(key) = fields
        .keys()
        .find(|k| CommonParams::FIELDS.contains(&k.as_str()) || CALLABLE_FIELDS.contains(&k.as_str()))
    {
        return Err(JlcliError::config(format!(
            "`--callany` JSON object must not set `{}`.",
            key
        )));
    }

    Ok(fields)
}

/// Absolute, symlink-resolved form of `path`. Paths that do not exist yet
/// are made absolute against the current directory.
fn resolve_path(path: &Path) -> Result<String> {
    let resolved = std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .map_err(|e| {
            JlcliError::config(format!("Cannot resolve path {}: {}", path.display(), e))
        })?;
    path_to_string(resolved)
}

fn path_to_string(path: std::path::PathBuf) -> Result<String> {
    path.into_os_string().into_string().map_err(|p| {
        JlcliError::config(format!(
            "Path is not valid UTF-8: {}",
            p.to_string_lossy()
        ))
    })
}
