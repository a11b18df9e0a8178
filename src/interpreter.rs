//! Response interpreter: re-emits captured output and classifies the reply.

use std::borrow::Cow;
use std::io::Write;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{JlcliError, Result};
use crate::protocol::REQUEST_ID;

/// How an exchange ended, as far as the reply says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The worker returned a `result`.
    Success,
    /// The worker returned an `error` with a message.
    RemoteError,
    /// The reply matched neither shape, or carried a non-mapping `data`.
    MalformedResponse,
}

impl Outcome {
    /// Process exit code: 0, 1 or 3.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::RemoteError => 1,
            Outcome::MalformedResponse => 3,
        }
    }
}

/// Parse `raw` as a JSON reply and interpret it.
///
/// # Errors
///
/// `JlcliError::Protocol` if `raw` is not valid JSON, `JlcliError::Io` if
/// writing to or flushing `out` or `err` fails.
pub fn handle_response<O, E>(
    raw: &[u8],
    print_result: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Outcome>
where
    O: Write,
    E: Write,
{
    let response: Value = serde_json::from_slice(raw).map_err(JlcliError::Protocol)?;
    let outcome = interpret_response(&response, print_result, out, err)?;
    out.flush()?;
    err.flush()?;
    Ok(outcome)
}

/// Interpret an already parsed reply.
///
/// Captured output goes to `out` verbatim. Messages and backtraces go to
/// `err` with a trailing newline. Computed values and exceptions are
/// rendered to `out` only when `print_result` is set.
pub fn interpret_response<O, E>(
    response: &Value,
    print_result: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Outcome>
where
    O: Write,
    E: Write,
{
    if let Some(id) = response.get("id") {
        if id.as_f64() != Some(REQUEST_ID as f64) {
            warn!(%id, "Response ID mismatch");
            writeln!(err, "Response ID does not match. Got: {}", id)?;
        }
    }

    if let Some(result) = response.get("result") {
        if let Some(stdout) = non_null(result.get("stdout")) {
            write!(out, "{}", text(stdout))?;
        }
        if print_result {
            if let Some(value) = non_null(result.get("result")) {
                render(out, value)?;
            }
        }
        debug!("Worker reported success");
        return Ok(Outcome::Success);
    }

    if let Some(error) = response.get("error") {
        if let Some(message) = error.get("message") {
            return interpret_error(error, message, print_result, out, err);
        }
    }

    writeln!(err, "Invalid response:")?;
    render(err, response)?;
    Ok(Outcome::MalformedResponse)
}

fn interpret_error<O, E>(
    error: &Value,
    message: &Value,
    print_result: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Outcome>
where
    O: Write,
    E: Write,
{
    let data = match non_null(error.get("data")) {
        None => None,
        Some(Value::Object(data)) => Some(data),
        Some(other) => {
            if print_result {
                render(out, other)?;
            }
            writeln!(err, "{}", text(message))?;
            writeln!(
                err,
                "** Invalid response type of `data`: {} **",
                type_name(other)
            )?;
            return Ok(Outcome::MalformedResponse);
        }
    };

    let field = |name: &str| non_null(data.and_then(|d| d.get(name)));

    if let Some(stdout) = field("stdout") {
        write!(out, "{}", text(stdout))?;
    }

    match field("backtrace") {
        Some(backtrace) => writeln!(err, "{}", text(backtrace))?,
        None => writeln!(err, "{}", text(message))?,
    }

    if print_result {
        if let Some(exception) = field("exception") {
            render(out, exception)?;
        }
    }

    debug!("Worker reported an error");
    Ok(Outcome::RemoteError)
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Strings as-is, everything else as compact JSON.
fn text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Human-readable rendering of a JSON value, newline terminated.
fn render<W: Write>(w: &mut W, value: &Value) -> std::io::Result<()> {
    writeln!(w, "{:#}", value)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
