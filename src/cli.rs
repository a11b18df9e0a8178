//! CLI argument parsing definitions

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser};

use crate::config::{InvocationConfig, Mode, TransportOptions, DEFAULT_JULIA};
use crate::ipc::default_socket_path;
use crate::stdio::{StderrTarget, StdioProbe, StdioRedirections};

const USAGE: &str = "jlcli [options] --eval=CODE [args...]
       jlcli [options] --include=FILE [args...]
       jlcli [options] --callmain=CALLABLE [args...]
       jlcli [options] --callany=CALLABLE JSON
       jlcli [options] --adhoccli=CALLABLE -- [args...]
       jlcli [options] script [args...]";

#[derive(Debug, Parser)]
#[command(name = "jlcli", version, about = "Julia CLI frontend", override_usage = USAGE)]
pub struct Cli {
    /// Worker socket path [default: ~/.julia/jlcli/socket]
    #[arg(long, value_name = "PATH", env = "JLCLI_CONNECTION")]
    pub connection: Option<PathBuf>,

    /// Print the returned value (or exception) to stdout
    #[arg(long)]
    pub print_result: bool,

    /// Julia executable the worker should use
    #[arg(long, value_name = "NAME", default_value = DEFAULT_JULIA)]
    pub julia: String,

    /// Project directory to activate
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// File path to be used for stdin
    #[arg(long, value_name = "PATH")]
    pub stdin: Option<String>,

    /// File path to be used for stdout
    #[arg(long, value_name = "PATH")]
    pub stdout: Option<String>,

    /// File path to be used for stderr (`:stdout` merges it into stdout)
    #[arg(long, value_name = "PATH")]
    pub stderr: Option<String>,

    /// Evaluate in `Main` instead of a fresh module
    #[arg(long)]
    pub usemain: bool,

    /// Do not send the value of the last expression back
    #[arg(long)]
    pub ignorereturn: bool,

    #[command(flatten)]
    pub mode: ModeArgs,

    /// Script to run. If the first argument does not start with `-`, all
    /// following arguments are passed to the script untouched.
    pub script: Option<String>,

    /// `ARGS` for the script or the selected mode
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Mutually exclusive invocation modes.
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct ModeArgs {
    /// Evaluate CODE
    #[arg(long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Run Julia script FILE. The namespace is not `Main` unless `--usemain`
    /// is given. Use `--ignorereturn` if the last expression in FILE may not
    /// be JSON serializable.
    #[arg(long, value_name = "FILE")]
    pub include: Option<String>,

    /// Call `PkgName=u-u-i-d:main.function.name` with string arguments
    #[arg(long, value_name = "CALLABLE")]
    pub callmain: Option<String>,

    /// Same CALLABLE as `--callmain`, followed by one JSON object with
    /// optional `args` (array) and `kwargs` (object) keys
    #[arg(long, value_name = "CALLABLE")]
    pub callany: Option<String>,

    /// Same CALLABLE as `--callmain`; arguments after `--` are passed to it
    #[arg(long, value_name = "CALLABLE")]
    pub adhoccli: Option<String>,
}

impl ModeArgs {
    fn into_mode(self) -> Option<Mode> {
        let ModeArgs {
            eval,
            include,
            callmain,
            callany,
            adhoccli,
        } = self;

        eval.map(Mode::Eval)
            .or(include.map(Mode::Include))
            .or(callmain.map(Mode::CallMain))
            .or(callany.map(Mode::CallAny))
            .or(adhoccli.map(Mode::AdHocCli))
            .filter(|mode| !mode.selector().is_empty())
    }
}

impl Cli {
    /// Parse a full argument vector, program name included.
    ///
    /// When the first argument is a script (does not start with `-`), a `--`
    /// is inserted before it so no later option is interpreted by jlcli.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let first_is_script = args
            .get(1)
            .map(|arg| !arg.to_string_lossy().starts_with('-'))
            .unwrap_or(false);
        if first_is_script {
            args.insert(1, OsString::from("--"));
        }
        Self::try_parse_from(args)
    }

    /// Build the invocation config, filling unset redirections from `probe`.
    pub fn into_config(self, probe: &impl StdioProbe) -> InvocationConfig {
        let defaults = probe.redirections();
        let stdio = StdioRedirections {
            stdin: self.stdin.or(defaults.stdin),
            stdout: self.stdout.or(defaults.stdout),
            stderr: self
                .stderr
                .as_deref()
                .map(StderrTarget::from_arg)
                .unwrap_or(defaults.stderr),
        };

        InvocationConfig {
            mode: self.mode.into_mode(),
            script: self.script,
            args: self.args,
            stdio,
            julia: self.julia,
            project: self.project,
            usemain: self.usemain,
            ignorereturn: self.ignorereturn,
            transport: TransportOptions {
                connection: self.connection.unwrap_or_else(default_socket_path),
                print_result: self.print_result,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_request;
    use crate::error::JlcliError;
    use serde_json::{json, Value};

    struct FixedProbe;

    impl StdioProbe for FixedProbe {
        fn redirections(&self) -> StdioRedirections {
            StdioRedirections {
                stdin: Some("/proc/1/fd/0".into()),
                stdout: Some("/proc/1/fd/1".into()),
                stderr: StderrTarget::Stdout,
            }
        }
    }

    fn parse(args: &[&str]) -> InvocationConfig {
        let argv = std::iter::once("jlcli").chain(args.iter().copied());
        Cli::try_parse_args(argv)
            .expect("parse failed")
            .into_config(&FixedProbe)
    }

    fn compile(args: &[&str]) -> Value {
        let (request, _) = compile_request(parse(args)).expect("compile failed");
        serde_json::to_value(request).unwrap()
    }

    #[test]
    fn test_require_one_command() {
        let result = compile_request(parse(&[]));
        assert!(matches!(result, Err(JlcliError::Configuration(_))));
    }

    #[test]
    fn test_require_only_one_command() {
        let result = Cli::try_parse_args([
            "jlcli",
            "--callany=Statistics=10745b16-79ce-11e8-11f9-7d13ad32a3b2:std",
            "--eval=CODE",
            "--",
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_request_eval() {
        let request = compile(&["--eval=CODE", "a", "b", "c"]);
        assert_eq!(request["params"]["code"], "CODE");
        assert_eq!(request["params"]["args"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_request_callmain() {
        let request = compile(&["--callmain=PkgName=u-u-i-d:main.function.name", "a", "b", "c"]);
        assert_eq!(request["params"]["pkgname"], "PkgName");
        assert_eq!(request["params"]["pkguuid"], "u-u-i-d");
        assert_eq!(request["params"]["main"], "main.function.name");
        assert_eq!(request["params"]["args"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_request_callany() {
        let request = compile(&[
            "--callany=Statistics=10745b16-79ce-11e8-11f9-7d13ad32a3b2:std",
            r#"{"args":[[1,2,3]]}"#,
        ]);
        assert_eq!(request["params"]["pkgname"], "Statistics");
        assert_eq!(request["params"]["main"], "std");
        assert_eq!(request["params"]["args"], json!([[1, 2, 3]]));
    }

    #[test]
    fn test_request_adhoccli() {
        let config = parse(&[
            "--print-result",
            "--adhoccli=Unicode=4ec0a83e-493e-50e2-b9ac-8f72acf5a8f5:normalize",
            "--",
            "JuLiA",
            "--casefold",
        ]);
        assert!(config.transport.print_result);

        let (request, _) = compile_request(config).unwrap();
        let request = serde_json::to_value(request).unwrap();
        assert_eq!(request["method"], "adhoccli");
        assert_eq!(request["params"]["pkgname"], "Unicode");
        assert_eq!(request["params"]["args"], json!(["JuLiA", "--casefold"]));
    }

    #[test]
    fn test_request_script() {
        let request = compile(&["/dev/null", "-h"]);
        assert_eq!(request["method"], "run");
        assert_eq!(request["params"]["script"], "/dev/null");
        assert_eq!(request["params"]["args"], json!(["-h"]));
    }

    #[test]
    fn test_empty_mode_flag() {
        let config = parse(&["--eval="]);
        assert!(config.mode.is_none());
        let result = compile_request(config);
        assert!(matches!(result, Err(JlcliError::Configuration(_))));

        let request = compile(&["--eval=", "/dev/null", "x"]);
        assert_eq!(request["method"], "run");
        assert_eq!(request["params"]["args"], json!(["x"]));
    }

    #[test]
    fn test_script_swallows_later_options() {
        let config = parse(&["script.jl", "--eval=x", "--print-result"]);
        assert!(config.mode.is_none());
        assert!(!config.transport.print_result);
        assert_eq!(config.script.as_deref(), Some("script.jl"));
        assert_eq!(config.args, vec!["--eval=x", "--print-result"]);
    }

    #[test]
    fn test_probe_defaults_and_overrides() {
        let config = parse(&["--eval=1"]);
        assert_eq!(config.stdio, FixedProbe.redirections());

        let config = parse(&["--stdout=/tmp/out", "--stderr=/tmp/err", "--eval=1"]);
        assert_eq!(config.stdio.stdin.as_deref(), Some("/proc/1/fd/0"));
        assert_eq!(config.stdio.stdout.as_deref(), Some("/tmp/out"));
        assert_eq!(
            config.stdio.stderr,
            StderrTarget::Path(Some("/tmp/err".into()))
        );

        let config = parse(&["--stderr=:stdout", "--eval=1"]);
        assert_eq!(config.stdio.stderr, StderrTarget::Stdout);
    }

    #[test]
    fn test_options() {
        let config = parse(&[
            "--connection=/tmp/w.sock",
            "--julia=julia-nightly",
            "--project=.",
            "--usemain",
            "--ignorereturn",
            "--include=file.jl",
        ]);
        assert_eq!(config.transport.connection, PathBuf::from("/tmp/w.sock"));
        assert_eq!(config.julia, "julia-nightly");
        assert_eq!(config.project, Some(PathBuf::from(".")));
        assert!(config.usemain);
        assert!(config.ignorereturn);
        assert_eq!(config.mode, Some(Mode::Include("file.jl".into())));
    }
}
