//! Default redirection targets for the worker's standard streams.
//!
//! The worker is a different process, so it cannot inherit our descriptors.
//! Instead it is told which paths to open. By default those are our own
//! descriptors as seen through `/proc/<pid>/fd/<n>`.

use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Command-line spelling of [`StderrTarget::Stdout`].
pub const STDOUT_SENTINEL: &str = ":stdout";

/// Where the worker should send the invoked code's standard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StderrTarget {
    /// Merge into whatever standard output is redirected to.
    Stdout,
    /// Open this path (`None` when no path is known).
    Path(Option<String>),
}

impl StderrTarget {
    /// Interpret a `--stderr` value, honouring the `:stdout` sentinel.
    pub fn from_arg(value: &str) -> Self {
        if value == STDOUT_SENTINEL {
            StderrTarget::Stdout
        } else {
            StderrTarget::Path(Some(value.to_string()))
        }
    }
}

/// Redirection targets for stdin, stdout and stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioRedirections {
    pub stdin: Option<String>,
    pub stdout: Option<String>,
    pub stderr: StderrTarget,
}

impl Default for StdioRedirections {
    fn default() -> Self {
        Self {
            stdin: None,
            stdout: None,
            stderr: StderrTarget::Path(None),
        }
    }
}

/// Describes the current process's standard streams as redirection targets.
pub trait StdioProbe {
    /// Redirections that make the worker use our own streams.
    fn redirections(&self) -> StdioRedirections;
}

/// [`StdioProbe`] backed by procfs.
///
/// A descriptor that is closed yields `None`. Stderr is reported as
/// [`StderrTarget::Stdout`] when descriptors 1 and 2 refer to the same file.
#[derive(Debug, Clone)]
pub struct ProcFdProbe {
    pid: u32,
}

impl ProcFdProbe {
    /// Probe for the running process.
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
        }
    }

    fn fd_path(&self, fd: u32) -> Option<String> {
        let path = format!("/proc/{}/fd/{}", self.pid, fd);
        Path::new(&path).exists().then_some(path)
    }

    fn same_file(&self, a: u32, b: u32) -> bool {
        let stat = |fd: u32| std::fs::metadata(format!("/proc/{}/fd/{}", self.pid, fd)).ok();
        match (stat(a), stat(b)) {
            (Some(a), Some(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }
}

impl StdioProbe for ProcFdProbe {
    fn redirections(&self) -> StdioRedirections {
        let stdout = self.fd_path(1);
        let stderr = if stdout.is_some() && self.same_file(1, 2) {
            tracing::debug!("stdout and stderr share a file; merging stderr into stdout");
            StderrTarget::Stdout
        } else {
            StderrTarget::Path(self.fd_path(2))
        };

        StdioRedirections {
            stdin: self.fd_path(0),
            stdout,
            stderr,
        }
    }
}
