//! Host system access
//!
//! Everything pwnix needs from the machine it runs on (binary lookup, the
//! effective uid and process execution) goes through the [`System`] trait so
//! the dispatcher can be exercised without touching the network stack.

use crate::error::{PwnixError, PwnixResult};
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Outcome of one external process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Standard output, surrounding whitespace trimmed
    pub stdout: String,
    /// Standard error, surrounding whitespace trimmed
    pub stderr: String,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub success: bool,
}

impl ExecutionResult {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            code: Some(0),
            success: true,
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            code: Some(code),
            success: false,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait System: Send + Sync {
    /// Resolve `tool` on the search path
    fn find_tool(&self, tool: &str) -> Option<PathBuf>;

    /// Whether the process runs with euid 0
    fn is_root(&self) -> bool;

    /// Run `program` with `args` and wait for it to exit
    async fn execute(&self, program: &str, args: &[String]) -> PwnixResult<ExecutionResult>;
}

/// The real machine
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystem;

impl HostSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl System for HostSystem {
    fn find_tool(&self, tool: &str) -> Option<PathBuf> {
        find_in_path(tool, env::var_os("PATH").as_deref())
    }

    fn is_root(&self) -> bool {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    async fn execute(&self, program: &str, args: &[String]) -> PwnixResult<ExecutionResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| PwnixError::CommandFailed {
                cmd: command_line(program, args),
                code: None,
                stderr: e.to_string(),
            })?;

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code(),
            success: output.status.success(),
        })
    }
}

/// Search `path_var` for an executable named `tool`.
///
/// A name containing a slash is checked as-is, like a shell would.
pub fn find_in_path(tool: &str, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    if tool.contains('/') {
        let candidate = PathBuf::from(tool);
        return is_executable(&candidate).then_some(candidate);
    }

    env::split_paths(path_var?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Render a program and its arguments the way they are logged
pub fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Run one command and return its trimmed stdout, turning a non-zero exit
/// into [`PwnixError::CommandFailed`].
pub async fn run_checked(sys: &dyn System, program: &str, args: &[&str]) -> PwnixResult<String> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let cmd = command_line(program, &args);
    debug!("Running command: {}", cmd);

    let result = sys.execute(program, &args).await?;
    if !result.success {
        debug!("{} exited with {:?}", cmd, result.code);
        return Err(PwnixError::CommandFailed {
            cmd,
            code: result.code,
            stderr: result.stderr,
        });
    }

    Ok(result.stdout)
}
