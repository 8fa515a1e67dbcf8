//! Error types for pwnix

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PwnixError {
    /// Required external binary is not on PATH
    #[error("Required tool '{0}' is not installed or not in PATH.")]
    ToolMissing(String),
    /// Operation needs euid 0
    #[error("This operation requires root privileges. Please run as root or with sudo.")]
    PermissionDenied,
    /// External command exited unsuccessfully
    #[error("Command failed: {cmd}{}", exit_suffix(.code))]
    CommandFailed { cmd: String, code: Option<i32>, stderr: String },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PwnixError {
    /// Captured stderr of a failed command, if any
    pub fn command_stderr(&self) -> Option<&str> {
        match self {
            PwnixError::CommandFailed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => String::new(),
    }
}

pub type PwnixResult<T> = Result<T, PwnixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = PwnixError::CommandFailed {
            cmd: "ip link set dev eth0 up".to_string(),
            code: Some(2),
            stderr: "Cannot find device".to_string(),
        };
        assert_eq!(err.to_string(), "Command failed: ip link set dev eth0 up (exit code 2)");
        assert_eq!(err.command_stderr(), Some("Cannot find device"));

        let err = PwnixError::CommandFailed {
            cmd: "tc qdisc show".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Command failed: tc qdisc show");
    }

    #[test]
    fn test_guard_messages() {
        assert_eq!(
            PwnixError::ToolMissing("iw".to_string()).to_string(),
            "Required tool 'iw' is not installed or not in PATH."
        );
        assert!(PwnixError::PermissionDenied.to_string().contains("root privileges"));
        assert!(PwnixError::PermissionDenied.command_stderr().is_none());
    }
}
