//! Privileged command execution for switch control.
//!
//! Commands are issued as argument vectors, never through a shell, so
//! interface names and addresses taken from port specifications cannot be
//! interpreted as shell syntax.
//!
//! # Example
//!
//! ```ignore
//! use ovsnet_common::exec::{self, OVS_VSCTL_CMD};
//!
//! let args = vec!["br-exists".to_string(), "cloud".to_string()];
//! let result = exec::run_privileged(OVS_VSCTL_CMD, &args).await?;
//! ```

use std::process::Stdio;
use tokio::process::Command;

use crate::error::{NetMgrError, NetMgrResult};

/// Privilege escalation wrapper for switch control commands.
pub const SUDO_CMD: &str = "sudo";

/// Switch port/bridge table control utility.
pub const OVS_VSCTL_CMD: &str = "ovs-vsctl";

/// Switch flow table control utility.
pub const OVS_OFCTL_CMD: &str = "ovs-ofctl";

/// Host link configuration utility.
pub const IP_CMD: &str = "ip";

/// Result of a control command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// Trimmed stdout output.
    pub stdout: String,
    /// Trimmed stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Promotes a non-zero exit into a `CommandFailed` error.
    pub fn require_success(self, command: impl Into<String>) -> NetMgrResult<ExecResult> {
        if self.success() {
            Ok(self)
        } else {
            Err(NetMgrError::CommandFailed {
                command: command.into(),
                exit_code: self.exit_code,
                output: self.combined_output(),
            })
        }
    }
}

/// Renders a program and argument list for logging and error messages.
pub fn render(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Executes a command asynchronously and captures its output.
///
/// Non-zero exit is logged and returned in the result; it is not an
/// error at this layer. Only a spawn failure produces `Err`.
pub async fn run(program: &str, args: &[String]) -> NetMgrResult<ExecResult> {
    let rendered = render(program, args);
    tracing::debug!(command = %rendered, "Executing control command");

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| NetMgrError::CommandSpawn {
            command: rendered.clone(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let result = ExecResult {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %rendered, exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %rendered,
            exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a command through the privilege escalation wrapper.
pub async fn run_privileged(program: &str, args: &[String]) -> NetMgrResult<ExecResult> {
    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(program.to_string());
    full_args.extend_from_slice(args);
    run(SUDO_CMD, &full_args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_render() {
        assert_eq!(render("ovs-vsctl", &args(&["br-exists", "cloud"])), "ovs-vsctl br-exists cloud");
        assert_eq!(render("ovs-vsctl", &[]), "ovs-vsctl");
    }

    #[test]
    fn test_exec_result_success() {
        let result = ExecResult {
            exit_code: 0,
            stdout: "245".to_string(),
            stderr: String::new(),
        };
        assert!(result.success());
        assert_eq!(result.combined_output(), "245");
    }

    #[test]
    fn test_exec_result_combined() {
        let result = ExecResult {
            exit_code: 1,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "out\nerr");
    }

    #[test]
    fn test_require_success_passes() {
        let result = ExecResult {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(result.require_success("add-flow cloud").is_ok());
    }

    #[test]
    fn test_require_success_fails() {
        let result = ExecResult {
            exit_code: 2,
            stdout: String::new(),
            stderr: "no such bridge".to_string(),
        };
        match result.require_success("add-flow cloud") {
            Err(NetMgrError::CommandFailed {
                exit_code, output, ..
            }) => {
                assert_eq!(exit_code, 2);
                assert_eq!(output, "no such bridge");
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let result = run("echo", &args(&["hello"])).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "hello");
    }

    #[tokio::test]
    async fn test_run_nonzero_exit() {
        let result = run("false", &[]).await.unwrap();
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_run_spawn_failure() {
        let result = run("/nonexistent/control-binary", &[]).await;
        assert!(matches!(result, Err(NetMgrError::CommandSpawn { .. })));
    }
}
