//! Error types for switch-control operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for switch-control operations.
pub type NetMgrResult<T> = Result<T, NetMgrError>;

/// Errors that can occur while provisioning switch ports.
#[derive(Debug, Error)]
pub enum NetMgrError {
    /// The control binary could not be executed (spawn error).
    #[error("Failed to execute command '{command}': {source}")]
    CommandSpawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A control command returned a non-zero exit code.
    #[error("Command failed: '{command}' (exit code {exit_code}): {output}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// A mandatory flow match field was not supplied.
    ///
    /// This is a contract error in rule construction, not a runtime
    /// condition; it is never retried.
    #[error("Flow rule is missing mandatory match field '{field}'")]
    MissingMatchField {
        /// The absent field name.
        field: &'static str,
    },

    /// An interface could not be created or brought up.
    #[error("Failed to bring up interface '{interface}': {message}")]
    InterfaceCreation {
        /// The interface or bridge name.
        interface: String,
        /// Error message.
        message: String,
    },

    /// The switch did not report a usable datapath port number.
    #[error("No datapath port number for '{port}': {output}")]
    PortNotResolved {
        /// The port name.
        port: String,
        /// What the switch reported instead.
        output: String,
    },

    /// Port specification failed validation.
    #[error("Invalid port specification for {field}: {message}")]
    InvalidPortSpec {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl NetMgrError {
    /// Creates an interface creation error.
    pub fn interface_creation(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InterfaceCreation {
            interface: interface.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid port specification error.
    pub fn invalid_spec(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPortSpec {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a port-not-resolved error.
    pub fn port_not_resolved(port: impl Into<String>, output: impl Into<String>) -> Self {
        Self::PortNotResolved {
            port: port.into(),
            output: output.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetMgrError::CommandFailed { .. } | NetMgrError::PortNotResolved { .. }
        )
    }
}

/// Runs a step whose failure must not stop the surrounding sequence.
///
/// The deletion path favors convergence to "absent" over strict error
/// visibility: each step is attempted, failures are logged and dropped.
pub fn best_effort<T>(operation: &str, result: NetMgrResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Step failed, continuing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetMgrError::MissingMatchField { field: "in_port" };
        assert_eq!(
            err.to_string(),
            "Flow rule is missing mandatory match field 'in_port'"
        );
    }

    #[test]
    fn test_interface_creation() {
        let err = NetMgrError::interface_creation("tenant1-gw", "Device busy");
        assert!(err.to_string().contains("tenant1-gw"));
        assert!(err.to_string().contains("Device busy"));
    }

    #[test]
    fn test_command_failed() {
        let err = NetMgrError::CommandFailed {
            command: "ovs-vsctl add-port cloud vm-88".to_string(),
            exit_code: 2,
            output: "no bridge named cloud".to_string(),
        };
        assert!(err.to_string().contains("add-port cloud vm-88"));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(NetMgrError::port_not_resolved("vm-88", "[]").is_retryable());
        assert!(!NetMgrError::MissingMatchField { field: "in_port" }.is_retryable());
        assert!(!NetMgrError::invalid_spec("mac", "empty").is_retryable());
    }

    #[test]
    fn test_best_effort_ok() {
        let value = best_effort("noop", Ok::<_, NetMgrError>(7));
        assert_eq!(value, Some(7));
    }

    #[test]
    fn test_best_effort_swallows() {
        let value: Option<()> = best_effort(
            "clear flow rules",
            Err(NetMgrError::port_not_resolved("vm-88", "[]")),
        );
        assert!(value.is_none());
    }
}
