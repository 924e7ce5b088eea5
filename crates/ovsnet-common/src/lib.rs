//! Common infrastructure for ovsnet switch-control daemons.
//!
//! Provides:
//! - Error taxonomy for provisioning operations
//! - Privileged command execution over argument vectors
//! - The `SwitchControlPort` abstraction over the switch's control surfaces

pub mod error;
pub mod exec;
pub mod gateway;

pub use error::{best_effort, NetMgrError, NetMgrResult};
pub use exec::ExecResult;
pub use gateway::{parse_ofport, require_interface, SwitchControlPort};
