//! Switch control-plane abstraction.
//!
//! The switch exposes two control surfaces (port/bridge table and flow
//! table); host link state is a third command family. Everything the
//! daemons do goes through this trait, so tests can substitute a
//! recording fake for the real switch.

use async_trait::async_trait;

use crate::error::{NetMgrError, NetMgrResult};
use crate::exec::ExecResult;

/// Control surface of the virtual switch.
#[async_trait]
pub trait SwitchControlPort: Send + Sync {
    /// Runs a port/bridge table command.
    async fn table_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult>;

    /// Runs a flow table command.
    async fn flow_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult>;

    /// Runs a host link command.
    async fn link_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult>;

    /// Queries the datapath port number assigned to a named interface.
    ///
    /// Re-resolved on every operation: a detached and reattached
    /// interface can be assigned a different number, so the value is
    /// never cached.
    async fn port_number(&self, port_name: &str) -> NetMgrResult<u32> {
        let args: Vec<String> = ["get", "Interface", port_name, "ofport"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = self.table_cmd(&args).await?;
        if !result.success() {
            return Err(NetMgrError::port_not_resolved(
                port_name,
                result.combined_output(),
            ));
        }
        parse_ofport(&result.stdout)
            .ok_or_else(|| NetMgrError::port_not_resolved(port_name, result.stdout.clone()))
    }
}

/// Parses `get Interface <port> ofport` output.
///
/// A port that is known but not attached reports `-1` or `[]`; both are
/// treated as unresolved.
pub fn parse_ofport(output: &str) -> Option<u32> {
    output.trim().trim_matches('"').parse::<u32>().ok()
}

/// Maps a failed table or link mutation onto the interface it was
/// configuring.
pub fn require_interface(interface: &str, result: ExecResult) -> NetMgrResult<ExecResult> {
    if result.success() {
        Ok(result)
    } else {
        Err(NetMgrError::interface_creation(
            interface,
            result.combined_output(),
        ))
    }
}
