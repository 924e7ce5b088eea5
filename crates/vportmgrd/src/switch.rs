//! Switch gateway executing control commands against Open vSwitch.

use async_trait::async_trait;

use ovsnet_common::exec::{self, IP_CMD, OVS_OFCTL_CMD, OVS_VSCTL_CMD};
use ovsnet_common::{ExecResult, NetMgrResult, SwitchControlPort};

/// Privileged pass-through to `ovs-vsctl`, `ovs-ofctl`, and `ip`.
///
/// Performs no retries and no interpretation of switch output; the
/// numeric exit status is surfaced to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct OvsSwitch;

impl OvsSwitch {
    /// Creates a new gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SwitchControlPort for OvsSwitch {
    async fn table_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        exec::run_privileged(OVS_VSCTL_CMD, args).await
    }

    async fn flow_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        exec::run_privileged(OVS_OFCTL_CMD, args).await
    }

    async fn link_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        exec::run_privileged(IP_CMD, args).await
    }
}
