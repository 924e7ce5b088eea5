//! PortMgr - network port lifecycle orchestration.
//!
//! Drives each port through `absent → attaching → active` on create and
//! `active → detaching → absent` on delete. Creation propagates the
//! first failure and leaves earlier steps applied (no rollback);
//! deletion is best-effort per step so it always converges to absent.

use tracing::{debug, info};

use ovsnet_common::{best_effort, require_interface, NetMgrResult, SwitchControlPort};

use crate::commands;
use crate::flow::FlowRule;
use crate::overlay::OverlayBridgeManager;
use crate::policy;
use crate::types::{DriverConfig, NetworkPortSpec};

/// Callback fired once a created port's interface is administratively up.
pub type ReadyHook = Box<dyn Fn(&str) + Send + Sync>;

/// Provisions and tears down VM network ports on the switch.
pub struct PortMgr<S: SwitchControlPort> {
    switch: S,
    config: DriverConfig,
    ready_hook: Option<ReadyHook>,
}

impl<S: SwitchControlPort> PortMgr<S> {
    /// Creates a provisioner over the given switch gateway.
    pub fn new(switch: S, config: DriverConfig) -> Self {
        Self {
            switch,
            config,
            ready_hook: None,
        }
    }

    /// Registers the interface-ready callback.
    pub fn with_ready_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.ready_hook = Some(Box::new(hook));
        self
    }

    /// Returns the switch gateway.
    pub fn switch(&self) -> &S {
        &self.switch
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Provisions a port: attach, tag, apply flow policy, bring up.
    pub async fn create(&self, port: &NetworkPortSpec) -> NetMgrResult<()> {
        port.validate()?;
        info!(port = %port.name, bridge = %port.bridge, "Creating network port");

        if self.config.emulated {
            // Loopback stand-in for the interface the hypervisor would provide
            best_effort(
                "create loopback interface",
                self.switch.link_cmd(&commands::add_tap(&port.name)).await,
            );
        }

        if let Some(vxlan_id) = port.vxlan {
            let overlay = OverlayBridgeManager::new(&self.switch);
            overlay.ensure_tenant_bridge(&port.bridge).await?;
            overlay
                .wire_tenant_to_backbone(
                    &port.bridge,
                    vxlan_id,
                    port.vlan,
                    &self.config.backbone_bridge,
                )
                .await?;
        }

        if !self.config.native_attach {
            // A stale entry from a previous life of this port may not exist
            best_effort(
                "remove stale port entry",
                self.switch.table_cmd(&commands::del_port(&port.name)).await,
            );

            let added = self
                .switch
                .table_cmd(&commands::add_port(&port.bridge, &port.name))
                .await?;
            require_interface(&port.name, added)?;

            let tagged = self
                .switch
                .table_cmd(&commands::set_port_tag(&port.name, port.vlan))
                .await?;
            require_interface(&port.name, tagged)?;
        }

        let port_number = self.switch.port_number(&port.name).await?;

        // Re-create after a crash can leave rules for this number behind
        self.clear_port_rules(&port.bridge, port_number).await?;

        for rule in policy::rules_for(port, port_number, false) {
            let encoded = rule.encode()?;
            self.switch
                .flow_cmd(&commands::add_flow(&port.bridge, &encoded))
                .await?
                .require_success(format!("add-flow {} {}", port.bridge, encoded))?;
        }

        let up = self.switch.link_cmd(&commands::link_up(&port.name)).await?;
        require_interface(&port.name, up)?;

        if let Some(hook) = &self.ready_hook {
            hook(&port.name);
        }

        info!(port = %port.name, port_number, "Network port active");
        Ok(())
    }

    /// Tears down a port. Every step is attempted; failures are logged
    /// and swallowed so a half-provisioned port still converges to
    /// absent.
    pub async fn delete(&self, port: &NetworkPortSpec) -> NetMgrResult<()> {
        info!(port = %port.name, bridge = %port.bridge, "Deleting network port");

        match best_effort(
            "resolve datapath port number",
            self.switch.port_number(&port.name).await,
        ) {
            Some(port_number) => {
                best_effort(
                    "clear flow rules",
                    self.clear_port_rules(&port.bridge, port_number).await,
                );
            }
            None => debug!(port = %port.name, "Port number unresolved, skipping flow clear"),
        }

        if !self.config.native_attach {
            best_effort(
                "remove port entry",
                self.switch.table_cmd(&commands::del_port(&port.name)).await,
            );
        }

        if self.config.emulated {
            best_effort(
                "remove loopback interface",
                self.switch.link_cmd(&commands::del_tap(&port.name)).await,
            );
        }

        info!(port = %port.name, "Network port removed");
        Ok(())
    }

    /// Deletes every flow entry matching the port's datapath number.
    async fn clear_port_rules(&self, bridge: &str, port_number: u32) -> NetMgrResult<()> {
        let wipe = FlowRule::for_port(port_number).encode()?;
        self.switch
            .flow_cmd(&commands::del_flows(bridge, &wipe))
            .await?
            .require_success(format!("del-flows {bridge} {wipe}"))?;
        Ok(())
    }
}
