//! Tenant overlay bridge wiring.
//!
//! A tenant-overlay port lives on a per-tenant private bridge, reachable
//! across hosts through a gateway chain on the backbone bridge: a
//! VLAN-tagged hop (`<bridge>-gw`) providing a concrete device, and a
//! VXLAN tunnel hop (`<bridge>-xgw`) bound to it.

use tracing::{debug, info};

use ovsnet_common::{require_interface, NetMgrResult, SwitchControlPort};

use crate::commands;

/// Wires tenant bridges to the backbone through a tag + tunnel gateway
/// chain. Chains are created once per tenant bridge and never torn down
/// here.
pub struct OverlayBridgeManager<'a, S: SwitchControlPort> {
    switch: &'a S,
}

impl<'a, S: SwitchControlPort> OverlayBridgeManager<'a, S> {
    /// Creates a manager over the given switch gateway.
    pub fn new(switch: &'a S) -> Self {
        Self { switch }
    }

    /// Idempotent create of the tenant-private bridge.
    ///
    /// Concurrent callers racing on the same bridge name can both see
    /// "absent" and both attempt creation; there is no mutual exclusion
    /// here.
    pub async fn ensure_tenant_bridge(&self, bridge: &str) -> NetMgrResult<()> {
        let exists = self
            .switch
            .table_cmd(&commands::bridge_exists(bridge))
            .await?;
        if exists.success() {
            debug!(bridge, "Tenant bridge already present");
            return Ok(());
        }

        let created = self.switch.table_cmd(&commands::add_bridge(bridge)).await?;
        require_interface(bridge, created)?;

        let up = self.switch.link_cmd(&commands::link_up(bridge)).await?;
        require_interface(bridge, up)?;

        info!(bridge, "Created tenant bridge");
        Ok(())
    }

    /// Connects a tenant bridge to the backbone through the `-gw` tag
    /// hop and the `-xgw` tunnel hop.
    ///
    /// The tunnel creation primitive binds to a single concrete device,
    /// not a bridge; the tag hop provides that device while keeping
    /// tenants separated by VLAN on the backbone. A failing step aborts
    /// the chain; interfaces created by earlier steps are left in place.
    pub async fn wire_tenant_to_backbone(
        &self,
        bridge: &str,
        vxlan_id: u32,
        vlan_tag: u16,
        backbone: &str,
    ) -> NetMgrResult<()> {
        let gw = commands::gateway_ifname(bridge);
        let xgw = commands::tunnel_ifname(bridge);

        let added = self
            .switch
            .table_cmd(&commands::add_gateway_port(backbone, &gw, vlan_tag))
            .await?;
        require_interface(&gw, added)?;

        let gw_up = self.switch.link_cmd(&commands::link_up(&gw)).await?;
        require_interface(&gw, gw_up)?;

        let tunnel = self
            .switch
            .link_cmd(&commands::add_vxlan(&xgw, vxlan_id, &gw))
            .await?;
        require_interface(&xgw, tunnel)?;

        let xgw_up = self.switch.link_cmd(&commands::link_up(&xgw)).await?;
        require_interface(&xgw, xgw_up)?;

        let attached = self
            .switch
            .table_cmd(&commands::add_port(bridge, &xgw))
            .await?;
        require_interface(&xgw, attached)?;

        info!(bridge, vxlan_id, vlan_tag, backbone, "Wired tenant bridge to backbone");
        Ok(())
    }
}
