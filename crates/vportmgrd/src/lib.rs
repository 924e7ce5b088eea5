//! vportmgrd - VM network port provisioning daemon for Open vSwitch
//!
//! Provisions and tears down virtual machine ports on the switch,
//! compiles per-port anti-spoofing flow policy, and bridges tenant
//! networks across hosts with VLAN tag + VXLAN tunnel encapsulation.

pub mod commands;
mod flow;
mod overlay;
mod policy;
mod port_mgr;
mod switch;
mod types;

pub use flow::FlowRule;
pub use overlay::OverlayBridgeManager;
pub use policy::{
    rules_for, PRIO_ARP_ALLOW, PRIO_DHCP_CLIENT, PRIO_DHCP_SERVER_BAN, PRIO_DROP_ALL,
    PRIO_IP_ALLOW, PRIO_MAC_ALLOW, PRIO_ND_ADVERT,
};
pub use port_mgr::{PortMgr, ReadyHook};
pub use switch::OvsSwitch;
pub use types::{DriverConfig, NetworkPortSpec, PortPolicy};
