//! Control command token builders for the virtual switch.
//!
//! Each builder produces the argument vector for one command family
//! invocation; the gateway decides which binary receives it.

/// Multicast group used for VXLAN flood/broadcast emulation.
pub const VXLAN_GROUP: &str = "239.1.1.1";

/// IANA-assigned VXLAN UDP destination port.
pub const VXLAN_DSTPORT: u16 = 4789;

/// Tag sub-interface name for a tenant bridge gateway chain.
pub fn gateway_ifname(bridge: &str) -> String {
    format!("{bridge}-gw")
}

/// Tunnel sub-interface name for a tenant bridge gateway chain.
pub fn tunnel_ifname(bridge: &str) -> String {
    format!("{bridge}-xgw")
}

fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// `add-port <bridge> <port>`
pub fn add_port(bridge: &str, port: &str) -> Vec<String> {
    tokens(&["add-port", bridge, port])
}

/// `del-port <port>`
pub fn del_port(port: &str) -> Vec<String> {
    tokens(&["del-port", port])
}

/// `set Port <port> tag=<vlan>`
pub fn set_port_tag(port: &str, vlan: u16) -> Vec<String> {
    tokens(&["set", "Port", port, &format!("tag={vlan}")])
}

/// `br-exists <bridge>`, exit 0 when present, 2 when absent.
pub fn bridge_exists(bridge: &str) -> Vec<String> {
    tokens(&["br-exists", bridge])
}

/// `add-br <bridge>`
pub fn add_bridge(bridge: &str) -> Vec<String> {
    tokens(&["add-br", bridge])
}

/// Attach the gateway tag hop to the backbone as an internal-type port.
///
/// `add-port <backbone> <gw> tag=<vlan> -- set Interface <gw> type=internal`
pub fn add_gateway_port(backbone: &str, gw: &str, vlan: u16) -> Vec<String> {
    tokens(&[
        "add-port",
        backbone,
        gw,
        &format!("tag={vlan}"),
        "--",
        "set",
        "Interface",
        gw,
        "type=internal",
    ])
}

/// `add-flow <bridge> <rule>`
pub fn add_flow(bridge: &str, rule: &str) -> Vec<String> {
    tokens(&["add-flow", bridge, rule])
}

/// `del-flows <bridge> <rule>`
pub fn del_flows(bridge: &str, rule: &str) -> Vec<String> {
    tokens(&["del-flows", bridge, rule])
}

/// `link set up <ifname>`
pub fn link_up(ifname: &str) -> Vec<String> {
    tokens(&["link", "set", "up", ifname])
}

/// `link add <ifname> type vxlan id <vni> group .. dstport .. dev <device>`
pub fn add_vxlan(ifname: &str, vni: u32, device: &str) -> Vec<String> {
    tokens(&[
        "link",
        "add",
        ifname,
        "type",
        "vxlan",
        "id",
        &vni.to_string(),
        "group",
        VXLAN_GROUP,
        "dstport",
        &VXLAN_DSTPORT.to_string(),
        "dev",
        device,
    ])
}

/// `tuntap add mode tap <ifname>`, loopback interface for emulated runs.
pub fn add_tap(ifname: &str) -> Vec<String> {
    tokens(&["tuntap", "add", "mode", "tap", ifname])
}

/// `tuntap del mode tap <ifname>`
pub fn del_tap(ifname: &str) -> Vec<String> {
    tokens(&["tuntap", "del", "mode", "tap", ifname])
}
