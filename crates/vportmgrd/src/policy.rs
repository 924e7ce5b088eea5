//! Per-port flow policy compilation.
//!
//! Higher numeric priority wins in the switch's match engine. The
//! managed-port ladder reads, lowest to highest: default deny, then
//! progressively more specific allows, with the DHCP-server ban on top
//! so it overrides the generic allow-from-valid-source rules.

use crate::flow::FlowRule;
use crate::types::{NetworkPortSpec, PortPolicy};

/// Default deny for all traffic entering through the port.
pub const PRIO_DROP_ALL: u32 = 30000;
/// Allow-all-from-MAC rule on unmanaged ports.
pub const PRIO_MAC_ALLOW: u32 = 40000;
/// DHCP client traffic toward a real server.
pub const PRIO_DHCP_CLIENT: u32 = 40000;
/// ARP restricted to the declared source.
pub const PRIO_ARP_ALLOW: u32 = 41000;
/// IPv4/IPv6 traffic from the declared source.
pub const PRIO_IP_ALLOW: u32 = 42000;
/// IPv6 neighbor advertisements for the port's address.
pub const PRIO_ND_ADVERT: u32 = 42001;
/// Guest impersonating a DHCP server.
pub const PRIO_DHCP_SERVER_BAN: u32 = 43000;

/// Link-local subnet sourcing IPv6 neighbor advertisements.
const IPV6_LINK_LOCAL: &str = "fe80::/64";
/// ICMPv6 neighbor advertisement message type.
const ND_ADVERT_TYPE: u8 = 136;

/// Compiles the ordered rule set implementing a port's isolation policy.
///
/// With `teardown` set, install-only attributes are stripped so the same
/// match field sets can be replayed as deletions.
pub fn rules_for(port: &NetworkPortSpec, port_number: u32, teardown: bool) -> Vec<FlowRule> {
    let rules = match port.policy() {
        // Isolation is delegated to the bridge/tunnel topology
        PortPolicy::TenantOverlay => Vec::new(),
        PortPolicy::OpenAllowFromMac => open_rules(port, port_number),
        PortPolicy::Managed => managed_rules(port, port_number),
    };
    if teardown {
        rules.iter().map(FlowRule::match_only).collect()
    } else {
        rules
    }
}

fn open_rules(port: &NetworkPortSpec, port_number: u32) -> Vec<FlowRule> {
    vec![
        FlowRule::for_port(port_number)
            .with_priority(PRIO_DROP_ALL)
            .with_actions("drop"),
        FlowRule::for_port(port_number)
            .with_dl_src(&port.mac)
            .with_priority(PRIO_MAC_ALLOW)
            .with_actions("normal"),
    ]
}

fn managed_rules(port: &NetworkPortSpec, port_number: u32) -> Vec<FlowRule> {
    let mut rules = vec![
        // Every allow below outranks this
        FlowRule::for_port(port_number)
            .with_priority(PRIO_DROP_ALL)
            .with_actions("drop"),
        FlowRule::for_port(port_number)
            .with_dl_src(&port.mac)
            .with_protocol("udp")
            .with_tp_dst(67)
            .with_priority(PRIO_DHCP_CLIENT)
            .with_actions("normal"),
    ];

    let mut arp = FlowRule::for_port(port_number)
        .with_dl_src(&port.mac)
        .with_protocol("arp");
    if let Some(ipv4) = &port.ipv4 {
        arp = arp.with_nw_src(ipv4);
    }
    rules.push(arp.with_priority(PRIO_ARP_ALLOW).with_actions("normal"));

    if let Some(ipv4) = &port.ipv4 {
        rules.push(
            FlowRule::for_port(port_number)
                .with_dl_src(&port.mac)
                .with_protocol("ip")
                .with_nw_src(ipv4)
                .with_priority(PRIO_IP_ALLOW)
                .with_actions("normal"),
        );
    }

    if let Some(ipv6) = &port.ipv6 {
        rules.push(
            FlowRule::for_port(port_number)
                .with_dl_src(&port.mac)
                .with_protocol("ipv6")
                .with_ipv6_src(ipv6)
                .with_priority(PRIO_IP_ALLOW)
                .with_actions("normal"),
        );
        // Neighbor advertisements carry the link-local source, not the
        // port's global address; match the ND target instead
        rules.push(
            FlowRule::for_port(port_number)
                .with_dl_src(&port.mac)
                .with_protocol("icmp6")
                .with_ipv6_src(IPV6_LINK_LOCAL)
                .with_icmp_type(ND_ADVERT_TYPE)
                .with_nd_target(ipv6)
                .with_priority(PRIO_ND_ADVERT)
                .with_actions("normal"),
        );
    }

    // Highest priority: the guest's MAC/IP match the allow rules above,
    // so answering as a DHCP server must be banned explicitly
    rules.push(
        FlowRule::for_port(port_number)
            .with_dl_src(&port.mac)
            .with_protocol("udp")
            .with_tp_dst(68)
            .with_priority(PRIO_DHCP_SERVER_BAN)
            .with_actions("drop"),
    );

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn managed_spec() -> NetworkPortSpec {
        NetworkPortSpec {
            name: "vm-88".to_string(),
            bridge: "cloud".to_string(),
            mac: "02:00:0a:09:01:8a".to_string(),
            ipv4: Some("10.9.1.138".to_string()),
            ipv6: None,
            vlan: 1,
            vxlan: None,
            managed: true,
            model: "virtio".to_string(),
        }
    }

    fn encoded(rules: &[FlowRule]) -> Vec<String> {
        rules.iter().map(|r| r.encode().unwrap()).collect()
    }

    #[test]
    fn test_managed_ipv4_rules() {
        let rules = rules_for(&managed_spec(), 245, false);
        assert_eq!(
            encoded(&rules),
            vec![
                "in_port=245,priority=30000,actions=drop",
                "in_port=245,dl_src=02:00:0a:09:01:8a,udp,tp_dst=67,priority=40000,actions=normal",
                "in_port=245,dl_src=02:00:0a:09:01:8a,arp,nw_src=10.9.1.138,priority=41000,actions=normal",
                "in_port=245,dl_src=02:00:0a:09:01:8a,ip,nw_src=10.9.1.138,priority=42000,actions=normal",
                "in_port=245,dl_src=02:00:0a:09:01:8a,udp,tp_dst=68,priority=43000,actions=drop",
            ]
        );
    }

    #[test]
    fn test_managed_dual_stack_adds_ipv6_and_nd() {
        let mut spec = managed_spec();
        spec.ipv6 = Some("2001:db8:9:1::138".to_string());
        let texts = encoded(&rules_for(&spec, 245, false));
        assert!(texts.contains(
            &"in_port=245,dl_src=02:00:0a:09:01:8a,ipv6,ipv6_src=2001:db8:9:1::138,priority=42000,actions=normal"
                .to_string()
        ));
        assert!(texts.contains(
            &"in_port=245,dl_src=02:00:0a:09:01:8a,icmp6,ipv6_src=fe80::/64,icmp_type=136,nd_target=2001:db8:9:1::138,priority=42001,actions=normal"
                .to_string()
        ));
    }

    #[test]
    fn test_managed_without_addresses_skips_ip_allows() {
        let mut spec = managed_spec();
        spec.ipv4 = None;
        let texts = encoded(&rules_for(&spec, 245, false));
        // ARP degrades to MAC-only; no ip/ipv6 allow at all
        assert!(texts.contains(
            &"in_port=245,dl_src=02:00:0a:09:01:8a,arp,priority=41000,actions=normal".to_string()
        ));
        assert!(!texts.iter().any(|t| t.contains("nw_src") && t.contains(",ip,")));
        assert!(!texts.iter().any(|t| t.contains("ipv6_src")));
    }

    #[test]
    fn test_unmanaged_rules() {
        let mut spec = managed_spec();
        spec.managed = false;
        assert_eq!(
            encoded(&rules_for(&spec, 245, false)),
            vec![
                "in_port=245,priority=30000,actions=drop",
                "in_port=245,dl_src=02:00:0a:09:01:8a,priority=40000,actions=normal",
            ]
        );
    }

    #[test]
    fn test_overlay_installs_no_rules() {
        let mut spec = managed_spec();
        spec.vxlan = Some(42);
        assert!(rules_for(&spec, 245, false).is_empty());
    }

    #[test]
    fn test_teardown_round_trip() {
        let mut spec = managed_spec();
        spec.ipv6 = Some("2001:db8:9:1::138".to_string());

        let installed = rules_for(&spec, 245, false);
        let removed = rules_for(&spec, 245, true);
        assert_eq!(installed.len(), removed.len());
        for (add, del) in installed.iter().zip(removed.iter()) {
            assert_eq!(add.match_only(), *del);
            assert!(del.priority().is_none());
        }
    }

    #[test]
    fn test_priority_ladder() {
        assert!(PRIO_DHCP_SERVER_BAN > PRIO_ND_ADVERT);
        assert!(PRIO_ND_ADVERT > PRIO_IP_ALLOW);
        assert!(PRIO_IP_ALLOW > PRIO_ARP_ALLOW);
        assert!(PRIO_ARP_ALLOW > PRIO_DHCP_CLIENT);
        assert!(PRIO_DHCP_CLIENT > PRIO_DROP_ALL);
    }

    #[test]
    fn test_dhcp_ban_outranks_every_managed_rule() {
        let mut spec = managed_spec();
        spec.ipv6 = Some("2001:db8:9:1::138".to_string());
        let rules = rules_for(&spec, 245, false);
        let ban = rules
            .iter()
            .find(|r| r.encode().unwrap().contains("tp_dst=68"))
            .unwrap();
        for rule in &rules {
            if rule != ban {
                assert!(ban.priority() > rule.priority());
            }
        }
    }
}
