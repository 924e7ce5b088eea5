//! Flow rule construction for the switch flow table.

use ovsnet_common::{NetMgrError, NetMgrResult};

/// Match/action tuple encoded into the switch's textual flow grammar.
///
/// Field emission order is fixed. A rule built for insertion and later
/// for deletion must present identical match field sets: the switch
/// treats priority and actions as install-only attributes and ignores
/// them on deletion lookups, but a re-ordered or differing match set
/// will miss the flow table entry entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowRule {
    in_port: Option<u32>,
    dl_src: Option<String>,
    protocol: Option<String>,
    nw_src: Option<String>,
    ipv6_src: Option<String>,
    icmp_type: Option<u8>,
    nd_target: Option<String>,
    tp_dst: Option<u16>,
    priority: Option<u32>,
    actions: Option<String>,
}

impl FlowRule {
    /// Starts a rule matching a datapath port number.
    pub fn for_port(port_number: u32) -> Self {
        Self {
            in_port: Some(port_number),
            ..Self::default()
        }
    }

    /// Matches on the source MAC address.
    pub fn with_dl_src(mut self, mac: impl Into<String>) -> Self {
        self.dl_src = Some(mac.into());
        self
    }

    /// Matches on a protocol keyword (`ip`, `ipv6`, `arp`, `udp`, `icmp6`).
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Matches on the IPv4 source address.
    pub fn with_nw_src(mut self, addr: impl Into<String>) -> Self {
        self.nw_src = Some(addr.into());
        self
    }

    /// Matches on the IPv6 source address or prefix.
    pub fn with_ipv6_src(mut self, addr: impl Into<String>) -> Self {
        self.ipv6_src = Some(addr.into());
        self
    }

    /// Matches on an ICMPv6 message type.
    pub fn with_icmp_type(mut self, icmp_type: u8) -> Self {
        self.icmp_type = Some(icmp_type);
        self
    }

    /// Matches on the neighbor-discovery target address.
    pub fn with_nd_target(mut self, addr: impl Into<String>) -> Self {
        self.nd_target = Some(addr.into());
        self
    }

    /// Matches on the transport destination port.
    pub fn with_tp_dst(mut self, port: u16) -> Self {
        self.tp_dst = Some(port);
        self
    }

    /// Sets the rule priority (install-only attribute).
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the rule actions (install-only attribute).
    pub fn with_actions(mut self, actions: impl Into<String>) -> Self {
        self.actions = Some(actions.into());
        self
    }

    /// Returns the rule priority, if set.
    pub fn priority(&self) -> Option<u32> {
        self.priority
    }

    /// Strips install-only attributes, keeping the match fields.
    pub fn match_only(&self) -> FlowRule {
        let mut rule = self.clone();
        rule.priority = None;
        rule.actions = None;
        rule
    }

    /// Encodes into the comma-joined textual grammar.
    ///
    /// Only present fields are emitted, in fixed order; the protocol
    /// keyword is emitted bare.
    pub fn encode(&self) -> NetMgrResult<String> {
        let in_port = self
            .in_port
            .ok_or(NetMgrError::MissingMatchField { field: "in_port" })?;

        let mut fields = vec![format!("in_port={in_port}")];
        if let Some(v) = &self.dl_src {
            fields.push(format!("dl_src={v}"));
        }
        if let Some(v) = &self.protocol {
            fields.push(v.clone());
        }
        if let Some(v) = &self.nw_src {
            fields.push(format!("nw_src={v}"));
        }
        if let Some(v) = &self.ipv6_src {
            fields.push(format!("ipv6_src={v}"));
        }
        if let Some(v) = self.icmp_type {
            fields.push(format!("icmp_type={v}"));
        }
        if let Some(v) = &self.nd_target {
            fields.push(format!("nd_target={v}"));
        }
        if let Some(v) = self.tp_dst {
            fields.push(format!("tp_dst={v}"));
        }
        if let Some(v) = self.priority {
            fields.push(format!("priority={v}"));
        }
        if let Some(v) = &self.actions {
            fields.push(format!("actions={v}"));
        }
        Ok(fields.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_full_rule() {
        let rule = FlowRule::for_port(245)
            .with_dl_src("02:00:0a:09:01:8a")
            .with_protocol("udp")
            .with_tp_dst(68)
            .with_priority(43000)
            .with_actions("drop");
        assert_eq!(
            rule.encode().unwrap(),
            "in_port=245,dl_src=02:00:0a:09:01:8a,udp,tp_dst=68,priority=43000,actions=drop"
        );
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let rule = FlowRule::for_port(245)
            .with_priority(30000)
            .with_actions("drop");
        assert_eq!(rule.encode().unwrap(), "in_port=245,priority=30000,actions=drop");
    }

    #[test]
    fn test_encode_match_only() {
        let rule = FlowRule::for_port(245)
            .with_dl_src("02:00:0a:09:01:8a")
            .with_protocol("ip")
            .with_nw_src("10.9.1.138")
            .with_priority(42000)
            .with_actions("normal");
        assert_eq!(
            rule.match_only().encode().unwrap(),
            "in_port=245,dl_src=02:00:0a:09:01:8a,ip,nw_src=10.9.1.138"
        );
    }

    #[test]
    fn test_encode_fixed_order_for_nd_rule() {
        let rule = FlowRule::for_port(7)
            .with_dl_src("02:00:00:00:00:01")
            .with_protocol("icmp6")
            .with_ipv6_src("fe80::/64")
            .with_icmp_type(136)
            .with_nd_target("2001:db8::1")
            .with_priority(42001)
            .with_actions("normal");
        assert_eq!(
            rule.encode().unwrap(),
            "in_port=7,dl_src=02:00:00:00:00:01,icmp6,ipv6_src=fe80::/64,icmp_type=136,nd_target=2001:db8::1,priority=42001,actions=normal"
        );
    }

    #[test]
    fn test_encode_bare_in_port() {
        assert_eq!(FlowRule::for_port(245).encode().unwrap(), "in_port=245");
    }

    #[test]
    fn test_missing_in_port() {
        let rule = FlowRule::default().with_dl_src("02:00:00:00:00:01");
        assert!(matches!(
            rule.encode(),
            Err(NetMgrError::MissingMatchField { field: "in_port" })
        ));
    }
}
