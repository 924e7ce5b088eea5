//! Port specification fixtures.
//!
//! Fixtures are expressed in the orchestrator's ingestion record shape
//! (JSON, numeric fields as strings) so tests also exercise the lenient
//! deserialization path.

use serde_json::{json, Value};

/// Common port specification fixtures
pub mod port_fixtures {
    use super::*;

    /// Managed IPv4 port on the shared bridge.
    pub fn managed_port() -> Value {
        json!({
            "name": "vm-88",
            "bridge": "cloud",
            "mac": "02:00:0a:09:01:8a",
            "ipv4": "10.9.1.138",
            "vlan": "1",
            "managed": true,
            "model": "virtio",
        })
    }

    /// Managed dual-stack port.
    pub fn dual_stack_port() -> Value {
        json!({
            "name": "vm-88",
            "bridge": "cloud",
            "mac": "02:00:0a:09:01:8a",
            "ipv4": "10.9.1.138",
            "ipv6": "2001:db8:9:1::138",
            "vlan": "1",
            "managed": true,
            "model": "virtio",
        })
    }

    /// Unmanaged port restricted only by source MAC.
    pub fn unmanaged_port() -> Value {
        json!({
            "name": "vm-88",
            "bridge": "cloud",
            "mac": "02:00:0a:09:01:8a",
            "vlan": "1",
            "managed": false,
            "model": "virtio",
        })
    }

    /// Tenant-overlay port on a private bridge.
    pub fn overlay_port() -> Value {
        json!({
            "name": "vm-12",
            "bridge": "tenant1",
            "mac": "02:00:0a:09:02:0c",
            "vlan": "9",
            "vxlan": "42",
            "managed": true,
            "model": "virtio",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::port_fixtures;

    #[test]
    fn test_fixture_shapes() {
        assert_eq!(port_fixtures::managed_port()["name"], "vm-88");
        assert_eq!(port_fixtures::overlay_port()["vxlan"], "42");
        assert!(port_fixtures::unmanaged_port()["vxlan"].is_null());
    }
}
