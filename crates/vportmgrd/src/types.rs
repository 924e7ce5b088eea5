//! Type definitions for vportmgrd

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use ovsnet_common::{NetMgrError, NetMgrResult};

/// Colon-separated MAC address format.
static MAC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{2}:){5}[0-9a-fA-F]{2}$").expect("Invalid regex pattern"));

/// Declarative description of a VM network attachment.
///
/// Produced by the external orchestrator and passed by value per
/// operation; nothing is retained between calls. Numeric fields may
/// arrive as JSON strings and are parsed leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPortSpec {
    /// Unique interface identifier (e.g. "vm-88").
    pub name: String,
    /// Target switch bridge name.
    pub bridge: String,
    /// Guest MAC address.
    pub mac: String,
    /// Optional IPv4 source address used for spoof filtering.
    #[serde(default)]
    pub ipv4: Option<String>,
    /// Optional IPv6 source address used for spoof filtering.
    #[serde(default)]
    pub ipv6: Option<String>,
    /// VLAN tag; 0 = untagged.
    #[serde(default, deserialize_with = "lenient_u16")]
    pub vlan: u16,
    /// Tunnel network identifier; presence marks a tenant-overlay port.
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub vxlan: Option<u32>,
    /// Apply strict anti-spoof policy vs. allow-all-from-MAC.
    #[serde(default)]
    pub managed: bool,
    /// Guest NIC emulation type, irrelevant to provisioning.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "virtio".to_string()
}

impl NetworkPortSpec {
    /// Selects the isolation policy for this specification.
    ///
    /// An overlay port suppresses per-port managed filtering; isolation
    /// is delegated to the bridge/tunnel topology.
    pub fn policy(&self) -> PortPolicy {
        if self.vxlan.is_some() {
            PortPolicy::TenantOverlay
        } else if self.managed {
            PortPolicy::Managed
        } else {
            PortPolicy::OpenAllowFromMac
        }
    }

    /// Validates the fields a provisioning operation depends on.
    pub fn validate(&self) -> NetMgrResult<()> {
        if self.name.is_empty() {
            return Err(NetMgrError::invalid_spec("name", "must not be empty"));
        }
        if self.bridge.is_empty() {
            return Err(NetMgrError::invalid_spec("bridge", "must not be empty"));
        }
        if !MAC_RE.is_match(&self.mac) {
            return Err(NetMgrError::invalid_spec(
                "mac",
                format!("'{}' is not a colon-separated MAC address", self.mac),
            ));
        }
        Ok(())
    }
}

/// Isolation policy, selected once from a validated specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortPolicy {
    /// Anti-spoofing rule ladder restricting traffic to the declared
    /// MAC/IP.
    Managed,
    /// Allow all traffic sourced from the declared MAC.
    OpenAllowFromMac,
    /// Per-tenant bridge with tag + tunnel isolation; no per-port rules.
    TenantOverlay,
}

/// Driver configuration passed to the provisioner at construction.
///
/// Replaces the module-level driver toggles of older drivers; there is
/// no process-wide mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Create loopback tap interfaces instead of expecting the
    /// hypervisor to provide them.
    #[serde(default)]
    pub emulated: bool,
    /// The switch manages port attachment itself; skip port table
    /// mutation.
    #[serde(default)]
    pub native_attach: bool,
    /// Backbone bridge carrying tenant overlay traffic between hosts.
    #[serde(default = "default_backbone")]
    pub backbone_bridge: String,
}

fn default_backbone() -> String {
    "cloud".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            emulated: false,
            native_attach: false,
            backbone_bridge: default_backbone(),
        }
    }
}

/// Accepts a number or a numeric string.
fn lenient_u16<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u16),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Accepts a number, a numeric string, an empty string (absent), or null.
fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
