//! Faucet controller configuration synthesis.
//!
//! One configuration serves every topology shape at a given scale: all ports
//! share a single VLAN with unknown-unicast flooding enabled, and every
//! switch reserves `N-1` trunk interfaces (the star hub's worst case), so
//! the physical wiring alone decides the shape. The YAML emitted here is the
//! document the Faucet process reads; field names must not drift.

use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The single broadcast domain all ports join
pub const DEFAULT_VLAN_ID: u32 = 100;

/// Hardware string Faucet expects for Open vSwitch datapaths
pub const OVS_HARDWARE: &str = "Open vSwitch";

/// Synthesis and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Generated configuration failed validation: {0}")]
    Generation(String),
}

/// Whether an interface faces an end host or another switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRole {
    Host,
    Trunk,
}

/// One switch port in the Faucet config
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceConfig {
    pub description: String,
    pub native_vlan: u32,
    /// Internal bookkeeping; not part of the persisted document
    #[serde(skip)]
    pub role: InterfaceRole,
}

/// One datapath ("sw<i>") entry
#[derive(Debug, Clone, Serialize)]
pub struct DatapathConfig {
    pub dp_id: u64,
    pub hardware: String,
    pub interfaces: BTreeMap<u32, InterfaceConfig>,
}

impl DatapathConfig {
    /// Count interfaces carrying the given role
    pub fn role_count(&self, role: InterfaceRole) -> usize {
        self.interfaces.values().filter(|i| i.role == role).count()
    }
}

/// The broadcast domain descriptor
#[derive(Debug, Clone, Serialize)]
pub struct VlanConfig {
    pub description: String,
    pub unicast_flood: bool,
}

/// Complete Faucet configuration document
#[derive(Debug, Clone, Serialize)]
pub struct FaucetConfig {
    pub vlans: BTreeMap<u32, VlanConfig>,
    pub dps: BTreeMap<String, DatapathConfig>,
}

impl FaucetConfig {
    /// Look up the datapath entry for a 1-based switch id
    pub fn datapath(&self, switch_id: u32) -> Option<&DatapathConfig> {
        self.dps.get(&format!("sw{}", switch_id))
    }

    /// Post-synthesis invariant check.
    ///
    /// A config that silently carries fewer switches or the wrong port-role
    /// mix only surfaces much later as unexplained per-switch non-readiness,
    /// so callers must fail fast here instead of passing it downstream.
    pub fn validate(&self, switch_count: u32, hosts_per_switch: u32) -> Result<(), ConfigError> {
        let vlan = self
            .vlans
            .get(&DEFAULT_VLAN_ID)
            .ok_or_else(|| ConfigError::Generation(format!("VLAN {} missing", DEFAULT_VLAN_ID)))?;
        if !vlan.unicast_flood {
            return Err(ConfigError::Generation(
                "unicast_flood disabled; cross-switch forwarding cannot work".to_string(),
            ));
        }

        if self.dps.len() != switch_count as usize {
            return Err(ConfigError::Generation(format!(
                "expected {} switches, config has {}",
                switch_count,
                self.dps.len()
            )));
        }

        let expected_trunks = (switch_count - 1) as usize;
        for i in 1..=switch_count {
            let dp = self.datapath(i).ok_or_else(|| {
                ConfigError::Generation(format!("switch sw{} missing from config", i))
            })?;
            let hosts = dp.role_count(InterfaceRole::Host);
            if hosts != hosts_per_switch as usize {
                return Err(ConfigError::Generation(format!(
                    "sw{} has {} host ports, expected {}",
                    i, hosts, hosts_per_switch
                )));
            }
            let trunks = dp.role_count(InterfaceRole::Trunk);
            if trunks != expected_trunks {
                return Err(ConfigError::Generation(format!(
                    "sw{} has {} trunk ports, expected {}",
                    i, trunks, expected_trunks
                )));
            }
        }
        Ok(())
    }

    /// Serialize to the YAML document the Faucet process reads
    pub fn to_yaml(&self) -> color_eyre::eyre::Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize Faucet config: {}", e))
    }

    /// Write the YAML document to disk for the controller to pick up
    pub fn save(&self, path: &Path) -> color_eyre::eyre::Result<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to write {:?}: {}", path, e))?;
        info!("Wrote Faucet configuration to {:?}", path);
        Ok(())
    }
}

/// Synthesize the topology-agnostic Faucet configuration for a network of
/// `switch_count` switches with `hosts_per_switch` hosts each.
///
/// Deliberately takes counts rather than a [`crate::topology::TopologyPlan`]:
/// the same document must stay valid no matter which shape the driver wires
/// afterward, so every switch reserves trunk ports
/// `hosts_per_switch+1 ..= hosts_per_switch+(switch_count-1)` whether or not
/// the physical plan uses them.
pub fn synthesize(switch_count: u32, hosts_per_switch: u32) -> Result<FaucetConfig, ConfigError> {
    if switch_count < 1 {
        return Err(ConfigError::InvalidParameter(
            "switch count must be at least 1".to_string(),
        ));
    }
    if hosts_per_switch < 1 {
        return Err(ConfigError::InvalidParameter(
            "hosts per switch must be at least 1".to_string(),
        ));
    }

    let mut vlans = BTreeMap::new();
    vlans.insert(
        DEFAULT_VLAN_ID,
        VlanConfig {
            description: "default VLAN".to_string(),
            unicast_flood: true,
        },
    );

    let mut dps = BTreeMap::new();
    for i in 1..=switch_count {
        let mut interfaces = BTreeMap::new();

        // Host ports, labeled with the global host numbering h1..h(N*H)
        for port in 1..=hosts_per_switch {
            let host_num = (i - 1) * hosts_per_switch + port;
            interfaces.insert(
                port,
                InterfaceConfig {
                    description: format!("h{}", host_num),
                    native_vlan: DEFAULT_VLAN_ID,
                    role: InterfaceRole::Host,
                },
            );
        }

        // Worst-case trunk reservation: enough for the star hub
        for j in 0..switch_count - 1 {
            let trunk_port = hosts_per_switch + 1 + j;
            interfaces.insert(
                trunk_port,
                InterfaceConfig {
                    description: format!("inter-switch trunk port {}", trunk_port),
                    native_vlan: DEFAULT_VLAN_ID,
                    role: InterfaceRole::Trunk,
                },
            );
        }

        dps.insert(
            format!("sw{}", i),
            DatapathConfig {
                dp_id: u64::from(i),
                hardware: OVS_HARDWARE.to_string(),
                interfaces,
            },
        );
    }

    let config = FaucetConfig { vlans, dps };
    config.validate(switch_count, hosts_per_switch)?;

    info!(
        "Synthesized Faucet config: {} switches, {} host + {} trunk ports each",
        switch_count,
        hosts_per_switch,
        switch_count - 1
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_counts() {
        assert!(matches!(
            synthesize(0, 2),
            Err(ConfigError::InvalidParameter(_))
        ));
        assert!(matches!(
            synthesize(3, 0),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_five_switches_two_hosts() {
        let config = synthesize(5, 2).unwrap();
        assert_eq!(config.dps.len(), 5);
        for i in 1..=5 {
            let dp = config.datapath(i).unwrap();
            assert_eq!(dp.dp_id, u64::from(i));
            assert_eq!(dp.hardware, OVS_HARDWARE);
            assert_eq!(dp.role_count(InterfaceRole::Host), 2);
            assert_eq!(dp.role_count(InterfaceRole::Trunk), 4);
            // Trunks sit directly above the host ports
            let trunk_ports: Vec<u32> = dp
                .interfaces
                .iter()
                .filter(|(_, iface)| iface.role == InterfaceRole::Trunk)
                .map(|(port, _)| *port)
                .collect();
            assert_eq!(trunk_ports, vec![3, 4, 5, 6]);
        }

        // Host labels follow the global numbering
        let sw3 = config.datapath(3).unwrap();
        assert_eq!(sw3.interfaces[&1].description, "h5");
        assert_eq!(sw3.interfaces[&2].description, "h6");
    }

    #[test]
    fn test_single_switch_has_no_trunks() {
        let config = synthesize(1, 4).unwrap();
        let dp = config.datapath(1).unwrap();
        assert_eq!(dp.role_count(InterfaceRole::Host), 4);
        assert_eq!(dp.role_count(InterfaceRole::Trunk), 0);
    }

    #[test]
    fn test_validate_catches_missing_switch() {
        let mut config = synthesize(4, 2).unwrap();
        config.dps.remove("sw4");
        assert!(matches!(
            config.validate(4, 2),
            Err(ConfigError::Generation(_))
        ));
    }

    #[test]
    fn test_validate_catches_wrong_role_counts() {
        let mut config = synthesize(3, 2).unwrap();
        config
            .dps
            .get_mut("sw2")
            .unwrap()
            .interfaces
            .remove(&3);
        assert!(matches!(
            config.validate(3, 2),
            Err(ConfigError::Generation(_))
        ));
    }

    #[test]
    fn test_validate_catches_disabled_flooding() {
        let mut config = synthesize(2, 1).unwrap();
        config.vlans.get_mut(&DEFAULT_VLAN_ID).unwrap().unicast_flood = false;
        assert!(matches!(
            config.validate(2, 1),
            Err(ConfigError::Generation(_))
        ));
    }

    #[test]
    fn test_yaml_field_names_match_faucet_schema() {
        let yaml = synthesize(2, 1).unwrap().to_yaml().unwrap();
        for field in [
            "vlans:",
            "unicast_flood: true",
            "dps:",
            "sw1:",
            "dp_id: 1",
            "hardware: Open vSwitch",
            "interfaces:",
            "native_vlan: 100",
            "description: h1",
        ] {
            assert!(yaml.contains(field), "missing '{}' in:\n{}", field, yaml);
        }
        // Internal role tag must not leak into the document
        assert!(!yaml.contains("role"));
    }

    #[test]
    fn test_save_writes_parseable_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faucet.yaml");
        synthesize(3, 2).unwrap().save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&raw).unwrap();
        assert!(parsed["dps"]["sw3"]["interfaces"].is_mapping());
        assert_eq!(parsed["vlans"][100]["unicast_flood"], serde_yaml::Value::Bool(true));
    }
}
