//! Topology type definitions.
//!
//! This file contains the type definitions shared by the shape-specific
//! planners: the topology shape enum, switches with their port assignments,
//! and the complete wiring plan handed to the harness driver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Physical topology shape to plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyShape {
    /// Switch 1 is the hub; every other switch connects to it
    Star,
    /// Full pairwise connectivity for small switch counts (see planner notes)
    Mesh,
    /// Binary tree rooted at switch 1
    Tree,
    /// Chain: switch i connects to switch i+1
    Linear,
}

impl TopologyShape {
    /// All supported shapes, in a stable order
    pub fn all() -> [TopologyShape; 4] {
        [Self::Star, Self::Mesh, Self::Tree, Self::Linear]
    }

    /// Returns true if this shape is only meaningful with at least two switches
    pub fn requires_multiple_switches(&self) -> bool {
        !matches!(self, Self::Star)
    }
}

impl fmt::Display for TopologyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Star => "star",
            Self::Mesh => "mesh",
            Self::Tree => "tree",
            Self::Linear => "linear",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TopologyShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "star" => Ok(Self::Star),
            "mesh" => Ok(Self::Mesh),
            "tree" => Ok(Self::Tree),
            "linear" => Ok(Self::Linear),
            other => Err(format!("Unsupported topology shape '{}'", other)),
        }
    }
}

/// One side of an inter-switch link, as seen from a particular switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkEndpoint {
    /// Port on this switch carrying the link (unique among the switch's ports)
    pub local_port: u32,
    /// Switch on the other side of the link
    pub remote_switch_id: u32,
    /// Port used on the remote switch
    pub remote_port: u32,
}

/// A (switch, port) pair identifying one attachment point of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortRef {
    pub switch_id: u32,
    pub port: u32,
}

/// An unordered inter-switch link between two attachment points
///
/// Construction normalizes endpoint order so that equality does not depend
/// on which side was named first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub left: PortRef,
    pub right: PortRef,
}

impl Link {
    pub fn new(a: PortRef, b: PortRef) -> Self {
        if a.switch_id <= b.switch_id {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }

    /// Returns true if this link touches the given switch
    pub fn involves(&self, switch_id: u32) -> bool {
        self.left.switch_id == switch_id || self.right.switch_id == switch_id
    }
}

/// A planned switch with its identity and port assignments
///
/// Ports `1..=host_port_count` are host ports; trunk ports appear in `links`
/// in the order the planner created them. Immutable once the plan is built.
#[derive(Debug, Clone, Serialize)]
pub struct Switch {
    /// 1-based ordinal within the plan
    pub id: u32,
    /// Unique datapath identifier exposed to the control plane
    pub dp_id: u64,
    /// Number of host-facing ports (ports 1..=host_port_count)
    pub host_port_count: u32,
    /// Inter-switch attachments in creation order
    pub links: Vec<LinkEndpoint>,
}

impl Switch {
    pub(crate) fn new(id: u32, host_port_count: u32) -> Self {
        Self {
            id,
            dp_id: u64::from(id),
            host_port_count,
            links: Vec::new(),
        }
    }

    /// Mininet/Faucet name of this switch ("sw1", "sw2", ...)
    pub fn name(&self) -> String {
        format!("sw{}", self.id)
    }

    /// Number of inter-switch links attached to this switch
    pub fn trunk_degree(&self) -> usize {
        self.links.len()
    }

    /// Every port number in use on this switch: host ports then trunk ports
    pub fn used_ports(&self) -> Vec<u32> {
        let mut ports: Vec<u32> = (1..=self.host_port_count).collect();
        ports.extend(self.links.iter().map(|l| l.local_port));
        ports
    }
}

/// Complete wiring plan for one simulated network
///
/// Produced by [`crate::topology::plan`] and consumed by the harness driver,
/// which turns `links` into emulated cables. Holds no I/O resources.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyPlan {
    /// Shape the caller asked for
    pub shape: TopologyShape,
    /// Host ports per switch
    pub hosts_per_switch: u32,
    /// Switches keyed by 1-based id
    pub switches: BTreeMap<u32, Switch>,
    /// Inter-switch links in creation order
    pub links: Vec<Link>,
    /// Trunk ports the Faucet config must reserve per switch so the same
    /// config serves this or any denser topology at this scale (N-1)
    pub max_trunk_ports_reserved: u32,
}

impl TopologyPlan {
    pub fn switch_count(&self) -> u32 {
        self.switches.len() as u32
    }

    pub fn total_hosts(&self) -> u32 {
        self.switch_count() * self.hosts_per_switch
    }

    /// Inter-switch link count attached to the given switch, if it exists
    pub fn trunk_degree(&self, switch_id: u32) -> Option<usize> {
        self.switches.get(&switch_id).map(Switch::trunk_degree)
    }
}

/// Planning errors
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
