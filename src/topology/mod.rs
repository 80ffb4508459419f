//! Network topology module.
//!
//! This module contains the topology planner: pure functions that turn a
//! requested shape and scale into a collision-free physical wiring plan.

pub mod planner;
pub mod types;

// Re-export key types and functions for easier access
pub use planner::plan;
pub use types::{Link, LinkEndpoint, PlanError, PortRef, Switch, TopologyPlan, TopologyShape};
