//! Switch readiness verification module.
//!
//! This module contains the polling loop that detects when every switch has
//! received usable forwarding state from the controller, plus the flow-table
//! dump parsing drivers use to implement rule counting.

pub mod flows;
pub mod poller;

// Re-export key types and functions for easier access
pub use flows::count_forwarding_rules;
pub use poller::{
    wait_until_ready, CancelToken, PollEvent, PollSettings, ReadinessReport, SwitchHandle,
    SwitchReadiness,
};
