//! # SdnSim - Topology planning and readiness verification for simulated SDN networks
//!
//! This library builds and verifies small simulated multi-switch networks
//! used to validate a Faucet-based software-defined forwarding control plane.
//!
//! ## Overview
//!
//! Given a desired topology shape and scale, SdnSim computes a collision-free
//! physical wiring plan, synthesizes the Faucet configuration that serves that
//! plan (or any other shape at the same scale), and detects by polling the
//! moment each emulated switch has received usable forwarding state. The
//! harness driver that spawns Mininet, Docker, and ping probes sits outside
//! this crate and consumes plain values at the boundary.
//!
//! ## Key Features
//!
//! - **Four topology shapes**: star, mesh, binary tree, and linear chain,
//!   all sharing one per-switch port numbering discipline
//! - **Topology-agnostic configuration**: one Faucet document with worst-case
//!   trunk reservation is valid for every shape at a given scale
//! - **Self-checking synthesis**: configs that fail their own post-condition
//!   are rejected at generation time, never handed downstream
//! - **Bounded readiness polling**: hard deadline, monotonic per-switch
//!   ready flags, prompt cancellation, structured progress events
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: simulation parameter structures and YAML parsing
//! - `topology`: wiring plan computation (the planner)
//! - `faucet`: Faucet configuration synthesis and persistence
//! - `readiness`: switch readiness polling and flow-table dump parsing
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sdnsim::faucet;
//! use sdnsim::readiness::{self, CancelToken, PollSettings};
//! use sdnsim::topology::{self, TopologyShape};
//!
//! // Plan the physical wiring
//! let plan = topology::plan(TopologyShape::Star, 5, 2)?;
//!
//! // Synthesize and persist the controller configuration
//! let config = faucet::synthesize(plan.switch_count(), plan.hosts_per_switch)?;
//! config.save(std::path::Path::new("faucet.yaml"))?;
//!
//! // After the driver wires the network: wait for forwarding state
//! let handles: Vec<Box<dyn readiness::SwitchHandle>> = Vec::new();
//! let report = readiness::wait_until_ready(
//!     &handles,
//!     &PollSettings::for_switch_count(plan.switch_count()),
//!     &CancelToken::new(),
//!     |_event| {},
//! );
//! if !report.overall_ready {
//!     eprintln!("only {} switches converged", report.ready_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Structurally impossible parameters surface synchronously as typed errors
//! (`PlanError`, `ConfigError`, `ValidationError`); fallible I/O returns
//! `color_eyre::eyre::Result`. Readiness non-convergence is deliberately not
//! an error: the poller always returns a [`readiness::ReadinessReport`] and
//! the caller decides whether a partially converged network is fatal.

pub mod config;
pub mod faucet;
pub mod readiness;
pub mod topology;

// Re-export the pipeline entry points at the crate root
pub use config::{load_simulation_config, SimulationConfig};
pub use faucet::{synthesize, ConfigError, FaucetConfig};
pub use readiness::{
    wait_until_ready, CancelToken, PollSettings, ReadinessReport, SwitchHandle,
};
pub use topology::{plan, PlanError, TopologyPlan, TopologyShape};
