//! Switch readiness polling.
//!
//! After the driver wires the network and starts the controller, each switch
//! takes a while to receive its forwarding rules. The poller repeatedly asks
//! every not-yet-ready switch for its installed-rule count until all are
//! ready, a hard deadline passes, or the caller cancels. Non-convergence is
//! reported as data in the [`ReadinessReport`], never as an error; deciding
//! whether a partially converged network is fatal belongs to the caller.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slice length for interruptible sleeps between rounds
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Driver-supplied capability for querying one live switch.
///
/// The poller makes no assumption about how the count is obtained; drivers
/// typically run `ovs-ofctl dump-flows` and feed the output through
/// [`crate::readiness::flows::count_forwarding_rules`].
pub trait SwitchHandle {
    /// 1-based switch id, matching the topology plan
    fn id(&self) -> u32;

    /// Number of forwarding rules currently installed on the switch
    fn current_rule_count(&self) -> color_eyre::eyre::Result<usize>;
}

impl<H: SwitchHandle + ?Sized> SwitchHandle for Box<H> {
    fn id(&self) -> u32 {
        (**self).id()
    }

    fn current_rule_count(&self) -> color_eyre::eyre::Result<usize> {
        (**self).current_rule_count()
    }
}

/// Polling cadence and thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Rules a switch must report before it counts as ready
    pub min_rules_per_switch: usize,
    /// Hard deadline for the whole wait
    #[serde(with = "humantime_serde")]
    pub max_wait: Duration,
    /// Sleep between polling rounds
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl PollSettings {
    /// Scale-sensitive defaults: convergence time for N switches against one
    /// controller grows with N, so the ceiling is `max(60s, 4s x N)` rather
    /// than a fixed constant. Interval and threshold match the original
    /// harness (2s cadence, one rule).
    pub fn for_switch_count(switch_count: u32) -> Self {
        Self {
            min_rules_per_switch: 1,
            max_wait: Duration::from_secs(60).max(Duration::from_secs(4) * switch_count),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Cloneable cancellation signal shared between the poller and the driver.
///
/// Drivers tear down the whole simulated network on abort and must not be
/// blocked behind a full polling deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Structured progress notifications, replacing interleaved text output
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A switch crossed the readiness threshold this round
    SwitchReady {
        switch_id: u32,
        rule_count: usize,
        elapsed: Duration,
    },
    /// A rule-count query failed; the switch stays unready and is retried
    QueryFailed { switch_id: u32 },
    /// A full polling round finished
    RoundCompleted {
        round: u32,
        elapsed: Duration,
        ready: usize,
        total: usize,
    },
}

/// Last observed state of one switch
#[derive(Debug, Clone, Serialize)]
pub struct SwitchReadiness {
    pub ready: bool,
    /// Rule count from the most recent query of this switch
    pub rule_count: usize,
    /// Elapsed time at which the switch became ready, if it did
    #[serde(with = "humantime_serde")]
    pub ready_at: Option<Duration>,
}

/// Outcome of one [`wait_until_ready`] call; immutable once returned
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub per_switch: BTreeMap<u32, SwitchReadiness>,
    pub overall_ready: bool,
    #[serde(with = "humantime_serde")]
    pub total_elapsed: Duration,
    /// True when a cancel token stopped polling before deadline or readiness
    pub cancelled: bool,
}

impl ReadinessReport {
    pub fn ready_count(&self) -> usize {
        self.per_switch.values().filter(|s| s.ready).count()
    }

    /// JSON form for driver-side diagnostics files
    pub fn to_json(&self) -> color_eyre::eyre::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize readiness report: {}", e))
    }
}

/// Poll every switch until all have at least `min_rules_per_switch` rules.
///
/// Rounds run sequentially: each not-yet-ready switch is queried once, ready
/// switches are never re-queried, and the loop sleeps `poll_interval`
/// between rounds. Returns within `max_wait + poll_interval` wall-clock time
/// in all cases. Cancellation is honored mid-round and mid-sleep, returning
/// whatever partial state was observed.
pub fn wait_until_ready<H, F>(
    switches: &[H],
    settings: &PollSettings,
    cancel: &CancelToken,
    mut observer: F,
) -> ReadinessReport
where
    H: SwitchHandle,
    F: FnMut(&PollEvent),
{
    let start = Instant::now();
    let mut per_switch: BTreeMap<u32, SwitchReadiness> = switches
        .iter()
        .map(|sw| {
            (
                sw.id(),
                SwitchReadiness {
                    ready: false,
                    rule_count: 0,
                    ready_at: None,
                },
            )
        })
        .collect();

    info!(
        "Waiting for {} switches to receive forwarding rules (min {} rules, deadline {:?})",
        switches.len(),
        settings.min_rules_per_switch,
        settings.max_wait
    );

    let mut round: u32 = 0;
    let mut cancelled = false;
    let overall_ready = loop {
        round += 1;

        for sw in switches {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            // Monotonic: a ready switch is never queried again
            let entry = match per_switch.get_mut(&sw.id()) {
                Some(entry) if !entry.ready => entry,
                _ => continue,
            };
            match sw.current_rule_count() {
                Ok(count) => {
                    entry.rule_count = count;
                    if count >= settings.min_rules_per_switch {
                        let elapsed = start.elapsed();
                        entry.ready = true;
                        entry.ready_at = Some(elapsed);
                        info!(
                            "sw{} ready with {} rules after {:.1}s",
                            sw.id(),
                            count,
                            elapsed.as_secs_f64()
                        );
                        observer(&PollEvent::SwitchReady {
                            switch_id: sw.id(),
                            rule_count: count,
                            elapsed,
                        });
                    }
                }
                Err(e) => {
                    warn!("Rule-count query failed for sw{}: {}", sw.id(), e);
                    observer(&PollEvent::QueryFailed { switch_id: sw.id() });
                }
            }
        }

        let elapsed = start.elapsed();
        let ready = per_switch.values().filter(|s| s.ready).count();
        debug!(
            "Round {}: {}/{} switches ready at {:.1}s",
            round,
            ready,
            per_switch.len(),
            elapsed.as_secs_f64()
        );
        observer(&PollEvent::RoundCompleted {
            round,
            elapsed,
            ready,
            total: per_switch.len(),
        });

        if ready == per_switch.len() {
            break true;
        }
        if cancelled || cancel.is_cancelled() {
            cancelled = true;
            break false;
        }
        if elapsed >= settings.max_wait {
            warn!(
                "Deadline passed after {:.1}s with {}/{} switches ready",
                elapsed.as_secs_f64(),
                ready,
                per_switch.len()
            );
            break false;
        }

        if sleep_interruptible(settings.poll_interval, cancel) {
            cancelled = true;
            break false;
        }
    };

    ReadinessReport {
        per_switch,
        overall_ready,
        total_elapsed: start.elapsed(),
        cancelled,
    }
}

/// Sleep in short slices so cancellation stays prompt; true if cancelled
fn sleep_interruptible(total: Duration, cancel: &CancelToken) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
