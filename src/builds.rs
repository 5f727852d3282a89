//! Tracking of triggered builds and the reconciliation check that waits for
//! every tracked build to converge to a terminal phase.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::cluster::FetchError;

/// Phase a build may legitimately show while the sync plugin is still
/// reconciling a freshly re-created build.
const TRANSIENT_PHASE: &str = "New";

/// Last observed phase per tracked build name.
///
/// Created empty at scenario start, populated by "trigger build" steps,
/// checked by "verify build status" steps, dropped with the scenario.
#[derive(Debug, Default, Clone)]
pub struct BuildTracker {
    phases: BTreeMap<String, Option<String>>,
}

impl BuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, name: impl Into<String>) {
        self.phases.insert(name.into(), None);
    }

    pub fn untrack(&mut self, name: &str) -> Option<Option<String>> {
        self.phases.remove(name)
    }

    pub fn record_phase(&mut self, name: &str, phase: impl Into<String>) {
        if let Some(slot) = self.phases.get_mut(name) {
            *slot = Some(phase.into());
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.phases.keys().cloned().collect()
    }

    pub fn phase(&self, name: &str) -> Option<&str> {
        self.phases.get(name).and_then(|p| p.as_deref())
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// True when every tracked build has an observed phase equal to
    /// `expected`. Strict equality; a build still at `None` does not count.
    pub fn all_in_phase(&self, expected: &str) -> bool {
        !self.phases.is_empty()
            && self
                .phases
                .values()
                .all(|phase| phase.as_deref() == Some(expected))
    }

    pub fn snapshot(&self) -> String {
        let parts: Vec<String> = self
            .phases
            .iter()
            .map(|(name, phase)| format!("{}={}", name, phase.as_deref().unwrap_or("<unknown>")))
            .collect();
        parts.join(", ")
    }
}

/// Waits for every tracked build to reach `expected` in the same round.
///
/// Each round sleeps `interval`, then fetches each build's phase exactly once
/// (no nested retry). A phase that is neither `expected` nor the transient
/// "New" fails immediately: the sync plugin re-creates deleted builds in
/// "New" before they run to completion, but any other phase means the build
/// ended somewhere it should not have.
///
/// Returns the number of rounds used. Exhausting `max_rounds` is an error
/// carrying the final tracker snapshot.
pub async fn ensure_all_reach_phase<F, Fut>(
    tracker: &mut BuildTracker,
    expected: &str,
    max_rounds: u32,
    interval: Duration,
    mut fetch: F,
) -> Result<u32>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    if tracker.is_empty() {
        bail!("no builds are being tracked");
    }

    for round in 1..=max_rounds {
        tokio::time::sleep(interval).await;

        for name in tracker.names() {
            let phase = fetch(name.clone()).await?;
            if phase != expected && phase != TRANSIENT_PHASE {
                bail!(
                    "build {} was found in phase {:?}, expected {:?} or {:?}",
                    name,
                    phase,
                    expected,
                    TRANSIENT_PHASE
                );
            }
            debug!(build = %name, phase = %phase, round, "observed build phase");
            tracker.record_phase(&name, phase);
        }

        if tracker.all_in_phase(expected) {
            info!(round, builds = %tracker.snapshot(), "all builds converged");
            return Ok(round);
        }
    }

    bail!(
        "at least one build did not reach {:?} after {} rounds: {}",
        expected,
        max_rounds,
        tracker.snapshot()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_records_and_prunes() {
        let mut tracker = BuildTracker::new();
        tracker.track("sample-1");
        tracker.track("sample-2");
        tracker.record_phase("sample-1", "Complete");
        assert_eq!(tracker.phase("sample-1"), Some("Complete"));
        assert_eq!(tracker.phase("sample-2"), None);
        assert!(!tracker.all_in_phase("Complete"));

        tracker.untrack("sample-2");
        assert!(tracker.all_in_phase("Complete"));
    }

    #[test]
    fn empty_tracker_never_converges() {
        let tracker = BuildTracker::new();
        assert!(!tracker.all_in_phase("Complete"));
    }
}
