use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jenkins_smoke::builds::{ensure_all_reach_phase, BuildTracker};

fn tracker(names: &[&str]) -> BuildTracker {
    let mut tracker = BuildTracker::new();
    for name in names {
        tracker.track(*name);
    }
    tracker
}

#[tokio::test(start_paused = true)]
async fn succeeds_when_every_build_is_complete() {
    let mut builds = tracker(&["sample-1", "sample-3"]);
    let rounds = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        5,
        Duration::from_secs(10),
        |_| async { Ok("Complete".to_string()) },
    )
    .await
    .unwrap();
    assert_eq!(rounds, 1);
    assert_eq!(builds.phase("sample-1"), Some("Complete"));
    assert_eq!(builds.phase("sample-3"), Some("Complete"));
}

#[tokio::test(start_paused = true)]
async fn retries_while_a_build_is_still_new() {
    // sample-3 shows the transient "New" phase for two rounds, then completes
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let mut builds = tracker(&["sample-1", "sample-3"]);
    let rounds = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        10,
        Duration::from_secs(10),
        move |name| {
            let c = c.clone();
            async move {
                if name == "sample-1" {
                    return Ok("Complete".to_string());
                }
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok("New".to_string())
                } else {
                    Ok("Complete".to_string())
                }
            }
        },
    )
    .await
    .unwrap();
    assert_eq!(rounds, 3);
}

#[tokio::test(start_paused = true)]
async fn fails_fast_on_a_phase_outside_the_allowed_set() {
    let mut builds = tracker(&["sample-1", "sample-2"]);
    let phases: HashMap<&str, &str> =
        [("sample-1", "Complete"), ("sample-2", "Failed")].into();
    let err = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        5,
        Duration::from_secs(10),
        move |name| {
            let phase = phases[name.as_str()].to_string();
            async move { Ok(phase) }
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("sample-2"));
    assert!(err.to_string().contains("Failed"));
}

#[tokio::test(start_paused = true)]
async fn exhausting_rounds_reports_the_last_snapshot() {
    let mut builds = tracker(&["sample-1", "sample-2"]);
    let err = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        3,
        Duration::from_secs(10),
        |name| async move {
            if name == "sample-1" {
                Ok("Complete".to_string())
            } else {
                Ok("New".to_string())
            }
        },
    )
    .await
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("3 rounds"));
    assert!(message.contains("sample-2=New"));
}

#[tokio::test(start_paused = true)]
async fn convergence_requires_the_same_round() {
    // sample-2 completes only on round 2; round 1 must not succeed even
    // though sample-1 is already Complete there
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let mut builds = tracker(&["sample-1", "sample-2"]);
    let rounds = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        5,
        Duration::from_secs(10),
        move |name| {
            let c = c.clone();
            async move {
                if name == "sample-1" {
                    Ok("Complete".to_string())
                } else if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok("New".to_string())
                } else {
                    Ok("Complete".to_string())
                }
            }
        },
    )
    .await
    .unwrap();
    assert_eq!(rounds, 2);
}

#[tokio::test(start_paused = true)]
async fn tracking_nothing_is_an_error() {
    let mut builds = BuildTracker::new();
    let err = ensure_all_reach_phase(
        &mut builds,
        "Complete",
        5,
        Duration::from_secs(10),
        |_| async { Ok("Complete".to_string()) },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("no builds"));
}
