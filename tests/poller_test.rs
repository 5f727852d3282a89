use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jenkins_smoke::cluster::FetchError;
use jenkins_smoke::poller::{poll_until, MatchPolicy, PollRequest, PollResult};
use jenkins_smoke::ResourceKind;
use tokio::time::Instant;

fn request(expected: &str, interval: Duration, max_retries: u32) -> PollRequest {
    PollRequest::new(
        ResourceKind::Build,
        "openshift-jee-sample-1",
        "jenkins-test",
        "{.status.phase}",
        expected,
        interval,
        max_retries,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn immediate_match_uses_one_attempt() {
    let req = request("Complete", Duration::from_secs(60), 5);
    let result = poll_until(&req, |_, _, _, _| async { Ok("Complete".to_string()) })
        .await
        .unwrap();
    assert_eq!(
        result,
        PollResult {
            succeeded: true,
            last_observed: "Complete".to_string(),
            attempts_used: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn never_matching_sleeps_between_every_attempt() {
    let req = request("Complete", Duration::from_secs(60), 5);
    let start = Instant::now();
    let result = poll_until(&req, |_, _, _, _| async { Ok("Pending".to_string()) })
        .await
        .unwrap();
    assert!(!result.succeeded);
    assert_eq!(result.attempts_used, 5);
    assert_eq!(result.last_observed, "Pending");
    // one sleep between attempts, none after the last
    assert_eq!(start.elapsed(), Duration::from_secs(4 * 60));
}

#[tokio::test(start_paused = true)]
async fn substring_policy_matches_larger_phase() {
    let req = request("Complete", Duration::from_secs(1), 3);
    let result = poll_until(&req, |_, _, _, _| async { Ok("CompleteError".to_string()) })
        .await
        .unwrap();
    assert!(result.succeeded);
    assert_eq!(result.last_observed, "CompleteError");
}

#[tokio::test(start_paused = true)]
async fn exact_policy_rejects_larger_phase() {
    let req = request("Complete", Duration::from_secs(1), 2).with_policy(MatchPolicy::Exact);
    let result = poll_until(&req, |_, _, _, _| async { Ok("CompleteError".to_string()) })
        .await
        .unwrap();
    assert!(!result.succeeded);
    assert_eq!(result.attempts_used, 2);
}

#[tokio::test(start_paused = true)]
async fn matches_on_fifth_attempt_after_pending() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let req = request("Complete", Duration::from_secs(60), 5);
    let result = poll_until(&req, move |_, _, _, _| {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 4 {
                Ok("Pending".to_string())
            } else {
                Ok("Complete".to_string())
            }
        }
    })
    .await
    .unwrap();
    assert!(result.succeeded);
    assert_eq!(result.attempts_used, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn empty_status_never_matches() {
    let req = request("Complete", Duration::from_secs(1), 3);
    let result = poll_until(&req, |_, _, _, _| async { Ok(String::new()) })
        .await
        .unwrap();
    assert!(!result.succeeded);
    assert_eq!(result.attempts_used, 3);
    assert_eq!(result.last_observed, "");
}

#[tokio::test(start_paused = true)]
async fn polling_only_reads_the_fetch() {
    // an idempotent fetch is called once per attempt and nothing else
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let req = request("Bound", Duration::from_secs(1), 4);
    let result = poll_until(&req, move |_, _, _, _| {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok("Pending".to_string())
        }
    })
    .await
    .unwrap();
    assert_eq!(result.attempts_used, 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn fetch_error_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let req = request("Complete", Duration::from_secs(60), 10);
    let result = poll_until(&req, move |kind, name, namespace, _| {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::NotFound {
                kind,
                name,
                namespace,
            })
        }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_receives_the_request_identity() {
    let req = request("Complete", Duration::from_secs(1), 1);
    let result = poll_until(&req, |kind, name, namespace, selector| async move {
        assert_eq!(kind, ResourceKind::Build);
        assert_eq!(name, "openshift-jee-sample-1");
        assert_eq!(namespace, "jenkins-test");
        assert_eq!(selector, "{.status.phase}");
        Ok("Complete".to_string())
    })
    .await
    .unwrap();
    assert!(result.succeeded);
}
