//! Poll-until-condition primitive.
//!
//! Every "wait for X to become Y" assertion in the harness goes through
//! [`poll_until`]: fetch the current status of a named resource, compare it
//! against the expected value, and either return or sleep and try again.
//! Call sites supply configuration (interval, retries, expected value) and a
//! fetch capability; they never re-implement the loop.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use anyhow::{ensure, Result};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cluster::{FetchError, ResourceKind};

/// How an observed status is compared against the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Substring containment, the historical behavior: expecting "Complete"
    /// also accepts "Completed" or "Complete ". Deliberate, prefix
    /// collisions included.
    #[default]
    Contains,
    /// Strict equality, for call sites that cannot tolerate the loose match.
    Exact,
}

impl MatchPolicy {
    pub fn matches(&self, observed: &str, expected: &str) -> bool {
        match self {
            MatchPolicy::Contains => observed.contains(expected),
            MatchPolicy::Exact => observed == expected,
        }
    }
}

/// One status-polling assertion: which field of which resource to watch,
/// what value to wait for, and how long to keep trying.
#[derive(Debug, Clone)]
pub struct PollRequest {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub selector: String,
    pub expected: String,
    pub interval: Duration,
    pub max_retries: u32,
    pub policy: MatchPolicy,
    /// Optional hard deadline. When unset the only bound is
    /// `max_retries * interval`, matching the historical behavior.
    pub deadline: Option<Instant>,
}

impl PollRequest {
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        selector: impl Into<String>,
        expected: impl Into<String>,
        interval: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        ensure!(interval > Duration::ZERO, "poll interval must be positive");
        ensure!(max_retries >= 1, "max_retries must be at least 1");
        Ok(Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            selector: selector.into(),
            expected: expected.into(),
            interval,
            max_retries,
            policy: MatchPolicy::Contains,
            deadline: None,
        })
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Terminal outcome of one [`poll_until`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub succeeded: bool,
    pub last_observed: String,
    pub attempts_used: u32,
}

/// A source of status strings for named resources. `Oc` is the production
/// implementation; tests provide scripted ones.
#[async_trait]
pub trait StatusSource {
    async fn fetch_field(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        selector: &str,
    ) -> Result<String, FetchError>;
}

/// Polls `fetch` until the observed value matches, retries run out, or the
/// deadline passes.
///
/// A [`FetchError`] propagates immediately; it is not a retry. Call sites
/// that expect the resource to be absent for the first few attempts use
/// [`poll_until_tolerant`] instead.
pub async fn poll_until<F, Fut>(request: &PollRequest, mut fetch: F) -> Result<PollResult, FetchError>
where
    F: FnMut(ResourceKind, String, String, String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut attempt = 1u32;
    loop {
        let observed = fetch(
            request.kind,
            request.name.clone(),
            request.namespace.clone(),
            request.selector.clone(),
        )
        .await?;

        if request.policy.matches(&observed, &request.expected) {
            info!(
                kind = %request.kind,
                name = %request.name,
                namespace = %request.namespace,
                observed = %observed,
                attempt,
                "status matched"
            );
            return Ok(PollResult {
                succeeded: true,
                last_observed: observed,
                attempts_used: attempt,
            });
        }

        if attempt == request.max_retries {
            warn!(
                kind = %request.kind,
                name = %request.name,
                namespace = %request.namespace,
                observed = %observed,
                expected = %request.expected,
                attempts = attempt,
                "retries exhausted"
            );
            return Ok(PollResult {
                succeeded: false,
                last_observed: observed,
                attempts_used: attempt,
            });
        }

        if let Some(deadline) = request.deadline {
            if Instant::now() + request.interval > deadline {
                warn!(
                    kind = %request.kind,
                    name = %request.name,
                    observed = %observed,
                    attempts = attempt,
                    "deadline reached before next attempt"
                );
                return Ok(PollResult {
                    succeeded: false,
                    last_observed: observed,
                    attempts_used: attempt,
                });
            }
        }

        debug!(
            kind = %request.kind,
            name = %request.name,
            observed = %observed,
            expected = %request.expected,
            attempt,
            "status not matched yet, sleeping"
        );
        tokio::time::sleep(request.interval).await;
        attempt += 1;
    }
}

/// [`poll_until`] with fetch errors treated as "not there yet".
///
/// The wrapped fetch maps every error to an empty string, which the
/// containment check never matches, so polling continues until the retry
/// budget runs out.
pub async fn poll_until_tolerant<F, Fut>(request: &PollRequest, mut fetch: F) -> PollResult
where
    F: FnMut(ResourceKind, String, String, String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let result = poll_until(request, |kind, name, namespace, selector| {
        let fut = fetch(kind, name, namespace, selector);
        async move { Ok(fut.await.unwrap_or_default()) }
    })
    .await;
    match result {
        Ok(result) => result,
        // The wrapped fetch never errors.
        Err(_) => PollResult {
            succeeded: false,
            last_observed: String::new(),
            attempts_used: 0,
        },
    }
}

/// Convenience for polling through a [`StatusSource`].
pub async fn poll_source<S>(request: &PollRequest, source: &S) -> Result<PollResult, FetchError>
where
    S: StatusSource + Sync + ?Sized,
{
    poll_until(request, |kind, name, namespace, selector| async move {
        source
            .fetch_field(kind, &name, &namespace, &selector)
            .await
    })
    .await
}

/// Tolerant variant of [`poll_source`].
pub async fn poll_source_tolerant<S>(request: &PollRequest, source: &S) -> PollResult
where
    S: StatusSource + Sync + ?Sized,
{
    poll_until_tolerant(request, |kind, name, namespace, selector| async move {
        source
            .fetch_field(kind, &name, &namespace, &selector)
            .await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(expected: &str, max_retries: u32) -> PollRequest {
        PollRequest::new(
            ResourceKind::Build,
            "sample-1",
            "jenkins-test",
            "{.status.phase}",
            expected,
            Duration::from_millis(10),
            max_retries,
        )
        .unwrap()
    }

    #[test]
    fn rejects_zero_interval() {
        let result = PollRequest::new(
            ResourceKind::Pod,
            "p",
            "ns",
            "{.status.phase}",
            "Running",
            Duration::ZERO,
            3,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_retries() {
        let result = PollRequest::new(
            ResourceKind::Pod,
            "p",
            "ns",
            "{.status.phase}",
            "Running",
            Duration::from_secs(1),
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn contains_policy_is_loose() {
        assert!(MatchPolicy::Contains.matches("CompleteError", "Complete"));
        assert!(MatchPolicy::Contains.matches("Completed", "Complete"));
        assert!(!MatchPolicy::Exact.matches("Completed", "Complete"));
        assert!(MatchPolicy::Exact.matches("Complete", "Complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_propagates_immediately() {
        let req = request("Complete", 5);
        let result = poll_until(&req, |kind, name, namespace, _| async move {
            Err(FetchError::NotFound {
                kind,
                name,
                namespace,
            })
        })
        .await;
        assert!(matches!(result, Err(FetchError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn tolerant_fetch_keeps_polling_through_errors() {
        let req = request("Complete", 3);
        let result = poll_until_tolerant(&req, |kind, name, namespace, _| async move {
            Err(FetchError::NotFound {
                kind,
                name,
                namespace,
            })
        })
        .await;
        assert!(!result.succeeded);
        assert_eq!(result.attempts_used, 3);
        assert_eq!(result.last_observed, "");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_polling_short() {
        let req = request("Complete", 1000).with_deadline(Instant::now() + Duration::from_millis(35));
        let result = poll_until(&req, |_, _, _, _| async { Ok("Pending".to_string()) })
            .await
            .unwrap();
        assert!(!result.succeeded);
        // attempts at t=0, 10, 20, 30; the sleep to 40 would cross the deadline
        assert_eq!(result.attempts_used, 4);
    }
}
