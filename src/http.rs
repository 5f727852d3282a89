//! Route reachability: GET the exposed URL until it answers 200.

use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cluster::{FetchError, ResourceKind};
use crate::poller::{poll_until_tolerant, MatchPolicy, PollRequest, PollResult};

/// Polls `url` until it returns HTTP 200, one GET per attempt.
///
/// Transport errors (DNS not propagated yet, connection refused while the
/// router converges) count as a non-matching attempt, not a failure. 200 is
/// the only success criterion; any other status keeps polling.
pub async fn wait_for_http_ok(
    url: &str,
    route: &str,
    namespace: &str,
    interval: Duration,
    max_retries: u32,
) -> Result<PollResult> {
    let client = reqwest::Client::new();
    let request = PollRequest::new(
        ResourceKind::Route,
        route,
        namespace,
        "{.http.status}",
        "200",
        interval,
        max_retries,
    )?
    .with_policy(MatchPolicy::Exact);

    let result = poll_until_tolerant(&request, |_, _, _, _| {
        let client = client.clone();
        let url = url.to_string();
        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;
            Ok(response.status().as_u16().to_string())
        }
    })
    .await;

    if result.succeeded {
        info!(url, attempts = result.attempts_used, "route is reachable");
    }
    Ok(result)
}

/// Assertion wrapper: reachability failure is a scenario failure.
pub async fn assert_route_reachable(
    url: &str,
    route: &str,
    namespace: &str,
    interval: Duration,
    max_retries: u32,
) -> Result<()> {
    let result = wait_for_http_ok(url, route, namespace, interval, max_retries).await?;
    if !result.succeeded {
        bail!(
            "route {} not reachable at {}: last status {:?} after {} attempts",
            route,
            url,
            result.last_observed,
            result.attempts_used
        );
    }
    Ok(())
}
