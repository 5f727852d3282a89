use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cluster::ResourceKind;
use crate::poller::{poll_source_tolerant, PollRequest};
use crate::scenario::ScenarioContext;

/// `<kind> "<name>" created`: the resource must already exist.
pub async fn resource_created(
    ctx: &mut ScenarioContext,
    kind: ResourceKind,
    name: &str,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    match ctx
        .oc
        .search_resource_in_namespace(kind, name, &namespace)
        .await?
    {
        Some(id) => {
            info!(%kind, name, namespace = %namespace, id = %id, "resource created");
            Ok(())
        }
        None => bail!("{} {} not found in namespace {}", kind, name, namespace),
    }
}

/// Polls a status field until it matches, with fetch errors treated as
/// "not there yet". The single poller call site behind every status wait.
pub async fn wait_for_status(
    ctx: &ScenarioContext,
    kind: ResourceKind,
    name: &str,
    selector: &str,
    expected: &str,
    interval_secs: u64,
    max_retries: u32,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let request = PollRequest::new(
        kind,
        name,
        namespace.clone(),
        selector,
        expected,
        Duration::from_secs(interval_secs),
        max_retries,
    )?;
    let result = poll_source_tolerant(&request, &ctx.oc).await;
    if !result.succeeded {
        bail!(
            "{} {} in {} did not reach {:?}; last observed {:?} after {} attempts",
            kind,
            name,
            namespace,
            expected,
            result.last_observed,
            result.attempts_used
        );
    }
    Ok(())
}

/// `We check for deployment pod status to be "Completed"`: the deployer pod
/// runs to Succeeded.
pub async fn deploy_pod_succeeded(ctx: &mut ScenarioContext) -> Result<()> {
    wait_for_status(
        ctx,
        ResourceKind::Pod,
        "jenkins-1-deploy",
        "{.status.phase}",
        "Succeeded",
        2,
        60,
    )
    .await
}

/// `We check for jenkins master pod status to be "Ready"`: every container
/// in the master pod reports ready.
pub async fn master_pod_ready(ctx: &mut ScenarioContext) -> Result<()> {
    let pod = ctx.master_pod().await?;
    let namespace = ctx.current_project()?.to_string();
    let request = PollRequest::new(
        ResourceKind::Pod,
        pod.clone(),
        namespace.clone(),
        "{.status.containerStatuses[*].ready}",
        "true",
        Duration::from_secs(5),
        60,
    )?;
    let result = poll_source_tolerant(&request, &ctx.oc).await;
    // "true false" still contains "true"; a not-ready container fails here.
    if !result.succeeded || result.last_observed.contains("false") {
        bail!(
            "jenkins master pod {} in {} not ready; container readiness: {:?}",
            pod,
            namespace,
            result.last_observed
        );
    }
    info!(pod = %pod, "jenkins master pod is ready");
    Ok(())
}

/// Route ingress admitted by the router.
pub async fn route_admitted(ctx: &mut ScenarioContext, route: &str) -> Result<()> {
    wait_for_status(
        ctx,
        ResourceKind::Route,
        route,
        "{.status.ingress[*].conditions[*].status}",
        "True",
        2,
        10,
    )
    .await
}
