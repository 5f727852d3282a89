use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::builds::ensure_all_reach_phase;
use crate::cluster::ResourceKind;
use crate::http::assert_route_reachable;
use crate::scenario::ScenarioContext;
use crate::steps::resource_steps::{self, wait_for_status};

/// `Trigger the build using oc start-build <buildconfig>`.
pub async fn trigger_build(ctx: &mut ScenarioContext, buildconfig: &str) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let output = ctx.oc.start_build(buildconfig, &namespace).await?;
    info!(buildconfig, output = %output, "build triggered");
    Ok(())
}

/// `We Trigger multiple builds using oc start-build <buildconfig>`: start
/// `count` builds and track `<buildconfig>-1..=count` for reconciliation.
pub async fn trigger_builds(
    ctx: &mut ScenarioContext,
    buildconfig: &str,
    count: u32,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    for n in 1..=count {
        ctx.oc.start_build(buildconfig, &namespace).await?;
        ctx.builds.track(format!("{}-{}", buildconfig, n));
    }
    info!(buildconfig, count, "builds triggered and tracked");
    Ok(())
}

/// `We delete some builds`: record current phases, delete the named builds
/// and stop tracking them.
pub async fn delete_builds(ctx: &mut ScenarioContext, names: &[&str]) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();

    for build in ctx.builds.names() {
        let phase = ctx
            .oc
            .get_resource_info_by_jsonpath(
                ResourceKind::Build,
                &build,
                &namespace,
                "{.status.phase}",
            )
            .await?;
        ctx.builds.record_phase(&build, phase);
    }
    info!(builds = %ctx.builds.snapshot(), "build phases before deletion");

    for name in names {
        let deleted = ctx
            .oc
            .delete(ResourceKind::Build, name, &namespace)
            .await?
            .with_context(|| format!("failed to delete build {}", name))?;
        info!(build = name, output = %deleted, "build deleted");
        ctx.builds.untrack(name);
    }
    info!(builds = %ctx.builds.snapshot(), "tracked builds after deletion");
    Ok(())
}

/// `verify sync plugin is able to reconcile the build state ...`: every
/// remaining tracked build converges to Complete.
pub async fn ensure_builds_reconciled(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let oc = ctx.oc.clone();
    let rounds = ensure_all_reach_phase(
        &mut ctx.builds,
        "Complete",
        40,
        Duration::from_secs(10),
        |build| {
            let oc = oc.clone();
            let namespace = namespace.clone();
            async move {
                oc.get_resource_info_by_jsonpath(
                    ResourceKind::Build,
                    &build,
                    &namespace,
                    "{.status.phase}",
                )
                .await
            }
        },
    )
    .await?;
    info!(rounds, "all tracked builds reconciled to Complete");
    Ok(())
}

/// `verify the build status of <build> build is Complete`.
pub async fn verify_build_complete(
    ctx: &mut ScenarioContext,
    build: &str,
    interval_secs: u64,
    max_retries: u32,
) -> Result<()> {
    wait_for_status(
        ctx,
        ResourceKind::Build,
        build,
        "{.status.phase}",
        "Complete",
        interval_secs,
        max_retries,
    )
    .await
}

/// `route <app> must be created and be accessible`: resolve the route host
/// and GET it until 200.
pub async fn route_accessible(ctx: &mut ScenarioContext, app: &str) -> Result<()> {
    resource_steps::route_admitted(ctx, app).await?;
    let namespace = ctx.current_project()?.to_string();
    let host = ctx
        .oc
        .get_route_host(app, &namespace)
        .await?
        .with_context(|| format!("route {} has no host in {}", app, namespace))?;
    let url = format!("http://{}", host);
    info!(app, url = %url, "pinging application route");
    assert_route_reachable(&url, app, &namespace, Duration::from_secs(2), 30).await
}

/// `We rsh into the master pod and check the jobs count`: snapshot each
/// job's nextBuildNumber from the master pod's filesystem.
pub async fn snapshot_job_counts(ctx: &mut ScenarioContext, jobs: &[&str]) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let pod = ctx.master_pod().await?;
    for job in jobs {
        let command = format!(
            "cat /var/lib/jenkins/jobs/{ns}/jobs/{ns}-{job}/nextBuildNumber",
            ns = namespace,
            job = job
        );
        let count = ctx.oc.exec_in_pod(&pod, &namespace, &command).await?;
        info!(job, count = %count, "job next build number");
        ctx.job_counts.insert(job.to_string(), count);
    }
    Ok(())
}

/// `We rsh into the master pod & Compare if the data persist or is lost upon
/// pod restart`: a nextBuildNumber back at 1 means the job history is gone.
pub async fn verify_job_counts_persisted(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let jobs: Vec<String> = ctx.job_counts.keys().cloned().collect();
    if jobs.is_empty() {
        bail!("no job counts were snapshotted before the restart");
    }
    let pod = ctx.master_pod().await?;
    for job in jobs {
        let command = format!(
            "cat /var/lib/jenkins/jobs/{ns}/jobs/{ns}-{job}/nextBuildNumber",
            ns = namespace,
            job = job
        );
        let count = ctx.oc.exec_in_pod(&pod, &namespace, &command).await?;
        info!(job = %job, count = %count, "job next build number after restart");
        if count == "1" {
            bail!("job {} lost its history across the pod restart", job);
        }
        ctx.job_counts.insert(job, count);
    }
    Ok(())
}

/// `We delete the jenkins master pod`.
pub async fn delete_master_pod(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let pod = ctx.master_pod().await?;
    let deleted = ctx
        .oc
        .delete(ResourceKind::Pod, &pod, &namespace)
        .await?
        .with_context(|| format!("failed to delete master pod {}", pod))?;
    info!(pod = %pod, output = %deleted, "master pod deleted");
    ctx.invalidate_master_pod();
    tokio::time::sleep(Duration::from_secs(2)).await;
    Ok(())
}
