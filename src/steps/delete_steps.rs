use anyhow::{Context, Result};
use tracing::info;

use crate::cluster::ResourceKind;
use crate::scenario::ScenarioContext;

/// Kind list swept by the full cleanup, mirroring the template labels.
const CLEANUP_KINDS: &str = "all,rolebindings.authorization.openshift.io,bc,cm,is,pvc,sa,secret";

const CLEANUP_LABELS: &[&str] = &[
    "app=jenkins-ephemeral",
    "app=jenkins-persistent",
    "app=openshift-jee-sample",
    "app=jenkins-pipeline-example",
];

/// `we delete <kind> "<name>"`.
pub async fn delete_resource(
    ctx: &mut ScenarioContext,
    kind: ResourceKind,
    name: &str,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let output = ctx
        .oc
        .delete(kind, name, &namespace)
        .await?
        .with_context(|| format!("failed to delete {} {} in {}", kind, name, namespace))?;
    info!(%kind, name, output = %output, "resource deleted");
    Ok(())
}

/// `delete all <kind>`.
pub async fn delete_all(ctx: &mut ScenarioContext, kind: ResourceKind) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    ctx.oc
        .delete(kind, "--all", &namespace)
        .await?
        .with_context(|| format!("failed to delete all {} in {}", kind, namespace))?;
    Ok(())
}

/// `delete all remaining test resources`: label-selector sweeps over every
/// kind the templates create. Individual sweeps may legitimately find
/// nothing; failure here is not fatal.
pub async fn cleanup_test_resources(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    for label in CLEANUP_LABELS {
        let target = format!("-l {}", label);
        let output = ctx.oc.delete_raw(CLEANUP_KINDS, &target, &namespace).await?;
        info!(label, output = ?output, "cleanup sweep");
    }
    Ok(())
}
