use anyhow::{bail, Result};
use tracing::info;

use crate::cluster::ResourceKind;
use crate::scenario::ScenarioContext;

/// `We ensure that <dc> deployment config status mets criteria <condition>`.
pub async fn wait_for_dc_condition(
    ctx: &mut ScenarioContext,
    dc_name: &str,
    condition: &str,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let output = ctx
        .oc
        .check_for_deployment_config_status(dc_name, &namespace, condition)
        .await?;
    if !output.success() {
        bail!(
            "deployment config {} did not meet {}: {}",
            dc_name,
            condition,
            output.text.trim()
        );
    }
    info!(dc = dc_name, condition, output = %output.text.trim(), "deployment config condition met");
    Ok(())
}

/// `We ensure that <dc> deployment config is ready`.
pub async fn dc_ready(ctx: &mut ScenarioContext, dc_name: &str) -> Result<()> {
    wait_for_dc_condition(ctx, dc_name, "condition=Available").await
}

/// `We scale down the pod count in the replication controller to "0" from "1"`.
pub async fn scale_jenkins_down(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    ctx.oc.scale_replicas(&namespace, 0, "jenkins-1").await?;
    let replicas = ctx
        .oc
        .get_resource_info_by_jsonpath(
            ResourceKind::DeploymentConfig,
            "jenkins",
            &namespace,
            "{.status.availableReplicas}",
        )
        .await?;
    if !replicas.contains('0') {
        bail!("jenkins still reports {} available replicas", replicas);
    }
    info!(replicas = %replicas, "jenkins scaled down");
    Ok(())
}
