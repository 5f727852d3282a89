use anyhow::{bail, Result};
use tracing::info;

use crate::scenario::ScenarioContext;

/// `environment variables {...} are set`: record the pairs for a later
/// template step.
pub async fn given_env_vars(ctx: &mut ScenarioContext, pairs: &[(&str, &str)]) -> Result<()> {
    ctx.given_env_vars = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    info!(env = ?ctx.given_env_vars, "environment variables recorded");
    Ok(())
}

/// `We set env var <key> to value <value> in deploymentconfig <dc>`.
pub async fn set_env_on_dc(
    ctx: &mut ScenarioContext,
    dc_name: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let output = ctx
        .oc
        .set_env_for_deployment_config(dc_name, &namespace, key, value)
        .await?;
    if !output.success() {
        bail!(
            "failed to set {} on dc {}: {}",
            key,
            dc_name,
            output.text.trim()
        );
    }
    Ok(())
}

/// `We check that JENKINS_PASSWORD environement variable is set to <value>`:
/// read the variable inside the master pod and compare exactly.
pub async fn verify_jenkins_password(ctx: &mut ScenarioContext, expected: &str) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let pod = ctx.master_pod().await?;
    let command = "env | grep -w JENKINS_PASSWORD | cut -f2 -d=";
    let value = ctx.oc.exec_in_pod(&pod, &namespace, command).await?;
    let value = value.trim();
    if value != expected {
        bail!(
            "JENKINS_PASSWORD in pod {} is {:?}, expected {:?}",
            pod,
            value,
            expected
        );
    }
    info!(pod = %pod, "JENKINS_PASSWORD set as expected");
    Ok(())
}
