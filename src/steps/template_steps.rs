use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cluster::ResourceKind;
use crate::scenario::ScenarioContext;

/// `User enters oc new-app jenkins-ephemeral command`.
pub async fn new_app_ephemeral(ctx: &mut ScenarioContext) -> Result<()> {
    apply_template(ctx, "jenkins-ephemeral").await
}

/// `User enters oc new-app jenkins-persistent command`.
pub async fn new_app_persistent(ctx: &mut ScenarioContext) -> Result<()> {
    apply_template(ctx, "jenkins-persistent").await
}

/// `User enters oc new-app jenkins-ephemeral command using env vars`: the
/// env vars recorded by a prior "environment variables ... are set" step are
/// passed as `-e` arguments.
pub async fn new_app_ephemeral_with_env(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let env = ctx.given_env_vars.clone();
    info!(template = "jenkins-ephemeral", ?env, "applying template with env vars");
    ctx.oc
        .new_app_with_env("jenkins-ephemeral", &env, &namespace)
        .await?;
    Ok(())
}

async fn apply_template(ctx: &mut ScenarioContext, template: &str) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    info!(template, namespace = %namespace, "applying template");
    ctx.oc.new_app(template, &namespace).await?;
    Ok(())
}

/// `The user enters new-app command with nodejs_template`: create the sample
/// pipeline from its template file and verify a buildconfig appeared.
pub async fn new_app_pipeline_from_file(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let path = ctx.config.nodejs_template.display().to_string();
    ctx.oc.new_app_from_file(&path, &namespace).await?;

    // Give the template objects a moment to land before checking.
    tokio::time::sleep(Duration::from_secs(30)).await;

    for candidate in ["sample-pipeline", "nodejs-postgresql-example"] {
        if ctx
            .oc
            .search_resource_in_namespace(ResourceKind::BuildConfig, candidate, &namespace)
            .await?
            .is_some()
        {
            info!(buildconfig = candidate, "buildconfig created");
            return Ok(());
        }
    }
    bail!("no buildconfig appeared after applying {}", path);
}

/// `The user create objects from the sample maven template by processing the
/// template and piping the output to oc create`.
pub async fn process_maven_template(ctx: &mut ScenarioContext) -> Result<()> {
    let namespace = ctx.current_project()?.to_string();
    let path = ctx.config.maven_template.display().to_string();
    let output = ctx.oc.process_template_to_create(&path, &namespace).await?;
    info!(template = %path, output = %output.trim(), "template processed and created");
    Ok(())
}
