use anyhow::{ensure, Result};
use tracing::info;

use crate::config::Config;
use crate::project::Project;
use crate::scenario::ScenarioContext;

/// `Project "{name}" is used`: create the project when absent, then make it
/// the scenario's current project.
pub async fn use_project(ctx: &mut ScenarioContext, name: &str) -> Result<()> {
    let project = Project::new(name);
    if !project.is_present().await {
        info!(project = name, "project not present, creating");
        ensure!(project.create().await?, "project {} was not created", name);
    }
    info!(project = name, "using project");
    ctx.current_project = Some(name.to_string());
    Ok(())
}

/// `Project "{name}" is used` with the name taken from the harness config,
/// so TEST_NAMESPACE overrides the default.
pub async fn use_configured_project(ctx: &mut ScenarioContext) -> Result<()> {
    let name = ctx.config.project_name.clone();
    use_project(ctx, &name).await
}

/// `Project [{var}] is used`: the project name comes from an environment
/// variable, which must be set.
pub async fn use_project_from_env(ctx: &mut ScenarioContext, var: &str) -> Result<()> {
    let name = Config::resolve_project_env(var)?;
    use_project(ctx, &name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_project_env_var_is_an_error() {
        let mut ctx = ScenarioContext::new(Config::from_env());
        let err = use_project_from_env(&mut ctx, "JENKINS_SMOKE_UNSET_VAR")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JENKINS_SMOKE_UNSET_VAR"));
    }
}
