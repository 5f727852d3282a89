//! Per-scenario mutable state.
//!
//! The harness keeps no globals: everything a step needs lives in a
//! `ScenarioContext` created when the scenario starts and dropped when it
//! ends, owned by the suite driver.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::builds::BuildTracker;
use crate::cluster::{CommandRunner, Oc};
use crate::config::Config;

pub struct ScenarioContext {
    pub config: Config,
    pub oc: Oc,
    /// Set by the "Project ... is used" step; most steps require it.
    pub current_project: Option<String>,
    pub builds: BuildTracker,
    /// Cached Jenkins master pod name; invalidated when the pod is deleted.
    master_pod: Option<String>,
    /// Env vars given to the template steps (`-e K=V`).
    pub given_env_vars: Vec<(String, String)>,
    /// nextBuildNumber snapshot per job, for the persistence check.
    pub job_counts: HashMap<String, String>,
}

impl ScenarioContext {
    pub fn new(config: Config) -> Self {
        let mut runner = CommandRunner::new();
        if let Some(kubeconfig) = &config.kubeconfig {
            runner.set_env("KUBECONFIG", kubeconfig);
        }
        let oc = Oc::with_runner(runner);
        Self {
            config,
            oc,
            current_project: None,
            builds: BuildTracker::new(),
            master_pod: None,
            given_env_vars: Vec::new(),
            job_counts: HashMap::new(),
        }
    }

    pub fn current_project(&self) -> Result<&str> {
        self.current_project
            .as_deref()
            .context("no project selected; a 'Project ... is used' step must run first")
    }

    /// Resolves and caches the Jenkins master pod name.
    pub async fn master_pod(&mut self) -> Result<String> {
        if let Some(pod) = &self.master_pod {
            return Ok(pod.clone());
        }
        let namespace = self.current_project()?.to_string();
        let pod = self
            .oc
            .master_pod(&namespace)
            .await?
            .with_context(|| format!("no jenkins master pod found in {}", namespace))?;
        self.master_pod = Some(pod.clone());
        Ok(pod)
    }

    /// Must be called after deleting the master pod so the next lookup sees
    /// the replacement.
    pub fn invalidate_master_pod(&mut self) {
        self.master_pod = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_is_required() {
        let ctx = ScenarioContext::new(Config::from_env());
        assert!(ctx.current_project().is_err());
    }

    #[test]
    fn context_starts_empty() {
        let ctx = ScenarioContext::new(Config::from_env());
        assert!(ctx.builds.is_empty());
        assert!(ctx.given_env_vars.is_empty());
        assert!(ctx.job_counts.is_empty());
    }
}
