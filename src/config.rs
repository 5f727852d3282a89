//! Environment-driven harness configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PROJECT: &str = "jenkins-test";
const DEFAULT_BASE_PLUGINS: &str = "2/contrib/openshift/base-plugins.txt";
const DEFAULT_MAVEN_TEMPLATE: &str = "smoke/samples/maven_pipeline.yaml";
const DEFAULT_NODEJS_TEMPLATE: &str = "smoke/samples/nodejs_pipeline.yaml";

#[derive(Debug, Clone)]
pub struct Config {
    /// Forwarded to every `oc` invocation. Absent means oc's own default.
    pub kubeconfig: Option<String>,
    /// Where the JSON suite report lands; no report when unset.
    pub output_dir: Option<PathBuf>,
    pub project_name: String,
    pub base_plugins_path: PathBuf,
    pub maven_template: PathBuf,
    pub nodejs_template: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let project_name =
            std::env::var("TEST_NAMESPACE").unwrap_or_else(|_| DEFAULT_PROJECT.to_string());
        Self {
            kubeconfig: std::env::var("KUBECONFIG").ok(),
            output_dir: std::env::var("OUTPUT_DIR").ok().map(PathBuf::from),
            project_name,
            base_plugins_path: env_path("BASE_PLUGINS_FILE", DEFAULT_BASE_PLUGINS),
            maven_template: env_path("MAVEN_TEMPLATE", DEFAULT_MAVEN_TEMPLATE),
            nodejs_template: env_path("NODEJS_TEMPLATE", DEFAULT_NODEJS_TEMPLATE),
        }
    }

    /// Resolves `Project [{VAR}] is used` indirection: the project name is
    /// the value of the named environment variable, which must be set.
    pub fn resolve_project_env(var: &str) -> Result<String> {
        std::env::var(var).with_context(|| format!("{} environment variable needs to be set", var))
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_env_is_an_error() {
        let err = Config::resolve_project_env("JENKINS_SMOKE_NO_SUCH_VAR").unwrap_err();
        assert!(err.to_string().contains("JENKINS_SMOKE_NO_SUCH_VAR"));
    }
}
