use async_trait::async_trait;
use tracing::{debug, info};

use super::{CommandOutput, CommandRunner, FetchError, ResourceKind};
use crate::poller::StatusSource;

/// Thin wrapper over the `oc` CLI.
///
/// Failure surfaces the way the callers expect it: lookup helpers return
/// `None` or an empty string, status queries return a [`FetchError`], and
/// mutation helpers return the captured output for logging.
#[derive(Debug, Clone)]
pub struct Oc {
    runner: CommandRunner,
}

impl Oc {
    pub fn new() -> Self {
        Self {
            runner: CommandRunner::new(),
        }
    }

    pub fn with_runner(runner: CommandRunner) -> Self {
        Self { runner }
    }

    async fn oc(&self, args: &[&str]) -> Result<CommandOutput, FetchError> {
        self.runner.run("oc", args).await
    }

    /// Returns the resource id (`route.route.openshift.io/jenkins` style) if
    /// the named resource exists in the namespace, `None` otherwise.
    pub async fn search_resource_in_namespace(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<String>, FetchError> {
        let output = self
            .oc(&["get", kind.as_str(), name, "-n", namespace, "-o", "name"])
            .await?;
        if output.success() && output.text.contains(name) {
            Ok(Some(output.text.trim().to_string()))
        } else {
            Ok(None)
        }
    }

    /// Fetches a single status field through a jsonpath selector.
    ///
    /// An absent resource or a failed query is a [`FetchError`], never an
    /// empty success: distinguishing "not there yet" from "query broken" is
    /// the caller's decision, made by wrapping with a tolerant fetch.
    pub async fn get_resource_info_by_jsonpath(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        selector: &str,
    ) -> Result<String, FetchError> {
        let jsonpath = format!("-o=jsonpath={}", selector);
        let output = self
            .oc(&["get", kind.as_str(), name, "-n", namespace, &jsonpath])
            .await?;
        if output.success() {
            Ok(output.text.trim().to_string())
        } else if output.text.contains("NotFound") || output.text.contains("not found") {
            Err(FetchError::NotFound {
                kind,
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc get {} {} -n {}", kind, name, namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    /// Deletes `target` (a name, `--all`, or a `-l` selector split by the
    /// caller into `target`). Returns the command output, `None` on failure.
    pub async fn delete(
        &self,
        kind: ResourceKind,
        target: &str,
        namespace: &str,
    ) -> Result<Option<String>, FetchError> {
        self.delete_raw(kind.as_str(), target, namespace).await
    }

    /// Untyped variant for compound kind lists (`all,bc,cm,...`) used by the
    /// cleanup sweep. Prefer [`delete`](Self::delete) everywhere else.
    pub async fn delete_raw(
        &self,
        kinds: &str,
        target: &str,
        namespace: &str,
    ) -> Result<Option<String>, FetchError> {
        let mut args = vec!["delete", kinds];
        args.extend(target.split_whitespace());
        args.extend(["-n", namespace]);
        let output = self.oc(&args).await?;
        if output.success() {
            Ok(Some(output.text.trim().to_string()))
        } else {
            Ok(None)
        }
    }

    pub async fn start_build(
        &self,
        buildconfig: &str,
        namespace: &str,
    ) -> Result<String, FetchError> {
        let output = self
            .oc(&["start-build", buildconfig, "-n", namespace])
            .await?;
        if output.success() {
            info!(buildconfig, namespace, output = %output.text.trim(), "build started");
            Ok(output.text.trim().to_string())
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc start-build {} -n {}", buildconfig, namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    pub async fn new_app(&self, template: &str, namespace: &str) -> Result<String, FetchError> {
        self.new_app_with_env(template, &[], namespace).await
    }

    /// `oc new-app <template> -e K=V ... -n <namespace>`.
    pub async fn new_app_with_env(
        &self,
        template: &str,
        env: &[(String, String)],
        namespace: &str,
    ) -> Result<String, FetchError> {
        let pairs: Vec<String> = env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let mut args = vec!["new-app", template];
        for pair in &pairs {
            args.push("-e");
            args.push(pair.as_str());
        }
        args.extend(["-n", namespace]);
        let output = self.oc(&args).await?;
        if output.success() {
            Ok(output.text)
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc new-app {} -n {}", template, namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    pub async fn new_app_from_file(
        &self,
        path: &str,
        namespace: &str,
    ) -> Result<String, FetchError> {
        let output = self.oc(&["new-app", "-f", path, "-n", namespace]).await?;
        if output.success() {
            Ok(output.text)
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc new-app -f {} -n {}", path, namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    /// `oc process -f <path> | oc create -f - -n <namespace>`.
    pub async fn process_template_to_create(
        &self,
        path: &str,
        namespace: &str,
    ) -> Result<String, FetchError> {
        let processed = self.oc(&["process", "-f", path, "-n", namespace]).await?;
        if !processed.success() {
            return Err(FetchError::CommandFailed {
                command: format!("oc process -f {}", path),
                code: processed.code,
                output: processed.text.trim().to_string(),
            });
        }
        let created = self
            .runner
            .run_with_stdin("oc", &["create", "-f", "-", "-n", namespace], &processed.text)
            .await?;
        if created.success() {
            Ok(created.text)
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc create -f - -n {}", namespace),
                code: created.code,
                output: created.text.trim().to_string(),
            })
        }
    }

    pub async fn exec_in_pod(
        &self,
        pod: &str,
        namespace: &str,
        command: &str,
    ) -> Result<String, FetchError> {
        let output = self
            .oc(&["exec", pod, "-n", namespace, "--", "sh", "-c", command])
            .await?;
        if output.success() {
            Ok(output.text.trim().to_string())
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc exec {} -- {}", pod, command),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    pub async fn scale_replicas(
        &self,
        namespace: &str,
        replicas: u32,
        rc_name: &str,
    ) -> Result<(), FetchError> {
        let count = format!("--replicas={}", replicas);
        let output = self
            .oc(&["scale", "rc", rc_name, &count, "-n", namespace])
            .await?;
        if output.success() {
            info!(rc_name, namespace, replicas, "scaled replication controller");
            Ok(())
        } else {
            Err(FetchError::CommandFailed {
                command: format!("oc scale rc {} -n {}", rc_name, namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            })
        }
    }

    pub async fn get_route_host(
        &self,
        route: &str,
        namespace: &str,
    ) -> Result<Option<String>, FetchError> {
        match self
            .get_resource_info_by_jsonpath(ResourceKind::Route, route, namespace, "{.spec.host}")
            .await
        {
            Ok(host) if !host.is_empty() => Ok(Some(host)),
            Ok(_) => Ok(None),
            Err(FetchError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Finds the running Jenkins master pod: the `jenkins-` pod that is
    /// neither the deployer nor a build agent.
    pub async fn master_pod(&self, namespace: &str) -> Result<Option<String>, FetchError> {
        let output = self
            .oc(&[
                "get",
                "pods",
                "-n",
                namespace,
                "-o=jsonpath={.items[*].metadata.name}",
            ])
            .await?;
        if !output.success() {
            return Err(FetchError::CommandFailed {
                command: format!("oc get pods -n {}", namespace),
                code: output.code,
                output: output.text.trim().to_string(),
            });
        }
        let master = output
            .text
            .split_whitespace()
            .find(|name| {
                name.starts_with("jenkins")
                    && !name.contains("deploy")
                    && !name.contains("agent")
            })
            .map(|name| name.to_string());
        debug!(namespace, ?master, "resolved jenkins master pod");
        Ok(master)
    }

    pub async fn set_env_for_deployment_config(
        &self,
        dc_name: &str,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<CommandOutput, FetchError> {
        let target = format!("dc/{}", dc_name);
        let pair = format!("{}={}", key, value);
        self.oc(&["set", "env", &target, &pair, "-n", namespace])
            .await
    }

    /// Blocks until the deployment config reports the condition (default
    /// `condition=Available`), bounded by oc's own timeout.
    pub async fn check_for_deployment_config_status(
        &self,
        dc_name: &str,
        namespace: &str,
        wait_for: &str,
    ) -> Result<CommandOutput, FetchError> {
        let target = format!("dc/{}", dc_name);
        let condition = format!("--for={}", wait_for);
        self.oc(&[
            "wait",
            &target,
            &condition,
            "--timeout=300s",
            "-n",
            namespace,
        ])
        .await
    }
}

impl Default for Oc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusSource for Oc {
    async fn fetch_field(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        selector: &str,
    ) -> Result<String, FetchError> {
        self.get_resource_info_by_jsonpath(kind, name, namespace, selector)
            .await
    }
}
