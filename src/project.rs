//! Project (namespace) bootstrap through `oc new-project` / `oc project`.

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::cluster::CommandRunner;

pub struct Project {
    name: String,
    runner: CommandRunner,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runner: CommandRunner::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn is_present(&self) -> bool {
        match self.runner.run("oc", &["get", "ns", &self.name]).await {
            Ok(output) => output.success(),
            Err(_) => false,
        }
    }

    /// Creates the project, or switches to it when it already exists.
    pub async fn create(&self) -> Result<bool> {
        let output = self.runner.run("oc", &["new-project", &self.name]).await?;
        if creation_succeeded(&self.name, &output.text) {
            info!(project = %self.name, "project created");
            return Ok(true);
        }
        if already_exists(&self.name, &output.text) {
            return self.switch_to().await;
        }
        warn!(project = %self.name, output = %output.text.trim(), "unexpected new-project output");
        Ok(false)
    }

    pub async fn switch_to(&self) -> Result<bool> {
        let output = self.runner.run("oc", &["project", &self.name]).await?;
        Ok(switched(&self.name, &output.text))
    }
}

fn creation_succeeded(name: &str, output: &str) -> bool {
    let using = Regex::new(&format!(
        r#"Now using project "{}"\son\sserver"#,
        regex::escape(name)
    ))
    .ok();
    let already_on = Regex::new(&format!(
        r#"Already\son\sproject\s"{}"\son\sserver"#,
        regex::escape(name)
    ))
    .ok();
    using.is_some_and(|re| re.is_match(output))
        || already_on.is_some_and(|re| re.is_match(output))
}

fn already_exists(name: &str, output: &str) -> bool {
    Regex::new(&format!(
        r#"project\.project\.openshift\.io\s"{}"\salready exists"#,
        regex::escape(name)
    ))
    .is_ok_and(|re| re.is_match(output))
}

fn switched(name: &str, output: &str) -> bool {
    creation_succeeded(name, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_fresh_creation() {
        let output = r#"Now using project "jenkins-test" on server "https://api.crc.testing:6443"."#;
        assert!(creation_succeeded("jenkins-test", output));
    }

    #[test]
    fn recognizes_already_on_project() {
        let output = r#"Already on project "jenkins-test" on server "https://api.crc.testing:6443"."#;
        assert!(creation_succeeded("jenkins-test", output));
    }

    #[test]
    fn recognizes_existing_project() {
        let output =
            r#"Error from server (AlreadyExists): project.project.openshift.io "jenkins-test" already exists"#;
        assert!(already_exists("jenkins-test", output));
        assert!(!creation_succeeded("jenkins-test", output));
    }

    #[test]
    fn does_not_match_other_project_names() {
        let output = r#"Now using project "other" on server "https://api.crc.testing:6443"."#;
        assert!(!creation_succeeded("jenkins-test", output));
    }
}
