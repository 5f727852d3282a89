//! Scenario driver: the fixed phrase → handler table and the sequential
//! runner that records pass/fail per scenario and keeps going.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{error, info};

use crate::cluster::ResourceKind;
use crate::config::Config;
use crate::scenario::ScenarioContext;
use crate::steps::{
    build_steps, delete_steps, deployment_steps, env_steps, plugin_steps, project_steps,
    resource_steps, template_steps, volume_steps,
};

type StepFn =
    Box<dyn for<'a> Fn(&'a mut ScenarioContext) -> BoxFuture<'a, Result<()>> + Send + Sync>;

pub struct StepBinding {
    pub phrase: &'static str,
    run: StepFn,
}

pub struct Scenario {
    pub name: &'static str,
    steps: Vec<StepBinding>,
}

impl Scenario {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    pub fn step<F>(mut self, phrase: &'static str, run: F) -> Self
    where
        F: for<'a> Fn(&'a mut ScenarioContext) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.steps.push(StepBinding {
            phrase,
            run: Box::new(run),
        });
        self
    }

    pub fn phrases(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.phrase).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub failed_step: Option<String>,
    pub error: Option<String>,
    pub duration_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }
}

pub struct Suite {
    config: Config,
    scenarios: Vec<Scenario>,
}

impl Suite {
    pub fn new(config: Config, scenarios: Vec<Scenario>) -> Self {
        Self { config, scenarios }
    }

    /// The canonical smoke suite: one scenario per feature of the original
    /// suite, with one handler per phrase.
    pub fn smoke(config: Config) -> Self {
        let scenarios = vec![
            ephemeral_deployment(),
            persistent_deployment(),
            jee_sample_pipeline(),
            nodejs_sample_pipeline(),
            build_reconciliation(),
            persistence_across_restart(),
            ephemeral_with_env_vars(),
            cleanup(),
        ];
        Self::new(config, scenarios)
    }

    /// Runs every scenario in order on a fresh context; a failing step fails
    /// its scenario and the driver moves on to the next one.
    pub async fn run(self) -> Result<SuiteReport> {
        let started = Utc::now();
        let mut reports = Vec::with_capacity(self.scenarios.len());

        for scenario in &self.scenarios {
            info!(scenario = scenario.name, "scenario starting");
            let mut ctx = ScenarioContext::new(self.config.clone());
            let begun = Instant::now();
            let mut failed_step = None;
            let mut failure = None;

            for binding in &scenario.steps {
                info!(step = binding.phrase, "step");
                if let Err(e) = (binding.run)(&mut ctx).await {
                    error!(
                        scenario = scenario.name,
                        step = binding.phrase,
                        error = %format!("{:#}", e),
                        "step failed"
                    );
                    failed_step = Some(binding.phrase.to_string());
                    failure = Some(format!("{:#}", e));
                    break;
                }
            }

            let passed = failure.is_none();
            if passed {
                info!(scenario = scenario.name, "scenario passed");
            }
            reports.push(ScenarioReport {
                name: scenario.name.to_string(),
                passed,
                failed_step,
                error: failure,
                duration_secs: begun.elapsed().as_secs_f64(),
            });
        }

        let report = SuiteReport {
            started,
            finished: Utc::now(),
            scenarios: reports,
        };

        if let Some(dir) = &self.config.output_dir {
            write_report(&report, dir).await?;
        }

        let passed = report.scenarios.iter().filter(|s| s.passed).count();
        info!(
            passed,
            failed = report.scenarios.len() - passed,
            "suite finished"
        );
        Ok(report)
    }
}

async fn write_report(report: &SuiteReport, dir: &Path) -> Result<()> {
    let path = dir.join("jenkins-smoke-report.json");
    let body = serde_json::to_string_pretty(report)?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating output dir {}", dir.display()))?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("writing report to {}", path.display()))?;
    info!(path = %path.display(), "suite report written");
    Ok(())
}

const JEE_APP: &str = "openshift-jee-sample";
const JEE_JOBS: &[&str] = &["sample-pipeline", "openshift-jee-sample"];

fn ephemeral_deployment() -> Scenario {
    Scenario::new("Jenkins ephemeral template deployment")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step("User enters oc new-app jenkins-ephemeral command", |ctx| {
            Box::pin(template_steps::new_app_ephemeral(ctx))
        })
        .step("route.route.openshift.io \"jenkins\" created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::Route,
                "jenkins",
            ))
        })
        .step("configmap \"jenkins-trusted-ca-bundle\" created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::ConfigMap,
                "jenkins-trusted-ca-bundle",
            ))
        })
        .step("serviceaccount \"jenkins\" created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::ServiceAccount,
                "jenkins",
            ))
        })
        .step(
            "rolebinding.authorization.openshift.io \"jenkins_edit\" created",
            |ctx| {
                Box::pin(resource_steps::resource_created(
                    ctx,
                    ResourceKind::RoleBinding,
                    "jenkins_edit",
                ))
            },
        )
        .step("service \"jenkins\" created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::Service,
                "jenkins",
            ))
        })
        .step("service \"jenkins-jnlp\" created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::Service,
                "jenkins-jnlp",
            ))
        })
        .step(
            "deploymentconfig.apps.openshift.io \"jenkins\" created",
            |ctx| {
                Box::pin(resource_steps::resource_created(
                    ctx,
                    ResourceKind::DeploymentConfig,
                    "jenkins",
                ))
            },
        )
        .step(
            "We check for deployment pod status to be \"Completed\"",
            |ctx| Box::pin(resource_steps::deploy_pod_succeeded(ctx)),
        )
        .step(
            "We check for jenkins master pod status to be \"Ready\"",
            |ctx| Box::pin(resource_steps::master_pod_ready(ctx)),
        )
        .step(
            "We ensure that jenkins deployment config is ready",
            |ctx| Box::pin(deployment_steps::dc_ready(ctx, "jenkins")),
        )
}

fn persistent_deployment() -> Scenario {
    Scenario::new("Jenkins persistent template deployment")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step("User enters oc new-app jenkins-persistent command", |ctx| {
            Box::pin(template_steps::new_app_persistent(ctx))
        })
        .step("persistentvolumeclaim \"jenkins\" created", |ctx| {
            Box::pin(volume_steps::pvc_created(ctx))
        })
        .step("we check the pvc status is \"Bound\"", |ctx| {
            Box::pin(volume_steps::pvc_bound(ctx))
        })
        .step(
            "We check for jenkins master pod status to be \"Ready\"",
            |ctx| Box::pin(resource_steps::master_pod_ready(ctx)),
        )
}

fn jee_sample_pipeline() -> Scenario {
    Scenario::new("JavaEE sample pipeline build")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step(
            "The user create objects from the sample maven template by processing the template and piping the output to oc create",
            |ctx| Box::pin(template_steps::process_maven_template(ctx)),
        )
        .step(
            "verify imagestream.image.openshift.io/openshift-jee-sample & imagestream.image.openshift.io/wildfly exist",
            |ctx| {
                Box::pin(async move {
                    resource_steps::resource_created(ctx, ResourceKind::ImageStream, JEE_APP)
                        .await?;
                    resource_steps::resource_created(ctx, ResourceKind::ImageStream, "wildfly")
                        .await
                })
            },
        )
        .step(
            "verify buildconfig.build.openshift.io/openshift-jee-sample & buildconfig.build.openshift.io/openshift-jee-sample-docker exist",
            |ctx| {
                Box::pin(async move {
                    resource_steps::resource_created(ctx, ResourceKind::BuildConfig, JEE_APP)
                        .await?;
                    resource_steps::resource_created(
                        ctx,
                        ResourceKind::BuildConfig,
                        "openshift-jee-sample-docker",
                    )
                    .await
                })
            },
        )
        .step("verify service/openshift-jee-sample is created", |ctx| {
            Box::pin(resource_steps::resource_created(
                ctx,
                ResourceKind::Service,
                JEE_APP,
            ))
        })
        .step(
            "verify route.route.openshift.io/openshift-jee-sample is created",
            |ctx| {
                Box::pin(resource_steps::resource_created(
                    ctx,
                    ResourceKind::Route,
                    JEE_APP,
                ))
            },
        )
        .step(
            "Trigger the build using oc start-build openshift-jee-sample",
            |ctx| Box::pin(build_steps::trigger_build(ctx, JEE_APP)),
        )
        .step(
            "verify the build status of openshift-jee-sample-docker build is Complete",
            |ctx| {
                Box::pin(build_steps::verify_build_complete(
                    ctx,
                    "openshift-jee-sample-docker-1",
                    2,
                    10,
                ))
            },
        )
        .step(
            "verify the build status of openshift-jee-sample-1 is Complete",
            |ctx| {
                Box::pin(build_steps::verify_build_complete(
                    ctx,
                    "openshift-jee-sample-1",
                    2,
                    100,
                ))
            },
        )
        .step(
            "verify the JaveEE application is accessible via route openshift-jee-sample",
            |ctx| Box::pin(build_steps::route_accessible(ctx, JEE_APP)),
        )
}

fn nodejs_sample_pipeline() -> Scenario {
    Scenario::new("NodeJS sample pipeline build")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step(
            "The user enters new-app command with nodejs_template",
            |ctx| Box::pin(template_steps::new_app_pipeline_from_file(ctx)),
        )
        .step("Trigger the build using oc start-build", |ctx| {
            Box::pin(build_steps::trigger_build(ctx, "sample-pipeline"))
        })
        .step(
            "verify the build status of \"nodejs-postgresql-example-1\" build is Complete",
            |ctx| {
                Box::pin(build_steps::verify_build_complete(
                    ctx,
                    "nodejs-postgresql-example-1",
                    5,
                    60,
                ))
            },
        )
        .step(
            "verify the build status of \"nodejs-postgresql-example-2\" build is Complete",
            |ctx| {
                Box::pin(async move {
                    // give the second build a moment to be created
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    build_steps::verify_build_complete(ctx, "nodejs-postgresql-example-2", 5, 60)
                        .await
                })
            },
        )
        .step(
            "route nodejs-postgresql-example must be created and be accessible",
            |ctx| {
                Box::pin(build_steps::route_accessible(
                    ctx,
                    "nodejs-postgresql-example",
                ))
            },
        )
}

fn build_reconciliation() -> Scenario {
    Scenario::new("Sync plugin reconciles deleted builds")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step(
            "We Trigger multiple builds using oc start-build openshift-jee-sample",
            |ctx| Box::pin(build_steps::trigger_builds(ctx, JEE_APP, 5)),
        )
        .step("We delete some builds", |ctx| {
            Box::pin(build_steps::delete_builds(
                ctx,
                &["openshift-jee-sample-2", "openshift-jee-sample-4"],
            ))
        })
        .step(
            "verify sync plugin is able to reconcile the build state and delete the job runs associated with the builds we deleted",
            |ctx| Box::pin(build_steps::ensure_builds_reconciled(ctx)),
        )
}

fn persistence_across_restart() -> Scenario {
    Scenario::new("Job data persists across a master pod restart")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step("We rsh into the master pod and check the jobs count", |ctx| {
            Box::pin(build_steps::snapshot_job_counts(ctx, JEE_JOBS))
        })
        .step("We delete the jenkins master pod", |ctx| {
            Box::pin(build_steps::delete_master_pod(ctx))
        })
        .step(
            "We check for jenkins master pod status to be \"Ready\"",
            |ctx| Box::pin(resource_steps::master_pod_ready(ctx)),
        )
        .step(
            "We rsh into the master pod & Compare if the data persist or is lost upon pod restart",
            |ctx| Box::pin(build_steps::verify_job_counts_persisted(ctx)),
        )
}

fn ephemeral_with_env_vars() -> Scenario {
    Scenario::new("Jenkins ephemeral template with environment variables")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step(
            "environment variables {\"JENKINS_PASSWORD\": \"vN6Ls3kKvK\"} are set",
            |ctx| {
                Box::pin(env_steps::given_env_vars(
                    ctx,
                    &[("JENKINS_PASSWORD", "vN6Ls3kKvK")],
                ))
            },
        )
        .step(
            "User enters oc new-app jenkins-ephemeral command using env vars",
            |ctx| Box::pin(template_steps::new_app_ephemeral_with_env(ctx)),
        )
        .step(
            "We set env var JENKINS_PASSWORD to value vN6Ls3kKvK in deploymentconfig jenkins",
            |ctx| {
                Box::pin(env_steps::set_env_on_dc(
                    ctx,
                    "jenkins",
                    "JENKINS_PASSWORD",
                    "vN6Ls3kKvK",
                ))
            },
        )
        .step(
            "We check for jenkins master pod status to be \"Ready\"",
            |ctx| Box::pin(resource_steps::master_pod_ready(ctx)),
        )
        .step(
            "We check that JENKINS_PASSWORD environement variable is set to vN6Ls3kKvK",
            |ctx| Box::pin(env_steps::verify_jenkins_password(ctx, "vN6Ls3kKvK")),
        )
        .step("base plugins manifest is well formed", |ctx| {
            Box::pin(plugin_steps::base_plugins_manifest_loads(ctx))
        })
}

fn cleanup() -> Scenario {
    Scenario::new("Cleanup of test resources")
        .step("Project \"jenkins-test\" is used", |ctx| {
            Box::pin(project_steps::use_configured_project(ctx))
        })
        .step(
            "We scale down the pod count in the replication controller to \"0\" from \"1\"",
            |ctx| Box::pin(deployment_steps::scale_jenkins_down(ctx)),
        )
        .step("delete all builds", |ctx| {
            Box::pin(delete_steps::delete_all(ctx, ResourceKind::Build))
        })
        .step("delete all buildconfigs", |ctx| {
            Box::pin(delete_steps::delete_all(ctx, ResourceKind::BuildConfig))
        })
        .step("delete all imagestream", |ctx| {
            Box::pin(delete_steps::delete_all(ctx, ResourceKind::ImageStream))
        })
        .step("we delete deploymentconfig.apps.openshift.io \"jenkins\"", |ctx| {
            Box::pin(delete_steps::delete_resource(
                ctx,
                ResourceKind::DeploymentConfig,
                "jenkins",
            ))
        })
        .step("we delete route.route.openshift.io \"jenkins\"", |ctx| {
            Box::pin(delete_steps::delete_resource(
                ctx,
                ResourceKind::Route,
                "jenkins",
            ))
        })
        .step("delete all remaining test resources", |ctx| {
            Box::pin(delete_steps::cleanup_test_resources(ctx))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_suite_has_canonical_scenarios() {
        let suite = Suite::smoke(Config::from_env());
        let names: Vec<&str> = suite.scenarios.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"Sync plugin reconciles deleted builds"));
    }

    #[test]
    fn every_scenario_starts_with_a_project_step() {
        let suite = Suite::smoke(Config::from_env());
        for scenario in &suite.scenarios {
            let phrases = scenario.phrases();
            assert!(
                phrases[0].starts_with("Project"),
                "{} does not select a project first",
                scenario.name
            );
        }
    }

    #[test]
    fn one_handler_per_phrase_within_a_scenario() {
        let suite = Suite::smoke(Config::from_env());
        for scenario in &suite.scenarios {
            let mut phrases = scenario.phrases();
            phrases.sort_unstable();
            phrases.dedup();
            assert_eq!(
                phrases.len(),
                scenario.phrases().len(),
                "{} binds a phrase twice",
                scenario.name
            );
        }
    }
}
