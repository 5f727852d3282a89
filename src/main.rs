use anyhow::Result;
use jenkins_smoke::config::Config;
use jenkins_smoke::suite::Suite;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jenkins_smoke=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting jenkins-smoke - Jenkins on OpenShift smoke suite");

    let config = Config::from_env();
    let report = Suite::smoke(config).run().await?;

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
