use anyhow::{ensure, Result};
use tracing::info;

use crate::plugins::load_manifest;
use crate::scenario::ScenarioContext;

/// The base-plugins manifest parses and is non-empty. Run before any
/// scenario that reasons about installed plugins.
pub async fn base_plugins_manifest_loads(ctx: &mut ScenarioContext) -> Result<()> {
    let plugins = load_manifest(&ctx.config.base_plugins_path).await?;
    ensure!(
        !plugins.is_empty(),
        "base plugins manifest {} is empty",
        ctx.config.base_plugins_path.display()
    );
    info!(
        count = plugins.len(),
        path = %ctx.config.base_plugins_path.display(),
        "base plugins manifest loaded"
    );
    Ok(())
}
