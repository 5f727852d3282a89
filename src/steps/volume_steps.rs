use anyhow::Result;

use crate::cluster::ResourceKind;
use crate::scenario::ScenarioContext;
use crate::steps::resource_steps::{resource_created, wait_for_status};

/// `persistentvolumeclaim "jenkins" created`.
pub async fn pvc_created(ctx: &mut ScenarioContext) -> Result<()> {
    resource_created(ctx, ResourceKind::PersistentVolumeClaim, "jenkins").await
}

/// `we check the pvc status is "Bound"`.
pub async fn pvc_bound(ctx: &mut ScenarioContext) -> Result<()> {
    wait_for_status(
        ctx,
        ResourceKind::PersistentVolumeClaim,
        "jenkins",
        "{.status.phase}",
        "Bound",
        1,
        10,
    )
    .await
}
