use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The set of resource kinds the harness is allowed to query or mutate.
///
/// Kind strings are validated against this enum instead of being passed
/// through to `oc` verbatim, so a typo in a call site fails fast rather than
/// producing an empty CLI result that looks like a missing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Build,
    BuildConfig,
    Pod,
    PersistentVolumeClaim,
    Route,
    Service,
    ServiceAccount,
    ConfigMap,
    DeploymentConfig,
    ReplicationController,
    ImageStream,
    RoleBinding,
    Secret,
    Namespace,
}

impl ResourceKind {
    /// The spelling `oc` expects on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Build => "build",
            ResourceKind::BuildConfig => "buildconfig",
            ResourceKind::Pod => "pod",
            ResourceKind::PersistentVolumeClaim => "pvc",
            ResourceKind::Route => "route",
            ResourceKind::Service => "service",
            ResourceKind::ServiceAccount => "serviceaccount",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::DeploymentConfig => "deploymentconfig",
            ResourceKind::ReplicationController => "rc",
            ResourceKind::ImageStream => "imagestream",
            ResourceKind::RoleBinding => "rolebinding",
            ResourceKind::Secret => "secret",
            ResourceKind::Namespace => "namespace",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the short forms the original oc call sites used.
        match s {
            "build" | "builds" => Ok(ResourceKind::Build),
            "buildconfig" | "bc" => Ok(ResourceKind::BuildConfig),
            "pod" | "pods" => Ok(ResourceKind::Pod),
            "pvc" | "persistentvolumeclaim" => Ok(ResourceKind::PersistentVolumeClaim),
            "route" => Ok(ResourceKind::Route),
            "service" | "svc" => Ok(ResourceKind::Service),
            "serviceaccount" | "sa" => Ok(ResourceKind::ServiceAccount),
            "configmap" | "cm" => Ok(ResourceKind::ConfigMap),
            "deploymentconfig" | "dc" => Ok(ResourceKind::DeploymentConfig),
            "replicationcontroller" | "rc" => Ok(ResourceKind::ReplicationController),
            "imagestream" | "is" => Ok(ResourceKind::ImageStream),
            "rolebinding" => Ok(ResourceKind::RoleBinding),
            "secret" => Ok(ResourceKind::Secret),
            "namespace" | "ns" | "project" => Ok(ResourceKind::Namespace),
            other => Err(format!("unknown resource kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_forms() {
        assert_eq!("bc".parse::<ResourceKind>(), Ok(ResourceKind::BuildConfig));
        assert_eq!(
            "pvc".parse::<ResourceKind>(),
            Ok(ResourceKind::PersistentVolumeClaim)
        );
        assert_eq!("sa".parse::<ResourceKind>(), Ok(ResourceKind::ServiceAccount));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("widget".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn round_trips_oc_spelling() {
        let kinds = [
            ResourceKind::Build,
            ResourceKind::Route,
            ResourceKind::DeploymentConfig,
        ];
        for kind in kinds {
            assert_eq!(kind.as_str().parse::<ResourceKind>(), Ok(kind));
        }
    }
}
