use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of the singleton [`Infrastructure`] object describing the cluster.
pub const INFRASTRUCTURE_NAME: &str = "cluster";

/// Read-only view of the OpenShift `Infrastructure` object. Only the platform fields are modelled.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Infrastructure",
    plural = "infrastructures",
    status = "InfrastructureStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    /// Deprecated in favour of `platformStatus.type`, still set by older clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<PlatformStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl Infrastructure {
    /// The reported platform identifier, preferring `platformStatus.type`.
    pub fn platform_type(&self) -> Option<&str> {
        let status = self.status.as_ref()?;
        status
            .platform_status
            .as_ref()
            .and_then(|platform_status| platform_status.type_.as_deref())
            .or(status.platform.as_deref())
            .filter(|platform| !platform.is_empty())
    }
}
