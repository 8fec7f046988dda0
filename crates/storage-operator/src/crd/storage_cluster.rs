use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::ResourceRequirements, apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::Placement;

/// The parent resource. Its spec and status drive the shape of every child resource this
/// operator manages.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "ocs.openshift.io",
    version = "v1",
    kind = "StorageCluster",
    plural = "storageclusters",
    shortname = "storcluster",
    status = "StorageClusterStatus",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct StorageClusterSpec {
    #[serde(default)]
    pub managed_resources: ManagedResources,

    /// Placement overrides keyed by daemon role, e.g. `rgw`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub placement: BTreeMap<String, Placement>,

    /// Compute resource overrides keyed by daemon role, e.g. `rgw`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, ResourceRequirements>,

    #[serde(default)]
    pub arbiter: ArbiterSpec,

    /// Restricts the nodes storage daemons may be scheduled on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResources {
    #[serde(default)]
    pub ceph_object_stores: ManageCephObjectStores,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageCephObjectStores {
    /// One of `ignore`, `init` or `manage`. Anything else is treated as `manage`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reconcile_strategy: String,

    /// Number of gateway instances. `0` selects the built-in default.
    #[serde(default)]
    pub gateway_instances: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiterSpec {
    #[serde(default)]
    pub enable: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClusterStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub failure_domain: String,
}

impl StorageCluster {
    pub fn is_arbiter_enabled(&self) -> bool {
        self.spec.arbiter.enable
    }

    /// The failure domain computed for this cluster, empty if it was not determined yet.
    pub fn failure_domain(&self) -> &str {
        self.status
            .as_ref()
            .map_or("", |status| status.failure_domain.as_str())
    }
}
