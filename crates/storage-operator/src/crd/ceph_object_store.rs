use k8s_openapi::api::core::v1::{
    NodeAffinity, PodAffinity, PodAntiAffinity, ResourceRequirements, Toleration,
    TopologySpreadConstraint,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The object storage gateway (RGW) together with the pools backing it.
///
/// Only the fields this operator manages are modelled. Everything else on the live object is
/// carried through [`kube::core::ObjectMeta`] when it is restored.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "ceph.rook.io",
    version = "v1",
    kind = "CephObjectStore",
    plural = "cephobjectstores",
    status = "CephObjectStoreStatus",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreSpec {
    #[serde(default)]
    pub preserve_pools_on_delete: bool,

    #[serde(default)]
    pub data_pool: PoolSpec,

    #[serde(default)]
    pub metadata_pool: PoolSpec,

    #[serde(default)]
    pub gateway: GatewaySpec,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub failure_domain: String,

    #[serde(default)]
    pub replicated: ReplicatedSpec,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicatedSpec {
    /// Number of copies kept of every object in the pool.
    #[serde(default)]
    pub size: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_size_ratio: Option<f64>,

    #[serde(default)]
    pub replicas_per_failure_domain: u32,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default)]
    pub port: i32,

    #[serde(default)]
    pub instances: i32,

    #[serde(default)]
    pub placement: Placement,

    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// Scheduling constraints for a storage daemon.
///
/// Used both on the [`CephObjectStore`] gateway and as the per-role override on the
/// [`StorageCluster`](crate::crd::StorageCluster).
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAntiAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_spread_constraints: Option<Vec<TopologySpreadConstraint>>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CephObjectStoreStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}
