use kube::ResourceExt;
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{
    builder::meta::{self, ObjectMetaBuilder},
    constants::{
        ARBITER_REPLICA_COUNT, ARBITER_REPLICAS_PER_FAILURE_DOMAIN, CEPH_OBJECT_STORE_NAME_SUFFIX,
        DATA_POOL_TARGET_SIZE_RATIO, DEFAULT_GATEWAY_INSTANCES, DEFAULT_REPLICA_COUNT,
        DEFAULT_REPLICAS_PER_FAILURE_DOMAIN, GATEWAY_PORT, RGW_ROLE,
    },
    crd::{CephObjectStore, GatewaySpec, ObjectStoreSpec, PoolSpec, ReplicatedSpec, StorageCluster},
    defaults::{placement_for_role, resources_for_role},
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Eq, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("StorageCluster {name:?} has no namespace"))]
    ObjectHasNoNamespace { name: String },

    #[snafu(display("failed to set owner reference on CephObjectStore {name:?}"))]
    OwnerReferenceFromResource { source: meta::Error, name: String },
}

/// The role a pool plays in the object store.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PoolRole {
    Data,
    Metadata,
}

/// Name of the CephObjectStore belonging to the StorageCluster with the given name.
pub fn ceph_object_store_name(cluster_name: &str) -> String {
    format!("{cluster_name}-{CEPH_OBJECT_STORE_NAME_SUFFIX}")
}

/// Builds the CephObjectStores that should exist for the given StorageCluster.
///
/// The identity of every returned object only depends on the identity of the cluster, so repeated
/// calls address the same objects. Each object carries a controller owner reference to the
/// cluster, the whole build fails if any of them cannot get one.
pub fn build_ceph_object_stores(cluster: &StorageCluster) -> Result<Vec<CephObjectStore>> {
    let cluster_name = cluster.name_any();
    let namespace = cluster
        .namespace()
        .context(ObjectHasNoNamespaceSnafu {
            name: cluster_name.clone(),
        })?;
    let name = ceph_object_store_name(&cluster_name);

    let metadata = ObjectMetaBuilder::new()
        .name(name.clone())
        .namespace(namespace)
        .ownerreference_from_resource(cluster, Some(true), Some(true))
        .context(OwnerReferenceFromResourceSnafu { name })?
        .build();

    let failure_domain = cluster.failure_domain();

    Ok(vec![CephObjectStore {
        metadata,
        spec: ObjectStoreSpec {
            preserve_pools_on_delete: false,
            data_pool: PoolSpec {
                failure_domain: failure_domain.to_string(),
                replicated: replicated_spec(cluster, PoolRole::Data),
            },
            metadata_pool: PoolSpec {
                failure_domain: failure_domain.to_string(),
                replicated: replicated_spec(cluster, PoolRole::Metadata),
            },
            gateway: GatewaySpec {
                port: GATEWAY_PORT,
                instances: gateway_instances(cluster),
                placement: placement_for_role(cluster, RGW_ROLE),
                resources: resources_for_role(cluster, RGW_ROLE),
            },
        },
        status: None,
    }])
}

/// The requested number of gateway instances, [`DEFAULT_GATEWAY_INSTANCES`] if none was requested.
pub fn gateway_instances(cluster: &StorageCluster) -> i32 {
    match cluster.spec.managed_resources.ceph_object_stores.gateway_instances {
        0 => DEFAULT_GATEWAY_INSTANCES,
        instances => instances,
    }
}

/// Replication layout of a pool. Arbiter (stretched) clusters keep two copies in each of their
/// failure domains.
pub fn replicated_spec(cluster: &StorageCluster, role: PoolRole) -> ReplicatedSpec {
    let (size, replicas_per_failure_domain) = if cluster.is_arbiter_enabled() {
        (ARBITER_REPLICA_COUNT, ARBITER_REPLICAS_PER_FAILURE_DOMAIN)
    } else {
        (DEFAULT_REPLICA_COUNT, DEFAULT_REPLICAS_PER_FAILURE_DOMAIN)
    };

    ReplicatedSpec {
        size,
        target_size_ratio: match role {
            PoolRole::Data => Some(DATA_POOL_TARGET_SIZE_RATIO),
            PoolRole::Metadata => None,
        },
        replicas_per_failure_domain,
    }
}

#[cfg(test)]
mod tests {
    use indoc::formatdoc;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use rstest::rstest;

    use super::*;
    use crate::defaults::{default_node_affinity, default_resources};

    fn build_cluster(gateway_instances: i32, arbiter: bool) -> StorageCluster {
        serde_yaml::from_str(&formatdoc! {r#"
            apiVersion: ocs.openshift.io/v1
            kind: StorageCluster
            metadata:
              name: ocs-storagecluster
              namespace: openshift-storage
              uid: "c0ffee"
            spec:
              arbiter:
                enable: {arbiter}
              managedResources:
                cephObjectStores:
                  gatewayInstances: {gateway_instances}
            status:
              failureDomain: zone
        "#})
        .expect("illegal test input")
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(3, 3)]
    fn gateway_instances_default(#[case] requested: i32, #[case] expected: i32) {
        let stores = build_ceph_object_stores(&build_cluster(requested, false)).unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].spec.gateway.instances, expected);
    }

    #[test]
    fn identity_is_derived_from_cluster() {
        let cluster = build_cluster(0, false);
        let first = build_ceph_object_stores(&cluster).unwrap();
        let second = build_ceph_object_stores(&cluster).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].name_any(), "ocs-storagecluster-cephobjectstore");
        assert_eq!(first[0].namespace().as_deref(), Some("openshift-storage"));
    }

    #[test]
    fn fully_populated_spec() {
        let store = build_ceph_object_stores(&build_cluster(2, false))
            .unwrap()
            .remove(0);

        assert_eq!(
            store.metadata.owner_references,
            Some(vec![OwnerReference {
                api_version: "ocs.openshift.io/v1".to_string(),
                block_owner_deletion: Some(true),
                controller: Some(true),
                kind: "StorageCluster".to_string(),
                name: "ocs-storagecluster".to_string(),
                uid: "c0ffee".to_string(),
            }])
        );

        let spec = store.spec;
        assert!(!spec.preserve_pools_on_delete);
        assert_eq!(spec.data_pool.failure_domain, "zone");
        assert_eq!(spec.metadata_pool.failure_domain, "zone");
        assert_eq!(
            spec.data_pool.replicated,
            ReplicatedSpec {
                size: 3,
                target_size_ratio: Some(0.49),
                replicas_per_failure_domain: 1,
            }
        );
        assert_eq!(
            spec.metadata_pool.replicated,
            ReplicatedSpec {
                size: 3,
                target_size_ratio: None,
                replicas_per_failure_domain: 1,
            }
        );
        assert_eq!(spec.gateway.port, 80);
        assert_eq!(spec.gateway.instances, 2);
        assert_eq!(
            spec.gateway.placement.node_affinity,
            Some(default_node_affinity())
        );
        assert_eq!(spec.gateway.resources, default_resources(RGW_ROLE));
    }

    #[rstest]
    #[case(PoolRole::Data, false, 3, 1)]
    #[case(PoolRole::Metadata, false, 3, 1)]
    #[case(PoolRole::Data, true, 4, 2)]
    #[case(PoolRole::Metadata, true, 4, 2)]
    fn replication_follows_arbiter_mode(
        #[case] role: PoolRole,
        #[case] arbiter: bool,
        #[case] size: u32,
        #[case] replicas_per_failure_domain: u32,
    ) {
        let replicated = replicated_spec(&build_cluster(0, arbiter), role);
        assert_eq!(replicated.size, size);
        assert_eq!(
            replicated.replicas_per_failure_domain,
            replicas_per_failure_domain
        );
    }

    #[test]
    fn missing_uid_fails_the_build() {
        let mut cluster = build_cluster(0, false);
        cluster.metadata.uid = None;

        let error = build_ceph_object_stores(&cluster).unwrap_err();
        assert_eq!(
            error,
            Error::OwnerReferenceFromResource {
                source: meta::Error::MissingObjectKey { key: "uid" },
                name: "ocs-storagecluster-cephobjectstore".to_string(),
            }
        );
    }

    #[test]
    fn missing_namespace_fails_the_build() {
        let mut cluster = build_cluster(0, false);
        cluster.metadata.namespace = None;

        assert!(matches!(
            build_ceph_object_stores(&cluster),
            Err(Error::ObjectHasNoNamespace { .. })
        ));
    }

    #[test]
    fn pool_role_display() {
        assert_eq!(PoolRole::Data.to_string(), "data");
        assert_eq!(PoolRole::Metadata.to_string(), "metadata");
    }
}
