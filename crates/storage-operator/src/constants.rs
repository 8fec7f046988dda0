use const_format::concatcp;

/// The OCS node key prefix.
const OCS_NODE_KEY_PREFIX: &str = "node.ocs.openshift.io/";

/// The OCS cluster key prefix.
const OCS_CLUSTER_KEY_PREFIX: &str = "cluster.ocs.openshift.io/";

/// The label `cluster.ocs.openshift.io/openshift-storage` marks nodes that may host storage
/// daemons.
pub const STORAGE_NODE_LABEL_KEY: &str = concatcp!(OCS_CLUSTER_KEY_PREFIX, "openshift-storage");

/// The taint `node.ocs.openshift.io/storage` is put on dedicated storage nodes.
pub const STORAGE_NODE_TAINT_KEY: &str = concatcp!(OCS_NODE_KEY_PREFIX, "storage");

/// The well-known Kubernetes hostname topology key.
pub const TOPOLOGY_KEY_HOSTNAME: &str = "kubernetes.io/hostname";

/// The daemon role of the object storage gateway, used to look up placement and resources.
pub const RGW_ROLE: &str = "rgw";

/// The `app` label Rook puts on gateway pods.
pub const RGW_APP_LABEL_VALUE: &str = "rook-ceph-rgw";

/// Suffix appended to the StorageCluster name to derive the CephObjectStore name.
pub const CEPH_OBJECT_STORE_NAME_SUFFIX: &str = "cephobjectstore";

/// Used when the StorageCluster does not request an explicit number of gateway instances.
pub const DEFAULT_GATEWAY_INSTANCES: i32 = 1;

pub const GATEWAY_PORT: i32 = 80;

pub const DEFAULT_REPLICA_COUNT: u32 = 3;
pub const ARBITER_REPLICA_COUNT: u32 = 4;

pub const DEFAULT_REPLICAS_PER_FAILURE_DOMAIN: u32 = 1;
pub const ARBITER_REPLICAS_PER_FAILURE_DOMAIN: u32 = 2;

/// Share of the raw capacity the data pool is expected to grow into.
pub const DATA_POOL_TARGET_SIZE_RATIO: f64 = 0.49;
