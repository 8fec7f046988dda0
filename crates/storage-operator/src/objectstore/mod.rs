//! Keeps the CephObjectStores of a StorageCluster in their desired state.
//!
//! A reconciliation pass resolves the [`ReconcileStrategy`] once, checks the platform gate, builds
//! the desired objects and then applies a [`Decision`] to each of them in turn.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use snafu::{ResultExt, Snafu};
use tracing::instrument;

use crate::{
    client::{self, ObjectStore},
    crd::{CephObjectStore, StorageCluster},
    platform::{self, Gate, Platform, PlatformProvider},
    strategy::ReconcileStrategy,
};

pub mod desired;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to determine the cluster platform"))]
    GetPlatform { source: platform::Error },

    #[snafu(display("failed to build the desired CephObjectStores"))]
    BuildObjectStores { source: desired::Error },

    #[snafu(display("failed to get CephObjectStore {name:?} in namespace {namespace:?}"))]
    GetObjectStore {
        source: client::Error,
        name: String,
        namespace: String,
    },

    #[snafu(display(
        "cannot restore CephObjectStore {name:?} in namespace {namespace:?}, it is pending deletion"
    ))]
    DeletionInProgress { name: String, namespace: String },

    #[snafu(display("failed to create CephObjectStore {name:?} in namespace {namespace:?}"))]
    CreateObjectStore {
        source: client::Error,
        name: String,
        namespace: String,
    },

    #[snafu(display("failed to update CephObjectStore {name:?} in namespace {namespace:?}"))]
    UpdateObjectStore {
        source: client::Error,
        name: String,
        namespace: String,
    },
}

/// What happens to a single desired object, given what currently exists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Decision {
    /// Nothing exists yet, the desired object is created as is.
    Create,

    /// The object exists and must not be touched.
    Keep,

    /// The object exists and is forced back to the desired spec and owner references. All other
    /// metadata of the existing object is preserved.
    Restore,

    /// The object is pending deletion and cannot be restored.
    RefuseDeleting,
}

/// Decides how to handle a desired object.
///
/// A pending deletion always wins over the strategy. [`ReconcileStrategy::Ignore`] normally ends
/// the pass before anything is read, should it get here anyway it is treated like
/// [`ReconcileStrategy::Manage`].
pub fn decide<K>(existing: Option<&K>, strategy: ReconcileStrategy) -> Decision
where
    K: Resource,
{
    match existing {
        None => Decision::Create,
        Some(existing) if existing.meta().deletion_timestamp.is_some() => Decision::RefuseDeleting,
        Some(_) => match strategy {
            ReconcileStrategy::Init => Decision::Keep,
            ReconcileStrategy::Manage | ReconcileStrategy::Ignore => Decision::Restore,
        },
    }
}

/// Result of a successful reconciliation pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PassOutcome {
    /// The strategy is [`ReconcileStrategy::Ignore`], nothing was read or written.
    Ignored,

    /// The platform brings its own object storage, nothing was read or written.
    PlatformUnsupported(Platform),

    /// Every desired object was handled, in order, with the given decision.
    Reconciled(Vec<(String, Decision)>),
}

/// Runs one reconciliation pass of the CephObjectStores owned by `cluster`.
///
/// The pass stops at the first object that fails. It performs exactly one attempt per object,
/// retrying is left to the caller.
#[instrument(
    skip_all,
    fields(
        storagecluster.name = %cluster.name_any(),
        storagecluster.namespace = %cluster.namespace().unwrap_or_default(),
        strategy = tracing::field::Empty,
    )
)]
pub async fn ensure_ceph_object_stores<S, P>(
    cluster: &StorageCluster,
    store: &S,
    platform: &P,
) -> Result<PassOutcome>
where
    S: ObjectStore<CephObjectStore> + ?Sized,
    P: PlatformProvider + ?Sized,
{
    let strategy = ReconcileStrategy::resolve(
        &cluster
            .spec
            .managed_resources
            .ceph_object_stores
            .reconcile_strategy,
    );
    tracing::Span::current().record("strategy", tracing::field::display(strategy));

    if strategy == ReconcileStrategy::Ignore {
        tracing::debug!("reconcile strategy is ignore, leaving CephObjectStores alone");
        return Ok(PassOutcome::Ignored);
    }

    let platform = platform.platform().await.context(GetPlatformSnafu)?;
    if platform::check(&platform) == Gate::Skip {
        tracing::info!(
            %platform,
            "platform provides its own object storage, not deploying CephObjectStores"
        );
        return Ok(PassOutcome::PlatformUnsupported(platform));
    }

    let desired = desired::build_ceph_object_stores(cluster).context(BuildObjectStoresSnafu)?;

    let mut applied = Vec::with_capacity(desired.len());
    for object_store in &desired {
        let decision = reconcile_object_store(store, object_store, strategy).await?;
        applied.push((object_store.name_any(), decision));
    }

    Ok(PassOutcome::Reconciled(applied))
}

/// Brings a single CephObjectStore in line with `desired`.
pub async fn reconcile_object_store<S>(
    store: &S,
    desired: &CephObjectStore,
    strategy: ReconcileStrategy,
) -> Result<Decision>
where
    S: ObjectStore<CephObjectStore> + ?Sized,
{
    let name = desired.name_any();
    let namespace = desired.namespace().unwrap_or_default();

    let existing = store
        .get_opt(&name, &namespace)
        .await
        .with_context(|_| GetObjectStoreSnafu {
            name: name.clone(),
            namespace: namespace.clone(),
        })?;

    let decision = decide(existing.as_ref(), strategy);
    match decision {
        Decision::Create => {
            store
                .create(desired)
                .await
                .with_context(|_| CreateObjectStoreSnafu {
                    name: name.clone(),
                    namespace: namespace.clone(),
                })?;
            tracing::info!(
                cephobjectstore.name = %name,
                cephobjectstore.namespace = %namespace,
                "created CephObjectStore"
            );
        }
        Decision::Keep => {
            tracing::debug!(
                cephobjectstore.name = %name,
                cephobjectstore.namespace = %namespace,
                "CephObjectStore exists and reconcile strategy is init, leaving it untouched"
            );
        }
        Decision::RefuseDeleting => {
            return DeletionInProgressSnafu { name, namespace }.fail();
        }
        Decision::Restore => {
            let restored = restore(existing.map(|existing| existing.metadata), desired);
            store
                .update(&restored)
                .await
                .with_context(|_| UpdateObjectStoreSnafu {
                    name: name.clone(),
                    namespace: namespace.clone(),
                })?;
            tracing::info!(
                cephobjectstore.name = %name,
                cephobjectstore.namespace = %namespace,
                "restored CephObjectStore"
            );
        }
    }

    Ok(decision)
}

/// Merges `desired` onto the metadata of the existing object: the result carries the desired spec
/// and owner references and keeps everything else from the existing metadata, including its
/// resource version.
fn restore(existing: Option<ObjectMeta>, desired: &CephObjectStore) -> CephObjectStore {
    let mut restored = desired.clone();
    if let Some(metadata) = existing {
        restored.metadata = metadata;
        restored.metadata.owner_references = desired.metadata.owner_references.clone();
    }
    restored
}
