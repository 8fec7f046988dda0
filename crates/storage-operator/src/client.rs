//! Access to the keyed object store the reconciler reads from and writes to.
//!
//! [`ObjectStore`] is the seam the reconciler is written against. [`Client`] implements it on top
//! of the Kubernetes API.

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Resource, ResourceExt, api::PostParams, client::Client as KubeClient};
use serde::{Serialize, de::DeserializeOwned};
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("object {name:?} was not found"))]
    NotFound { name: String },

    #[snafu(display("object {name:?} already exists"))]
    AlreadyExists { name: String },

    #[snafu(display("object {name:?} was modified concurrently"))]
    Conflict { name: String },

    #[snafu(display("Kubernetes rejected the request for {name:?} with {code} {reason}: {message}"))]
    Api {
        name: String,
        code: u16,
        reason: String,
        message: String,
    },

    #[snafu(display("failed to talk to Kubernetes about {name:?}"))]
    Kube { source: kube::Error, name: String },
}

impl Error {
    /// Sorts a [`kube::Error`] into the cases the reconciler tells apart.
    fn from_kube(source: kube::Error, name: &str) -> Self {
        let name = name.to_string();
        match source {
            kube::Error::Api(status) => match (status.code, status.reason.as_str()) {
                (404, _) => Self::NotFound { name },
                (409, "AlreadyExists") => Self::AlreadyExists { name },
                (409, _) => Self::Conflict { name },
                (code, reason) => Self::Api {
                    name,
                    code,
                    reason: reason.to_string(),
                    message: status.message.clone(),
                },
            },
            source => Self::Kube { source, name },
        }
    }
}

/// A keyed store of namespaced objects of type `K`.
///
/// Implementations perform exactly one attempt per call; retrying is left to the caller.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Send + Sync,
{
    /// Retrieves the object with the given name, [`None`] if it does not exist.
    async fn get_opt(&self, name: &str, namespace: &str) -> Result<Option<K>>;

    /// Creates a new object. Fails with [`Error::AlreadyExists`] if it exists already.
    async fn create(&self, resource: &K) -> Result<K>;

    /// Replaces an existing object as a whole.
    ///
    /// The `resourceVersion` carried in the metadata is used for optimistic locking, a stale one
    /// fails with [`Error::Conflict`].
    async fn update(&self, resource: &K) -> Result<K>;
}

/// This `Client` can be used to access Kubernetes.
/// It wraps an underlying [`kube::client::Client`] and records a field manager on all writes.
#[derive(Clone)]
pub struct Client {
    client: KubeClient,
    post_params: PostParams,
}

impl Client {
    pub fn new(client: KubeClient, field_manager: Option<String>) -> Self {
        Self {
            client,
            post_params: PostParams {
                field_manager,
                ..PostParams::default()
            },
        }
    }

    /// Returns a [`kube::client::Client`] that can be freely used.
    pub fn as_kube_client(&self) -> KubeClient {
        self.client.clone()
    }

    pub fn get_all_api<T>(&self) -> Api<T>
    where
        T: Resource<DynamicType = ()>,
    {
        Api::all(self.client.clone())
    }

    pub fn get_api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("field_manager", &self.post_params.field_manager)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<K> ObjectStore<K> for Client
where
    K: Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Send
        + Sync
        + 'static,
{
    async fn get_opt(&self, name: &str, namespace: &str) -> Result<Option<K>> {
        self.get_api::<K>(namespace)
            .get_opt(name)
            .await
            .map_err(|source| Error::from_kube(source, name))
    }

    async fn create(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        self.get_api::<K>(&resource.namespace().unwrap_or_default())
            .create(&self.post_params, resource)
            .await
            .map_err(|source| Error::from_kube(source, &name))
    }

    async fn update(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        self.get_api::<K>(&resource.namespace().unwrap_or_default())
            .replace(&name, &self.post_params, resource)
            .await
            .map_err(|source| Error::from_kube(source, &name))
    }
}

/// Builds the error kube returns for a failed request, from the status the API server sends back.
#[cfg(test)]
pub(crate) fn kube_api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(
        serde_yaml::from_str(&indoc::formatdoc! {r#"
            status: Failure
            message: "request failed with {reason}"
            reason: "{reason}"
            code: {code}
        "#})
        .expect("illegal test input"),
    )
}
