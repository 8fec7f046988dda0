use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use snafu::{OptionExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Eq, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("owner reference is missing the {key:?} key"))]
    MissingObjectKey { key: &'static str },
}

/// A builder to build [`ObjectMeta`] objects.
///
/// Of special interest is the [`Self::ownerreference_from_resource()`] function.
/// Note: This builder only supports a single `OwnerReference`.
#[derive(Clone, Debug, Default)]
pub struct ObjectMetaBuilder {
    name: Option<String>,
    namespace: Option<String>,
    ownerreference: Option<OwnerReference>,
}

impl ObjectMetaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the `OwnerReference` to the provided resource.
    ///
    /// Fails if the resource lacks any of the keys an owner reference needs, most notably the
    /// `uid` of objects that were never persisted.
    pub fn ownerreference_from_resource<T: Resource<DynamicType = ()>>(
        &mut self,
        resource: &T,
        block_owner_deletion: Option<bool>,
        controller: Option<bool>,
    ) -> Result<&mut Self> {
        self.ownerreference = Some(
            OwnerReferenceBuilder::new()
                .initialize_from_resource(resource)
                .block_owner_deletion_opt(block_owner_deletion)
                .controller_opt(controller)
                .build()?,
        );
        Ok(self)
    }

    pub fn build(&self) -> ObjectMeta {
        ObjectMeta {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            owner_references: self
                .ownerreference
                .as_ref()
                .map(|ownerreference| vec![ownerreference.clone()]),
            ..ObjectMeta::default()
        }
    }
}

/// A builder to build [`OwnerReference`] objects.
///
/// Of special interest is the [`Self::initialize_from_resource()`] function.
#[derive(Clone, Debug, Default)]
pub struct OwnerReferenceBuilder {
    api_version: Option<String>,
    block_owner_deletion: Option<bool>,
    controller: Option<bool>,
    kind: Option<String>,
    name: Option<String>,
    uid: Option<String>,
}

impl OwnerReferenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_version(&mut self, api_version: impl Into<String>) -> &mut Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn block_owner_deletion_opt(&mut self, block_owner_deletion: Option<bool>) -> &mut Self {
        self.block_owner_deletion = block_owner_deletion;
        self
    }

    pub fn controller_opt(&mut self, controller: Option<bool>) -> &mut Self {
        self.controller = controller;
        self
    }

    pub fn kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn name_opt(&mut self, name: impl Into<Option<String>>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn uid_opt(&mut self, uid: impl Into<Option<String>>) -> &mut Self {
        self.uid = uid.into();
        self
    }

    /// Can be used to initialize a builder with settings from an existing resource.
    /// The builder will create an `OwnerReference` that points to the passed resource.
    ///
    /// This will _not_ set `controller` or `block_owner_deletion`.
    pub fn initialize_from_resource<T: Resource<DynamicType = ()>>(
        &mut self,
        resource: &T,
    ) -> &mut Self {
        self.api_version(T::api_version(&()))
            .kind(T::kind(&()))
            .name_opt(resource.meta().name.clone())
            .uid_opt(resource.uid());
        self
    }

    pub fn build(&self) -> Result<OwnerReference> {
        Ok(OwnerReference {
            api_version: self
                .api_version
                .clone()
                .context(MissingObjectKeySnafu { key: "api_version" })?,
            block_owner_deletion: self.block_owner_deletion,
            controller: self.controller,
            kind: self
                .kind
                .clone()
                .context(MissingObjectKeySnafu { key: "kind" })?,
            name: self
                .name
                .clone()
                .context(MissingObjectKeySnafu { key: "name" })?,
            uid: self
                .uid
                .clone()
                .context(MissingObjectKeySnafu { key: "uid" })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::Pod;

    use super::*;

    #[test]
    fn test_objectmeta_builder() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("pod".to_string());
        pod.metadata.uid = Some("uid".to_string());

        let meta = ObjectMetaBuilder::new()
            .name("foo")
            .namespace("bar")
            .ownerreference_from_resource(&pod, Some(true), Some(true))
            .unwrap()
            .build();

        assert_eq!(meta.name, Some("foo".to_string()));
        assert_eq!(meta.namespace, Some("bar".to_string()));
        assert_eq!(
            meta.owner_references,
            Some(vec![OwnerReference {
                api_version: "v1".to_string(),
                block_owner_deletion: Some(true),
                controller: Some(true),
                kind: "Pod".to_string(),
                name: "pod".to_string(),
                uid: "uid".to_string(),
            }])
        );
    }

    #[test]
    fn ownerreference_requires_uid() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("pod".to_string());

        let result = ObjectMetaBuilder::new()
            .name("foo")
            .ownerreference_from_resource(&pod, None, Some(true))
            .map(|builder| builder.build());

        assert_eq!(result, Err(Error::MissingObjectKey { key: "uid" }));
    }
}
