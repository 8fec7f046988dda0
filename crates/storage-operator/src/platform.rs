//! Detection of the platform the cluster runs on and the gate deciding whether a CephObjectStore
//! may be deployed there.

use std::fmt::Display;

use async_trait::async_trait;
use kube::{Api, client::Client as KubeClient};
use snafu::{ResultExt, Snafu};
use tokio::sync::OnceCell;

use crate::crd::{INFRASTRUCTURE_NAME, Infrastructure};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to get Infrastructure {name:?}"))]
    GetInfrastructure { source: kube::Error, name: String },
}

/// The platform identifiers reported by the cluster's `Infrastructure` object.
///
/// Identifiers are matched exactly. Anything else, including differently cased well-known names,
/// is kept verbatim in [`Platform::Other`].
#[derive(Clone, Debug, Eq, Hash, PartialEq, strum::EnumString)]
pub enum Platform {
    #[strum(serialize = "AWS")]
    Aws,
    Azure,
    #[strum(serialize = "GCP")]
    Gcp,
    #[strum(serialize = "IBMCloud")]
    IbmCloud,
    BareMetal,
    OpenStack,
    VSphere,
    #[strum(serialize = "oVirt")]
    Ovirt,
    Nutanix,
    PowerVS,
    External,
    None,
    #[strum(default)]
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aws => "AWS",
            Self::Azure => "Azure",
            Self::Gcp => "GCP",
            Self::IbmCloud => "IBMCloud",
            Self::BareMetal => "BareMetal",
            Self::OpenStack => "OpenStack",
            Self::VSphere => "VSphere",
            Self::Ovirt => "oVirt",
            Self::Nutanix => "Nutanix",
            Self::PowerVS => "PowerVS",
            Self::External => "External",
            Self::None => "None",
            Self::Other(platform) => platform,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the platform check done before anything is reconciled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gate {
    Allow,
    /// The platform cannot host the resource. Skipping is a successful no-op, not an error.
    Skip,
}

/// Platforms where no CephObjectStore is deployed, as they bring their own object storage.
pub const AVOID_OBJECT_STORE_PLATFORMS: [Platform; 4] =
    [Platform::Aws, Platform::Gcp, Platform::Azure, Platform::IbmCloud];

/// Decides whether a CephObjectStore may be deployed on the given platform.
pub fn check(platform: &Platform) -> Gate {
    if AVOID_OBJECT_STORE_PLATFORMS.contains(platform) {
        Gate::Skip
    } else {
        Gate::Allow
    }
}

/// Supplies the platform identifier of the cluster.
#[async_trait]
pub trait PlatformProvider: Send + Sync {
    async fn platform(&self) -> Result<Platform, Error>;
}

/// A platform fixed by configuration, bypassing detection.
#[derive(Clone, Debug)]
pub struct StaticPlatform(pub Platform);

#[async_trait]
impl PlatformProvider for StaticPlatform {
    async fn platform(&self) -> Result<Platform, Error> {
        Ok(self.0.clone())
    }
}

/// Reads the platform from the `cluster` Infrastructure object.
///
/// The platform of a cluster does not change, so the first successful lookup is cached for the
/// lifetime of this provider. A missing Infrastructure object means the cluster is not OpenShift,
/// which is reported as [`Platform::None`].
pub struct InfrastructurePlatform {
    client: KubeClient,
    cached: OnceCell<Platform>,
}

impl InfrastructurePlatform {
    pub fn new(client: KubeClient) -> Self {
        Self {
            client,
            cached: OnceCell::new(),
        }
    }

    async fn fetch(&self) -> Result<Platform, Error> {
        let api: Api<Infrastructure> = Api::all(self.client.clone());
        let infrastructure = api
            .get_opt(INFRASTRUCTURE_NAME)
            .await
            .context(GetInfrastructureSnafu {
                name: INFRASTRUCTURE_NAME,
            })?;

        let platform = match infrastructure {
            Some(infrastructure) => infrastructure
                .platform_type()
                .map_or(Platform::None, |platform| {
                    platform
                        .parse()
                        .unwrap_or_else(|_| Platform::Other(platform.to_string()))
                }),
            None => {
                tracing::debug!("no Infrastructure object found, assuming a non-OpenShift cluster");
                Platform::None
            }
        };
        tracing::info!(%platform, "detected cluster platform");

        Ok(platform)
    }
}

impl std::fmt::Debug for InfrastructurePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfrastructurePlatform")
            .field("cached", &self.cached.get())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PlatformProvider for InfrastructurePlatform {
    async fn platform(&self) -> Result<Platform, Error> {
        self.cached
            .get_or_try_init(|| self.fetch())
            .await
            .cloned()
    }
}
