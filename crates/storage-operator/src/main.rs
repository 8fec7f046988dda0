use std::{sync::Arc, time::Duration};

use clap::Parser;
use futures::StreamExt;
use kube::{
    CustomResourceExt,
    runtime::{Controller, controller::Action, watcher},
};
use snafu::{ResultExt, Snafu};
use storage_operator::{
    cli::{Command, RunArguments},
    client::Client,
    crd::{CephObjectStore, StorageCluster},
    logging::{self, initialize_logging, report_controller_reconciled},
    objectstore::{self, ensure_ceph_object_stores},
    platform::{InfrastructurePlatform, PlatformProvider, StaticPlatform},
};

const APP_NAME: &str = "storage-operator";
const CONTROLLER_NAME: &str = "storagecluster.ocs.openshift.io";
const LOG_ENV: &str = "STORAGE_OPERATOR_LOG";

/// Delay before a failed reconciliation pass is retried.
const ERROR_REQUEUE_DELAY: Duration = Duration::from_secs(10);

#[derive(clap::Parser)]
#[command(
    name = "Storage Operator",
    author,
    version,
    about = "Reconciles the CephObjectStore owned by a StorageCluster"
)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to serialize CRD"))]
    SerializeCrd { source: serde_yaml::Error },

    #[snafu(display("failed to initialize logging"))]
    InitializeLogging { source: logging::Error },

    #[snafu(display("failed to create Kubernetes client"))]
    CreateClient { source: kube::Error },
}

struct Ctx {
    client: Client,
    platform: Arc<dyn PlatformProvider>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let opts = Opts::parse();
    match opts.command {
        Command::Crd => {
            let crd = serde_yaml::to_string(&StorageCluster::crd()).context(SerializeCrdSnafu)?;
            print!("{crd}");
        }
        Command::Run(RunArguments {
            watch_namespace,
            platform,
            field_manager,
        }) => {
            initialize_logging(LOG_ENV, APP_NAME).context(InitializeLoggingSnafu)?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                ?watch_namespace,
                "starting {APP_NAME}"
            );

            let kube_client = kube::Client::try_default()
                .await
                .context(CreateClientSnafu)?;
            let client = Client::new(kube_client, Some(field_manager));
            let platform: Arc<dyn PlatformProvider> = match platform {
                Some(platform) => {
                    tracing::info!(%platform, "platform detection overridden");
                    Arc::new(StaticPlatform(platform))
                }
                None => Arc::new(InfrastructurePlatform::new(client.as_kube_client())),
            };

            Controller::new(
                watch_namespace.get_api::<StorageCluster>(&client),
                watcher::Config::default(),
            )
            .owns(
                watch_namespace.get_api::<CephObjectStore>(&client),
                watcher::Config::default(),
            )
            .shutdown_on_signal()
            .run(
                reconcile,
                error_policy,
                Arc::new(Ctx {
                    client,
                    platform,
                }),
            )
            .for_each(|result| async move {
                report_controller_reconciled(CONTROLLER_NAME, &result);
            })
            .await;
        }
    }

    Ok(())
}

async fn reconcile(cluster: Arc<StorageCluster>, ctx: Arc<Ctx>) -> objectstore::Result<Action> {
    ensure_ceph_object_stores(&cluster, &ctx.client, ctx.platform.as_ref()).await?;
    Ok(Action::await_change())
}

fn error_policy(_cluster: Arc<StorageCluster>, _error: &objectstore::Error, _ctx: Arc<Ctx>) -> Action {
    Action::requeue(ERROR_REQUEUE_DELAY)
}
