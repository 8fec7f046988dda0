//! Command line handling of the operator binary, using the `clap` crate.
//!
//! ```no_run
//! use clap::Parser;
//! use storage_operator::cli;
//!
//! #[derive(clap::Parser)]
//! struct Opts {
//!     #[clap(subcommand)]
//!     command: cli::Command,
//! }
//!
//! let opts = Opts::parse();
//! match opts.command {
//!     cli::Command::Crd => {
//!         // Print CRD objects
//!     }
//!     cli::Command::Run(cli::RunArguments { watch_namespace, .. }) => {
//!         // Run the operator
//!     }
//! }
//! ```

use clap::{Args, Parser};

use crate::{namespace::WatchNamespace, platform::Platform};

pub const DEFAULT_FIELD_MANAGER: &str = "storage-operator";

/// The commands of the operator binary.
///
/// Generic over the arguments of the [`Command::Run`] subcommand, [`RunArguments`] by default.
#[derive(Debug, PartialEq, Eq, Parser)]
pub enum Command<Run: Args = RunArguments> {
    /// Print CRD objects.
    Crd,

    /// Run the operator.
    Run(Run),
}

/// Arguments of the operator when running.
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(long_about = "")]
pub struct RunArguments {
    /// Provides a specific namespace to watch (instead of watching all namespaces)
    #[arg(long, env, default_value = "")]
    pub watch_namespace: WatchNamespace,

    /// Overrides the platform read from the `cluster` Infrastructure object, e.g. `BareMetal`
    #[arg(long, env)]
    pub platform: Option<Platform>,

    /// The field manager recorded on every object the operator writes
    #[arg(long, env, default_value = DEFAULT_FIELD_MANAGER)]
    pub field_manager: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;

        RunArguments::command().print_long_help().unwrap();
        RunArguments::command().debug_assert()
    }

    #[test]
    fn run_arguments() {
        let command = Command::<RunArguments>::parse_from([
            "storage-operator",
            "run",
            "--watch-namespace",
            "openshift-storage",
            "--platform",
            "BareMetal",
        ]);

        assert_eq!(
            command,
            Command::Run(RunArguments {
                watch_namespace: WatchNamespace::One("openshift-storage".to_string()),
                platform: Some(Platform::BareMetal),
                field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            })
        );
    }
}
