pub mod builder;
pub mod cli;
pub mod client;
pub mod constants;
pub mod crd;
pub mod defaults;
pub mod logging;
pub mod namespace;
pub mod objectstore;
pub mod platform;
pub mod strategy;

// Internal re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
