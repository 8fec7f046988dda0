//! This module contains builders for Kubernetes object metadata.

pub mod meta;
