//! Custom resources read and written by the operator.

mod ceph_object_store;
mod infrastructure;
mod storage_cluster;

pub use ceph_object_store::*;
pub use infrastructure::*;
pub use storage_cluster::*;
