//! Adapters - collaborator implementations

pub mod directory;
pub mod local_cluster;
pub mod network;
pub mod object_store;

pub use directory::*;
pub use local_cluster::*;
pub use network::*;
pub use object_store::*;
