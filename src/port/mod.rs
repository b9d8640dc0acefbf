//! Ports - the narrow boundaries to external collaborators

pub mod cluster;
pub mod directory;
pub mod network;
pub mod store;

pub use cluster::*;
pub use directory::*;
pub use network::*;
pub use store::*;
