//! Domain - identities, values, descriptors and the type registry

pub mod constant;
pub mod descriptor;
pub mod error;
pub mod id;
pub mod registry;
pub mod session;
pub mod task;
pub mod value;

pub use descriptor::*;
pub use error::*;
pub use id::*;
pub use registry::*;
pub use session::*;
pub use task::*;
pub use value::*;
