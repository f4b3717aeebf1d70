//! User domain entities.

pub mod model;
pub mod role;

pub use model::{UserPatch, UserRecord};
pub use role::Role;
