//! # usergate-entity
//!
//! Domain entities shared by every UserGate crate.

pub mod identity;
pub mod user;

pub use identity::Identity;
pub use user::{Role, UserPatch, UserRecord};
