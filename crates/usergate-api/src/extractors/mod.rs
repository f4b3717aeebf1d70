//! Custom Axum extractors.

pub mod auth;
pub mod body;
pub mod path;

pub use auth::{AuthUser, Ctx};
pub use body::JsonBody;
pub use path::UserId;
