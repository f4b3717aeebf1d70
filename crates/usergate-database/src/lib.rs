//! # usergate-database
//!
//! The user store collaborator consumed by the API handlers: the
//! [`UserStore`] trait, an in-memory implementation, and a PostgreSQL
//! repository with its connection pool and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryUserStore;
pub use repositories::user::PgUserStore;
pub use store::{NewUser, UserStore};
