//! # usergate-core
//!
//! Core crate for UserGate. Contains configuration schemas, request
//! metadata types, client-identifier redaction, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other UserGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
