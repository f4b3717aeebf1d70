//! Shared request-level types.

pub mod redact;
pub mod request;

pub use redact::redact_client;
pub use request::RequestMetadata;
