//! # usergate-auth
//!
//! Authentication and authorization for UserGate.
//!
//! ## Modules
//!
//! - `token`: issuing and verifying signed identity tokens
//! - `context`: the per-request context threaded through every stage
//! - `attach`: credential extraction and non-blocking identity attachment
//! - `gate`: coarse guards (authenticated, role, strict cookie auth)
//! - `policy`: resource-level authorization predicates
//! - `password`: Argon2id password hashing

pub mod attach;
pub mod context;
pub mod gate;
pub mod password;
pub mod policy;
pub mod token;

pub use attach::{CredentialCarrier, IdentityAttacher};
pub use context::{CredentialSource, RequestContext};
pub use gate::RoleGuard;
pub use password::PasswordHasher;
pub use token::{Credential, TokenClaims, TokenCodec};
