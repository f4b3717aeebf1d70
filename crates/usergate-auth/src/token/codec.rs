//! Token signing and verification.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use usergate_core::config::AuthConfig;
use usergate_core::error::AppError;
use usergate_entity::Identity;

use super::claims::TokenClaims;

/// A freshly issued credential.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Credential {
    /// Signed token string.
    pub token: String,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and verifies identity tokens (HS256).
///
/// Keys are held in a keyring indexed by key id. Issued tokens name the
/// active key in their `kid` header; verification selects the key by `kid`
/// and falls back to the active key when the header has none.
#[derive(Clone)]
pub struct TokenCodec {
    active_kid: String,
    keys: HashMap<String, KeyMaterial>,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kids: Vec<&String> = self.keys.keys().collect();
        kids.sort();
        f.debug_struct("TokenCodec")
            .field("active_kid", &self.active_kid)
            .field("kids", &kids)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec with the single key from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut keys = HashMap::new();
        keys.insert(
            config.token_key_id.clone(),
            key_material(config.token_secret.as_bytes()),
        );
        Self {
            active_kid: config.token_key_id.clone(),
            keys,
            validation: strict_validation(),
        }
    }

    /// Creates a codec from an explicit keyring.
    ///
    /// Fails with `Misconfigured` when the active key id is not in the keyring.
    pub fn with_keys<I, K, S>(active_kid: &str, keys: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<[u8]>,
    {
        let keys: HashMap<String, KeyMaterial> = keys
            .into_iter()
            .map(|(kid, secret)| (kid.into(), key_material(secret.as_ref())))
            .collect();

        if !keys.contains_key(active_kid) {
            return Err(AppError::misconfigured(format!(
                "Active signing key '{active_kid}' is not in the keyring"
            )));
        }

        Ok(Self {
            active_kid: active_kid.to_string(),
            keys,
            validation: strict_validation(),
        })
    }

    /// Issues a credential for the identity, valid for `ttl`.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<Credential, AppError> {
        if ttl.is_zero() {
            return Err(AppError::validation("Token TTL must be positive"));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::validation(format!("Token TTL out of range: {e}")))?;

        let issued_at = Utc::now();
        let expires_at = issued_at + ttl;
        let claims = TokenClaims::for_identity(identity, issued_at, expires_at);
        let token = self.encode_claims(&claims)?;

        Ok(Credential {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Signs arbitrary claims with the active key.
    pub fn encode_claims(&self, claims: &TokenClaims) -> Result<String, AppError> {
        let key = self
            .keys
            .get(&self.active_kid)
            .ok_or_else(|| AppError::misconfigured("Active signing key missing"))?;

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.active_kid.clone());

        encode(&header, claims, &key.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Verifies a token and returns the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        self.decode_claims(token).map(|claims| claims.identity())
    }

    /// Verifies a token and returns its full claims.
    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| AppError::invalid_token("Invalid token format"))?;

        let kid = header.kid.as_deref().unwrap_or(self.active_kid.as_str());
        let key = self
            .keys
            .get(kid)
            .ok_or_else(|| AppError::invalid_token(format!("Unknown signing key '{kid}'")))?;

        let data = decode::<TokenClaims>(token, &key.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::invalid_token("Token has expired"),
                JwtErrorKind::InvalidSignature => {
                    AppError::invalid_token("Invalid token signature")
                }
                JwtErrorKind::Json(_) => AppError::invalid_token("Malformed token payload"),
                _ => AppError::invalid_token(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(data.claims)
    }
}

fn key_material(secret: &[u8]) -> KeyMaterial {
    KeyMaterial {
        encoding: EncodingKey::from_secret(secret),
        decoding: DecodingKey::from_secret(secret),
    }
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}
