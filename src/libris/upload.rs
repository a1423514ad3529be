//! Upload authorization for the external image host.
//!
//! The registration form uploads the member's ID-card image straight to the
//! image host before submitting; the host only accepts uploads carrying
//! parameters signed with a private key that must never reach the client.
//! Every call mints a fresh, time-boxed parameter set. The bridge is
//! stateless and reentrant.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Single-use signed parameters for one upload session.
#[derive(ToSchema, Serialize, Debug, Clone)]
pub struct UploadAuthorization {
    pub token: String,
    pub expire: i64,
    pub signature: String,
}

/// The external store's key-derivation call failed; the endpoint reports a
/// generic server error and never crashes.
#[derive(Debug)]
pub struct AuthorizationError(anyhow::Error);

impl AuthorizationError {
    pub fn new(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "authorization unavailable: {}", self.0)
    }
}

impl std::error::Error for AuthorizationError {}

/// Capability to obtain a signed upload authorization. Injected so handlers
/// never depend on a concrete image-host SDK.
pub trait AuthorizationProvider: Send + Sync {
    /// Mint fresh upload parameters, scoped to one upload session.
    ///
    /// # Errors
    /// Fails with [`AuthorizationError`] when the signing call fails.
    fn authorize(&self) -> Result<UploadAuthorization, AuthorizationError>;
}

/// Signs upload parameters locally with the image host's private key:
/// a fresh token, an absolute expiry, and an HMAC-SHA256 signature over
/// token + expire.
pub struct HmacAuthorizationProvider {
    private_key: SecretString,
    ttl_seconds: u64,
}

impl HmacAuthorizationProvider {
    #[must_use]
    pub fn new(private_key: SecretString, ttl_seconds: u64) -> Self {
        Self {
            private_key,
            ttl_seconds,
        }
    }
}

impl AuthorizationProvider for HmacAuthorizationProvider {
    fn authorize(&self) -> Result<UploadAuthorization, AuthorizationError> {
        let token = Uuid::new_v4().to_string();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let expire = Utc::now().timestamp().saturating_add(ttl);

        let mut mac = HmacSha256::new_from_slice(self.private_key.expose_secret().as_bytes())
            .map_err(|err| AuthorizationError::new(anyhow::anyhow!("invalid signing key: {err}")))?;
        mac.update(token.as_bytes());
        mac.update(expire.to_string().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(UploadAuthorization {
            token,
            expire,
            signature,
        })
    }
}
