//! Session issuance for authenticated members.
//!
//! A session is an opaque random token handed to the client in an `HttpOnly`
//! cookie. Only the SHA-256 hash of the token is stored; never compare raw
//! tokens against the database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::{header::InvalidHeaderValue, HeaderValue};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::Instrument;

use super::store::User;

pub const SESSION_COOKIE_NAME: &str = "libris_session";

/// Proof of authentication. The raw token only exists to be set as a cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub ttl_seconds: i64,
}

/// Opaque session-subsystem failure. Callers only observe issue/fail.
#[derive(Debug)]
pub struct SessionError(anyhow::Error);

impl SessionError {
    pub fn new(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session error: {}", self.0)
    }
}

impl std::error::Error for SessionError {}

#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn issue(&self, user: &User) -> Result<Session, SessionError>;
}

pub struct PgSessionIssuer {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgSessionIssuer {
    #[must_use]
    pub fn new(pool: PgPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }
}

#[async_trait]
impl SessionIssuer for PgSessionIssuer {
    async fn issue(&self, user: &User) -> Result<Session, SessionError> {
        let token = generate_session_token().map_err(SessionError::new)?;
        let token_hash = hash_session_token(&token);

        let query = r"
        INSERT INTO sessions
            (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user.id)
            .bind(&token_hash)
            .bind(self.ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session")
            .map_err(SessionError::new)?;

        Ok(Session {
            token,
            ttl_seconds: self.ttl_seconds,
        })
    }
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the database stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never touch the database.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Build a secure `HttpOnly` cookie for the session token.
pub fn session_cookie(session: &Session) -> Result<HeaderValue, InvalidHeaderValue> {
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.token, session.ttl_seconds
    );
    HeaderValue::from_str(&cookie)
}
