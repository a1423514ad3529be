//! Durable store for member identity records.
//!
//! The `users` UNIQUE constraint on `email` is the authoritative guard against
//! duplicate registrations; the service's pre-check only short-circuits the
//! common case. Email matching is exact byte equality, as the membership forms
//! submit it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// A stored member identity record.
///
/// `university_card` is an opaque reference to an externally stored image;
/// the external host owns the binary, and the reference is never checked for
/// reachability here.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub university_id: String,
    pub university_card: String,
}

/// Fields for a record about to be inserted. Carries the password hash,
/// never the plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub university_id: String,
    pub university_card: String,
}

/// Insert failures, with unique-constraint violations kept distinguishable
/// so racing registrations surface as a duplicate rather than a generic
/// database error.
#[derive(Debug)]
pub enum InsertError {
    Duplicate,
    Other(anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn insert(&self, user: NewUser) -> Result<User, InsertError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = "SELECT id, email, full_name, password_hash, university_id, university_card \
                     FROM users WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            password_hash: row.get("password_hash"),
            university_id: row.get("university_id"),
            university_card: row.get("university_card"),
        }))
    }

    async fn insert(&self, user: NewUser) -> Result<User, InsertError> {
        let query = r"
        INSERT INTO users
            (email, full_name, password_hash, university_id, university_card)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.password_hash)
            .bind(&user.university_id)
            .bind(&user.university_card)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(User {
                id: row.get("id"),
                email: user.email,
                full_name: user.full_name,
                password_hash: user.password_hash,
                university_id: user.university_id,
                university_card: user.university_card,
            }),
            Err(err) if is_unique_violation(&err) => Err(InsertError::Duplicate),
            Err(err) => Err(InsertError::Other(
                anyhow::Error::new(err).context("failed to insert user"),
            )),
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
