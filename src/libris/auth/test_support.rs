//! In-memory fakes of the store and session issuer for tests.

use super::session::{generate_session_token, Session, SessionError, SessionIssuer};
use super::store::{InsertError, NewUser, User, UserStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory store enforcing email uniqueness at insert, like the database
/// constraint does.
#[derive(Default)]
pub(crate) struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub(crate) fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, InsertError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(InsertError::Duplicate);
        }
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            full_name: user.full_name,
            password_hash: user.password_hash,
            university_id: user.university_id,
            university_card: user.university_card,
        };
        users.insert(user.email, stored.clone());
        Ok(stored)
    }
}

/// Store whose pre-check lookup never finds anything, so concurrent
/// registrations always reach the insert and the uniqueness guard decides.
pub(crate) struct BlindLookupStore {
    pub(crate) inner: Arc<MemoryUserStore>,
}

#[async_trait]
impl UserStore for BlindLookupStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Ok(None)
    }

    async fn insert(&self, user: NewUser) -> Result<User, InsertError> {
        self.inner.insert(user).await
    }
}

/// Store whose inserts always fail with a non-duplicate database error.
pub(crate) struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Ok(None)
    }

    async fn insert(&self, _user: NewUser) -> Result<User, InsertError> {
        Err(InsertError::Other(anyhow!("connection reset")))
    }
}

pub(crate) struct MemorySessionIssuer;

#[async_trait]
impl SessionIssuer for MemorySessionIssuer {
    async fn issue(&self, _user: &User) -> Result<Session, SessionError> {
        let token = generate_session_token().map_err(SessionError::new)?;
        Ok(Session {
            token,
            ttl_seconds: 3600,
        })
    }
}

pub(crate) struct FailingSessionIssuer;

#[async_trait]
impl SessionIssuer for FailingSessionIssuer {
    async fn issue(&self, _user: &User) -> Result<Session, SessionError> {
        Err(SessionError::new(anyhow!("session backend down")))
    }
}
