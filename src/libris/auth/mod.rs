//! Registration and sign-in orchestration.
//!
//! Both flows are stateless units of work over two injected capabilities: the
//! [`UserStore`] holding member records and the [`SessionIssuer`] minting
//! authenticated sessions. Failure causes stay tagged here and are collapsed
//! to the flat success/failure shape at the HTTP boundary.

use std::sync::Arc;
use tracing::{debug, error};

pub mod password;
pub mod session;
pub mod store;

use session::{Session, SessionError, SessionIssuer};
use store::{InsertError, NewUser, User, UserStore};

/// Registration input as submitted by the membership form. The
/// `university_card` value is the path returned by the upload widget, stored
/// verbatim.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub university_id: String,
    pub university_card: String,
}

/// Transient sign-in credentials; never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful registration: the durable record plus the session opened for it.
#[derive(Debug)]
pub struct Registration {
    pub user: User,
    pub session: Session,
}

#[derive(Debug)]
pub enum RegisterError {
    /// A record with this email already exists, either found by the pre-check
    /// or reported by the store's unique constraint on a racing insert.
    DuplicateEmail,
    Persistence(anyhow::Error),
    /// The user record was created but no session could be opened. The record
    /// is not rolled back; the caller sees a generic failure.
    Session(SessionError),
}

#[derive(Debug)]
pub enum SignInError {
    /// Unknown email or wrong password; indistinguishable to the caller.
    InvalidCredentials,
    Session(SessionError),
    Unknown(anyhow::Error),
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionIssuer>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, sessions: Arc<dyn SessionIssuer>) -> Self {
        Self { store, sessions }
    }

    /// Register a new member and open a session for the account.
    ///
    /// The email pre-check avoids hashing when the address is taken, but the
    /// store's unique constraint is the source of truth under concurrent
    /// registrations: a unique violation on insert also surfaces as
    /// [`RegisterError::DuplicateEmail`].
    ///
    /// # Errors
    /// See [`RegisterError`].
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, RegisterError> {
        let existing = self
            .store
            .find_by_email(&request.email)
            .await
            .map_err(RegisterError::Persistence)?;

        if existing.is_some() {
            debug!("Registration rejected, email already taken");
            return Err(RegisterError::DuplicateEmail);
        }

        let password_hash =
            password::hash(&request.password).map_err(RegisterError::Persistence)?;

        let user = self
            .store
            .insert(NewUser {
                email: request.email,
                full_name: request.full_name,
                password_hash,
                university_id: request.university_id,
                university_card: request.university_card,
            })
            .await
            .map_err(|err| match err {
                InsertError::Duplicate => RegisterError::DuplicateEmail,
                InsertError::Other(err) => RegisterError::Persistence(err),
            })?;

        // Second phase: the record is durable at this point. A session
        // failure leaves it in place and fails the registration as a whole.
        match self.sessions.issue(&user).await {
            Ok(session) => Ok(Registration { user, session }),
            Err(err) => {
                error!(
                    user_created = true,
                    session_created = false,
                    "Session issuance failed after registration: {err}"
                );
                Err(RegisterError::Session(err))
            }
        }
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// See [`SignInError`]; the HTTP boundary collapses all variants into one
    /// generic failure.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SignInError> {
        let user = match self.store.find_by_email(&credentials.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("Sign in rejected, unknown email");
                return Err(SignInError::InvalidCredentials);
            }
            Err(err) => return Err(SignInError::Unknown(err)),
        };

        match password::verify(&credentials.password, &user.password_hash) {
            Ok(true) => (),
            Ok(false) => {
                debug!("Sign in rejected, wrong password");
                return Err(SignInError::InvalidCredentials);
            }
            Err(err) => return Err(SignInError::Unknown(err)),
        }

        self.sessions.issue(&user).await.map_err(SignInError::Session)
    }
}

#[cfg(test)]
pub(crate) mod test_support;
