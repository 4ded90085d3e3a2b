// File: crewdeck-auth/src/provider.rs
// Purpose: Identity provider trait, sessions, and the local provider

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crewdeck::validation::validators;
use crewdeck::AuthError;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

/// External identity provider abstraction
///
/// Session state changes are observable through `watch_session`, which
/// delivers the current session or `None` on every sign-in/sign-out.
/// Every error leaves session state unchanged.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self);

    /// Observe session changes; the receiver holds the current value
    fn watch_session(&self) -> watch::Receiver<Option<Session>>;
}

struct StoredUser {
    user_id: String,
    password: String,
}

/// In-process identity provider for tests and local sessions
///
/// Credentials are held in memory only and disappear with the process.
pub struct LocalProvider {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
    session_tx: watch::Sender<Option<Session>>,
    min_password_len: usize,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::with_min_password_len(6)
    }

    pub fn with_min_password_len(min_password_len: usize) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            session_tx,
            min_password_len,
        }
    }

    pub fn from_config(config: &crewdeck::Config) -> Self {
        Self::with_min_password_len(config.auth.min_password_len)
    }

    /// Current session, if signed in
    pub fn current_session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let users = self.users.read().await;
        let user = users.get(email).ok_or(AuthError::InvalidCredentials)?;

        if user.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            user_id: user.user_id.clone(),
            email: email.to_string(),
        };
        let _ = self.session_tx.send(Some(session.clone()));
        tracing::debug!(email, "signed in");

        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if !validators::is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if validators::validate_password(password, self.min_password_len).is_err() {
            return Err(AuthError::WeakPassword {
                min_len: self.min_password_len,
            });
        }

        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }

        let user_id = Uuid::new_v4().to_string();
        users.insert(
            email.to_string(),
            StoredUser {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );

        let session = Session {
            user_id,
            email: email.to_string(),
        };
        let _ = self.session_tx.send(Some(session.clone()));
        tracing::debug!(email, "account created");

        Ok(session)
    }

    async fn sign_out(&self) {
        let _ = self.session_tx.send(None);
        tracing::debug!("signed out");
    }

    fn watch_session(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }
}
