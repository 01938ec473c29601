use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::{User, UserLookup, UserUpdate},
    token::generate_token,
};
use crate::error::{AuthError, StoreError};

lazy_static! {
    // Verified against when the email is unknown so both login failures cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("not-a-real-password").ok();
}

/// Registration, login, session and password-reset logic over a `UserStore`.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` when email or password is empty; nothing is created.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        if email.is_empty() || password.is_empty() {
            debug!("register called without email or password");
            return Ok(None);
        }

        match self.store.find_user_by(UserLookup::Email(email)).await {
            Ok(_) => {
                warn!(email = %email, "email already registered");
                return Err(AuthError::AlreadyExists(email.to_string()));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let hash = hash_password(password).map_err(AuthError::Hash)?;
        // a concurrent register may have won the race since the lookup
        let user = match self.store.add_user(email, &hash).await {
            Ok(u) => u,
            Err(StoreError::Conflict) => {
                warn!(email = %email, "email registered concurrently");
                return Err(AuthError::AlreadyExists(email.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(Some(user))
    }

    /// Unknown email and wrong password both come back as `Ok(false)`.
    #[instrument(skip(self, password))]
    pub async fn valid_login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let user = match self.find(UserLookup::Email(email)).await? {
            Some(u) => u,
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = verify_password(password, dummy);
                }
                warn!(email = %email, "login unknown email");
                return Ok(false);
            }
        };

        let ok = verify_password(password, &user.hashed_password);
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
        }
        Ok(ok)
    }

    /// Starts a new session, replacing any previous one. The password is not
    /// re-checked; call [`AuthService::valid_login`] first.
    #[instrument(skip(self))]
    pub async fn create_session(&self, email: &str) -> Result<Option<String>, AuthError> {
        let Some(user) = self.find(UserLookup::Email(email)).await? else {
            return Ok(None);
        };

        let session_id = generate_token();
        self.store
            .update_user(user.id, UserUpdate::session(Some(session_id.clone())))
            .await?;
        info!(user_id = %user.id, "session created");
        Ok(Some(session_id))
    }

    #[instrument(skip_all)]
    pub async fn get_user_from_session_id(&self, session_id: &str) -> Result<Option<User>, AuthError> {
        if session_id.is_empty() {
            return Ok(None);
        }
        self.find(UserLookup::SessionId(session_id)).await
    }

    /// Clears the session of `user_id`. No-op without an id; idempotent.
    #[instrument(skip(self))]
    pub async fn destroy_session(&self, user_id: Option<Uuid>) -> Result<(), AuthError> {
        let Some(user_id) = user_id.filter(|id| !id.is_nil()) else {
            return Ok(());
        };
        self.store
            .update_user(user_id, UserUpdate::session(None))
            .await?;
        info!(user_id = %user_id, "session destroyed");
        Ok(())
    }

    /// Issues a reset token for `email`, replacing any pending one.
    #[instrument(skip(self))]
    pub async fn get_reset_password_token(&self, email: &str) -> Result<String, AuthError> {
        let user = self
            .find(UserLookup::Email(email))
            .await?
            .ok_or(AuthError::NoSuchUser)?;

        let token = generate_token();
        self.store
            .update_user(user.id, UserUpdate::reset_token(Some(token.clone())))
            .await?;
        info!(user_id = %user.id, "reset token issued");
        Ok(token)
    }

    /// Consumes `reset_token` and sets the new password in a single write.
    #[instrument(skip_all)]
    pub async fn update_password(&self, reset_token: &str, password: &str) -> Result<(), AuthError> {
        if reset_token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let user = self
            .find(UserLookup::ResetToken(reset_token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let hash = hash_password(password).map_err(AuthError::Hash)?;
        self.store
            .update_user(user.id, UserUpdate::password_reset(hash))
            .await?;
        info!(user_id = %user.id, "password updated");
        Ok(())
    }

    async fn find(&self, lookup: UserLookup<'_>) -> Result<Option<User>, AuthError> {
        match self.store.find_user_by(lookup).await {
            Ok(u) => Ok(Some(u)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
