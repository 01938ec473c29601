use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // argon2 PHC string, not exposed in JSON
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    pub created_at: OffsetDateTime,
}

/// The single criterion a lookup filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup<'a> {
    Email(&'a str),
    SessionId(&'a str),
    ResetToken(&'a str),
}

impl UserLookup<'_> {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            UserLookup::Email(_) => "email",
            UserLookup::SessionId(_) => "session_id",
            UserLookup::ResetToken(_) => "reset_token",
        }
    }

    pub(crate) fn value(&self) -> &str {
        match self {
            UserLookup::Email(v) | UserLookup::SessionId(v) | UserLookup::ResetToken(v) => v,
        }
    }

    pub(crate) fn matches(&self, user: &User) -> bool {
        match *self {
            UserLookup::Email(email) => user.email == email,
            UserLookup::SessionId(sid) => user.session_id.as_deref() == Some(sid),
            UserLookup::ResetToken(token) => user.reset_token.as_deref() == Some(token),
        }
    }
}

/// Partial update of a user record.
///
/// For the optional columns the outer `Option` says whether to touch the
/// field at all; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub hashed_password: Option<String>,
    pub session_id: Option<Option<String>>,
    pub reset_token: Option<Option<String>>,
}

impl UserUpdate {
    pub fn session(session_id: Option<String>) -> Self {
        Self {
            session_id: Some(session_id),
            ..Self::default()
        }
    }

    pub fn reset_token(token: Option<String>) -> Self {
        Self {
            reset_token: Some(token),
            ..Self::default()
        }
    }

    /// New password hash with the reset token consumed in the same write.
    pub fn password_reset(hashed_password: String) -> Self {
        Self {
            hashed_password: Some(hashed_password),
            reset_token: Some(None),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, user: &mut User) {
        if let Some(hash) = self.hashed_password {
            user.hashed_password = hash;
        }
        if let Some(sid) = self.session_id {
            user.session_id = sid;
        }
        if let Some(token) = self.reset_token {
            user.reset_token = token;
        }
    }
}
