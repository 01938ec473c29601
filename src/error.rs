use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures reported by a `UserStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no user matches the lookup")]
    NotFound,

    #[error("a user with that email already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Hard failures of the authentication service.
///
/// Expected negative outcomes (wrong password, unknown session) are not
/// errors; they come back as `Ok(false)` / `Ok(None)`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("no user registered with that email")]
    NoSuchUser,

    #[error("invalid reset token")]
    InvalidToken,

    #[error("password hashing failed: {0}")]
    Hash(anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AuthError::NoSuchUser | AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::Hash(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::AlreadyExists(_) => "email already registered".to_string(),
            AuthError::Hash(_) | AuthError::Store(_) => {
                error!(error = %self, "auth backend failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_failures_map_to_client_statuses() {
        assert_eq!(
            AuthError::AlreadyExists("a@b.io".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::NoSuchUser.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_failures_are_internal() {
        let err = AuthError::from(StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "no user matches the lookup");

        let err = AuthError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
