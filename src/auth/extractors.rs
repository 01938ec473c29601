use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::auth::repo_types::User;
use crate::state::AppState;

/// Value of cookie `name` across all `Cookie` headers.
pub fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

pub(crate) fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "message": "Forbidden" }))).into_response()
}

/// The user owning the request's session cookie.
///
/// Taken from request extensions when the gating middleware already resolved
/// it, otherwise resolved from the cookie here. Rejects with 403.
pub struct SessionUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(SessionUser(user.clone()));
        }

        let Some(session_id) = session_cookie(&parts.headers, &state.config.session_cookie) else {
            warn!("missing session cookie");
            return Err(forbidden());
        };

        match state.auth.get_user_from_session_id(session_id).await {
            Ok(Some(user)) => Ok(SessionUser(user)),
            Ok(None) => {
                warn!("unknown session id");
                Err(forbidden())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
