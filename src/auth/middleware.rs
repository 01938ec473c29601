use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::auth::extractors::{forbidden, session_cookie};
use crate::state::AppState;

/// Rejects requests to non-excluded paths that carry no valid session.
///
/// On success the resolved `User` is stored in the request extensions for
/// `SessionUser` to pick up.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !state.excluded.requires_auth(Some(req.uri().path())) {
        return next.run(req).await;
    }

    let session_id = match session_cookie(req.headers(), &state.config.session_cookie) {
        Some(sid) => sid.to_owned(),
        None => {
            warn!(path = %req.uri().path(), "session required");
            return forbidden();
        }
    };

    match state.auth.get_user_from_session_id(&session_id).await {
        Ok(Some(user)) => {
            debug!(user_id = %user.id, "session resolved");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => {
            warn!(path = %req.uri().path(), "invalid session");
            forbidden()
        }
        Err(e) => e.into_response(),
    }
}
