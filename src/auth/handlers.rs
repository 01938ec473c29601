use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            CredentialsForm, MessageResponse, ProfileResponse, ResetRequestForm,
            ResetTokenResponse, UpdatePasswordForm,
        },
        extractors::{forbidden, session_cookie, SessionUser},
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/sessions", post(login).delete(logout))
        .route("/reset_password", post(reset_token).put(update_password))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AuthError> {
    match state.auth.register(&form.email, &form.password).await? {
        Some(user) => Ok(Json(MessageResponse {
            email: user.email,
            message: "user created".into(),
        })
        .into_response()),
        None => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "email and password are required" })),
        )
            .into_response()),
    }
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AuthError> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid credentials" })),
        )
            .into_response()
    };

    if !state.auth.valid_login(&form.email, &form.password).await? {
        return Ok(unauthorized());
    }
    let Some(session_id) = state.auth.create_session(&form.email).await? else {
        return Ok(unauthorized());
    };

    let cookie = format!(
        "{}={}; Path=/; HttpOnly",
        state.config.session_cookie, session_id
    );
    info!("user logged in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            email: form.email,
            message: "logged in".into(),
        }),
    )
        .into_response())
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AuthError> {
    let Some(session_id) = session_cookie(&headers, &state.config.session_cookie) else {
        warn!("logout without session cookie");
        return Ok(forbidden());
    };
    let Some(user) = state.auth.get_user_from_session_id(session_id).await? else {
        warn!("logout with unknown session");
        return Ok(forbidden());
    };

    state.auth.destroy_session(Some(user.id)).await?;
    let expired = format!(
        "{}=; Path=/; HttpOnly; Max-Age=0",
        state.config.session_cookie
    );
    Ok(([(SET_COOKIE, expired)], Redirect::to("/")).into_response())
}

#[instrument(skip_all)]
pub async fn profile(SessionUser(user): SessionUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { email: user.email })
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn reset_token(
    State(state): State<AppState>,
    Form(form): Form<ResetRequestForm>,
) -> Result<Json<ResetTokenResponse>, AuthError> {
    let reset_token = state.auth.get_reset_password_token(&form.email).await?;
    Ok(Json(ResetTokenResponse {
        email: form.email,
        reset_token,
    }))
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn update_password(
    State(state): State<AppState>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<MessageResponse>, AuthError> {
    state
        .auth
        .update_password(&form.reset_token, &form.new_password)
        .await?;
    Ok(Json(MessageResponse {
        email: form.email,
        message: "Password updated".into(),
    }))
}
