use serde::{Deserialize, Serialize};

/// Form body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for requesting a reset token.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    #[serde(default)]
    pub email: String,
}

/// Form body for consuming a reset token.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub reset_token: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
}
