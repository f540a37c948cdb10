//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] street_bite_core::EmailError),

    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password too short.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The service rejected the email/password pair.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The service refused the request with a message (e.g. email taken).
    #[error("{0}")]
    Rejected(String),

    /// No token is stored for this session.
    #[error("not signed in")]
    NotAuthenticated,

    /// Vendor service failure.
    #[error("vendor service error: {0}")]
    Api(ApiError),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(message) => Self::InvalidCredentials(message),
            ApiError::Status { message, .. } => Self::Rejected(message),
            other => Self::Api(other),
        }
    }
}

impl AuthError {
    /// Message shown on the login/register forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::MissingField(_)
            | Self::WeakPassword(_)
            | Self::PasswordMismatch
            | Self::InvalidCredentials(_)
            | Self::Rejected(_) => self.short_message(),
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
            Self::Api(api) => api.user_message(),
            Self::Session(_) => "Your session could not be saved. Please try again.".to_string(),
        }
    }

    fn short_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("{field} is required"),
            Self::WeakPassword(msg) | Self::InvalidCredentials(msg) | Self::Rejected(msg) => {
                msg.clone()
            }
            Self::PasswordMismatch => "Passwords do not match".to_string(),
            _ => self.to_string(),
        }
    }
}
