use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::views::{self, Notice};

const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable, please try again later.";
const UNREADABLE_FORM_MESSAGE: &str = "The form could not be read. Please try again.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("credential store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(inner: sqlx::Error) -> Self {
        // The UNIQUE constraint on users.username is the authority for collisions
        if let Some(db_err) = inner.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::UsernameTaken;
            }
        }
        StoreError::Unavailable(inner)
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username and password are required")]
    MissingField,
    #[error("password and confirmation differ")]
    PasswordMismatch,
    #[error("username already taken")]
    UsernameTaken,
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error("password hashing failed")]
    Internal,
}

impl From<StoreError> for RegisterError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::UsernameTaken => RegisterError::UsernameTaken,
            StoreError::Unavailable(e) => RegisterError::StoreUnavailable(e),
        }
    }
}

impl RegisterError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegisterError::MissingField | RegisterError::PasswordMismatch => StatusCode::BAD_REQUEST,
            RegisterError::UsernameTaken => StatusCode::CONFLICT,
            RegisterError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegisterError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            RegisterError::MissingField => "Username and password are required.",
            RegisterError::PasswordMismatch => "Password and confirmation do not match.",
            RegisterError::UsernameTaken => {
                "That username is already registered. Please choose another."
            }
            RegisterError::StoreUnavailable(_) | RegisterError::Internal => UNAVAILABLE_MESSAGE,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("username and password are required")]
    MissingField,
    #[error("no such user")]
    UserNotFound,
    #[error("password does not verify")]
    InvalidPassword,
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error("password verification failed")]
    Internal,
}

impl From<StoreError> for LoginError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::Unavailable(e) => LoginError::StoreUnavailable(e),
            StoreError::UsernameTaken => LoginError::Internal,
        }
    }
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoginError::MissingField => StatusCode::BAD_REQUEST,
            LoginError::UserNotFound | LoginError::InvalidPassword => StatusCode::UNAUTHORIZED,
            LoginError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            LoginError::MissingField => "Username and password are required.",
            LoginError::UserNotFound => "Username not found.",
            LoginError::InvalidPassword => "Incorrect password.",
            LoginError::StoreUnavailable(_) | LoginError::Internal => UNAVAILABLE_MESSAGE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Request-boundary error: re-renders the page the form came from.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("unreadable registration form: {0}")]
    RegisterForm(#[source] FormRejection),
    #[error("unreadable login form: {0}")]
    LoginForm(#[source] FormRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Register(e) => {
                match &e {
                    RegisterError::StoreUnavailable(inner) => {
                        tracing::error!(error = %inner, "Registration failed: store unavailable")
                    }
                    RegisterError::Internal => tracing::error!("Registration failed: internal error"),
                    other => tracing::debug!(reason = %other, "Registration rejected"),
                }
                let page = views::register_page(Some(&Notice::error(e.user_message())));
                (e.status(), page).into_response()
            }
            AppError::Login(e) => {
                match &e {
                    LoginError::StoreUnavailable(inner) => {
                        tracing::error!(error = %inner, "Login failed: store unavailable")
                    }
                    LoginError::Internal => tracing::error!("Login failed: internal error"),
                    other => tracing::debug!(reason = %other, "Login rejected"),
                }
                let page = views::login_page(Some(&Notice::error(e.user_message())));
                (e.status(), page).into_response()
            }
            AppError::RegisterForm(rejection) => {
                tracing::debug!(reason = %rejection, "Registration form rejected");
                let page = views::register_page(Some(&Notice::error(UNREADABLE_FORM_MESSAGE)));
                (rejection.status(), page).into_response()
            }
            AppError::LoginForm(rejection) => {
                tracing::debug!(reason = %rejection, "Login form rejected");
                let page = views::login_page(Some(&Notice::error(UNREADABLE_FORM_MESSAGE)));
                (rejection.status(), page).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_never_leak_detail() {
        let err = RegisterError::StoreUnavailable(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);

        let err = LoginError::StoreUnavailable(sqlx::Error::PoolClosed);
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);
        assert!(!err.user_message().contains("pool"));
    }

    #[test]
    fn non_database_errors_are_unavailable() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn auth_failures_map_to_client_statuses() {
        assert_eq!(RegisterError::PasswordMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RegisterError::UsernameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(LoginError::UserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(LoginError::InvalidPassword.status(), StatusCode::UNAUTHORIZED);
    }
}
