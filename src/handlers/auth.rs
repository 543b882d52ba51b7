use axum::{
    extract::{rejection::FormRejection, State},
    http::{
        header::{HeaderName, SET_COOKIE},
        StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::{
    error::AppError,
    guard::{DASHBOARD_PATH, LOGIN_PATH},
    models::user::{LoginForm, RegisterForm},
    session::{self, CurrentSession, Session},
    views::{self, Notice},
    AppState,
};

/// Moves the browser from the registration notice on to the login page.
const REGISTERED_REFRESH: &str = "2; url=/login";

pub async fn login_page(current: CurrentSession) -> Response {
    if current.session.is_logged_in() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    views::login_page(None).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(AppError::LoginForm)?;
    let session: Session = state.authenticator.login(&form.username, &form.password).await?;
    let id = state.sessions.establish(current.id, session);

    let cookie = session::session_cookie(id, state.config.cookie_secure);
    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Redirect::to(DASHBOARD_PATH),
    )
        .into_response())
}

pub async fn register_page() -> Response {
    views::register_page(None).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(AppError::RegisterForm)?;
    state
        .authenticator
        .register(&form.username, &form.password, &form.confirm_password)
        .await?;

    let notice = Notice::success("Registration successful. You can now sign in.");
    Ok((
        StatusCode::CREATED,
        [(HeaderName::from_static("refresh"), REGISTERED_REFRESH)],
        views::register_page(Some(&notice)),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> Response {
    if let Some(id) = current.id {
        state.sessions.destroy(&id);
        if let Some(username) = current.session.username() {
            tracing::info!(username, "User logged out");
        }
    }

    let cookie = session::expired_session_cookie(state.config.cookie_secure);
    (
        [(SET_COOKIE, cookie.to_string())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
