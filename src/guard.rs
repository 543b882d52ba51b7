use axum::response::{IntoResponse, Redirect, Response};

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

/// Decides whether `session` may see a protected view.
pub fn authorize(session: &Session) -> Access {
    if session.is_logged_in() {
        Access::Allow
    } else {
        Access::Redirect(LOGIN_PATH)
    }
}

impl Access {
    /// `None` when allowed, otherwise the redirect to send instead of the view.
    pub fn into_redirect(self) -> Option<Response> {
        match self {
            Access::Allow => None,
            Access::Redirect(to) => Some(Redirect::to(to).into_response()),
        }
    }
}
