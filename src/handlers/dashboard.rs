use axum::response::{IntoResponse, Redirect, Response};

use crate::{guard, session::CurrentSession, views};

pub async fn dashboard(current: CurrentSession) -> Response {
    if let Some(redirect) = guard::authorize(&current.session).into_redirect() {
        return redirect;
    }

    let username = current.session.username().unwrap_or_default();
    views::dashboard_page(username).into_response()
}

pub async fn index(current: CurrentSession) -> Redirect {
    match guard::authorize(&current.session) {
        guard::Access::Allow => Redirect::to(guard::DASHBOARD_PATH),
        guard::Access::Redirect(to) => Redirect::to(to),
    }
}
