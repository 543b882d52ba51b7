#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use argon2::Params;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use fallsense_web::{
    auth::Authenticator,
    config::Config,
    rest,
    store::{self, UserStore},
    AppState,
};
use tower::ServiceExt;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("fallsense_web=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub async fn memory_store() -> UserStore {
    setup_tracing();
    let pool = store::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite");
    let store = UserStore::new(pool);
    store.migrate().await.expect("Failed to create users table");
    store
}

/// Argon2id with the smallest permitted cost so tests stay fast.
pub fn cheap_params() -> Params {
    Params::new(Params::MIN_M_COST, 1, 1, None).unwrap()
}

pub async fn authenticator() -> Authenticator {
    Authenticator::with_params(memory_store().await, cheap_params())
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        session_ttl: Duration::from_secs(600),
        ..Config::default()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let state = AppState::new(authenticator().await, test_config());
        let router = rest::router(state.clone());
        Self { state, router }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        self.post_as(path, "application/x-www-form-urlencoded", form, cookie)
            .await
    }

    pub async fn post_as(
        &self,
        path: &str,
        content_type: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }
}

/// The `name=value` pair of the `Set-Cookie` header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    set_cookie.split(';').next().map(|pair| pair.trim().to_string())
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION)?.to_str().ok()
}

pub fn assert_redirect(response: &Response<Body>, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), Some(to));
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
