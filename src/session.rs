//! Per-client authentication state.
//!
//! A client is identified by an opaque [`SessionId`] carried in the
//! `fallsense_session` cookie. Only authenticated sessions are stored; a client
//! without a known id is in the anonymous session.

use std::{
    convert::Infallible,
    fmt,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use cookie::{Cookie, SameSite};
use dashmap::DashMap;
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "fallsense_session";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    logged_in: bool,
    username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            username: Some(username.into()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self)
    }
}

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Process-wide table of live sessions with an idle timeout.
#[derive(Clone, Debug)]
pub struct SessionManager {
    sessions: Arc<DashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Stores `session` under a fresh id. Any `previous` id is dropped so a
    /// pre-login identifier never becomes authenticated.
    pub fn establish(&self, previous: Option<SessionId>, session: Session) -> SessionId {
        if let Some(previous) = previous {
            self.sessions.remove(&previous);
        }

        let id = SessionId::new();
        self.sessions.insert(
            id,
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<Session> {
        let now = Instant::now();
        let session = {
            let mut entry = self.sessions.get_mut(id)?;
            if now.duration_since(entry.last_seen) >= self.ttl {
                None
            } else {
                entry.last_seen = now;
                Some(entry.session.clone())
            }
        };

        if session.is_none() {
            tracing::debug!("Session expired");
            self.sessions.remove(id);
        }
        session
    }

    pub fn destroy(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns a task that drops expired sessions every `period`.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let purged = manager.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired sessions");
                }
            }
        })
    }
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .and_then(|c| c.value().parse().ok())
}

/// Browser-session cookie without `Max-Age`; expiry is the server-side idle TTL.
pub fn session_cookie(id: SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

/// The caller's session, resolved from the request cookie.
#[derive(Clone, Debug)]
pub struct CurrentSession {
    pub id: Option<SessionId>,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let resolved = session_id_from_headers(&parts.headers)
            .and_then(|id| state.sessions.get(&id).map(|session| (id, session)));

        Ok(match resolved {
            Some((id, session)) => CurrentSession {
                id: Some(id),
                session,
            },
            None => CurrentSession {
                id: None,
                session: Session::anonymous(),
            },
        })
    }
}
