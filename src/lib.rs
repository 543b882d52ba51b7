pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod rest;
pub mod session;
pub mod store;
pub mod views;

use auth::Authenticator;
use config::Config;
use session::SessionManager;

#[derive(Clone, Debug)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    pub fn new(authenticator: Authenticator, config: Config) -> Self {
        Self {
            sessions: SessionManager::new(config.session_ttl),
            authenticator,
            config,
        }
    }
}
