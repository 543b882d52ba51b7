use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{LoginError, RegisterError};
use crate::models::user::User;
use crate::session::Session;
use crate::store::UserStore;

pub const ADMIN_USERNAME: &str = "admin";

/// Verifies and records credentials against the [`UserStore`].
#[derive(Clone)]
pub struct Authenticator {
    store: UserStore,
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").field("store", &self.store).finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(store: UserStore) -> Self {
        Self {
            store,
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with explicit cost parameters. Existing hashes still verify
    /// with the parameters embedded in their PHC string.
    pub fn with_params(store: UserStore, params: Params) -> Self {
        Self {
            store,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    #[tracing::instrument(skip(self, password, confirm_password), err(level = "debug"))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, RegisterError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(RegisterError::MissingField);
        }
        if password != confirm_password {
            return Err(RegisterError::PasswordMismatch);
        }

        // Cheap rejection before paying for a hash; the insert below still
        // relies on the UNIQUE constraint when two registrations race.
        if self.store.find_by_username(username).await?.is_some() {
            return Err(RegisterError::UsernameTaken);
        }

        let password_hash = self.hash_password(password).await?;
        let user = self.store.insert(username, &password_hash).await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self, password), err(level = "debug"))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, LoginError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingField);
        }

        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(LoginError::UserNotFound)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::warn!(user_id = user.id, "Login failed: invalid password");
            return Err(LoginError::InvalidPassword);
        }

        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(Session::authenticated(user.username))
    }

    /// Registers `admin` with the given password when the store holds no users yet.
    /// Returns whether a user was created.
    pub async fn seed_admin(&self, password: &str) -> Result<bool, RegisterError> {
        if self.store.count().await? > 0 {
            return Ok(false);
        }

        match self.register(ADMIN_USERNAME, password, password).await {
            Ok(_) => Ok(true),
            // Another instance seeded first
            Err(RegisterError::UsernameTaken) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, RegisterError> {
        let password = password.to_string();
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| {
                    tracing::error!(error = %e, "Password hashing failed");
                    RegisterError::Internal
                })
        })
        .await
        .map_err(|_| RegisterError::Internal)?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, LoginError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash).map_err(|e| {
                tracing::error!(error = %e, "Stored password hash is malformed");
                LoginError::Internal
            })?;
            Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
        })
        .await
        .map_err(|_| LoginError::Internal)?
    }
}
