//! Session issuer implementations.
//!
//! The auth boundary is a capability with two interchangeable
//! implementations, selected by configuration: a local credential store
//! (Argon2id hashes, self-issued JWTs) and a delegated GoTrue-compatible
//! provider (signup and password-grant login over HTTP, tokens verified
//! against the provider's shared secret). The ledger only ever sees a
//! verified user id.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use futura_core::auth::{hash_password, verify_password};
use futura_db::UserRepository;
use futura_shared::auth::UserInfo;
use futura_shared::config::{AuthConfig, AuthProvider};
use futura_shared::{AppError, AppResult, JwtConfig, JwtError, JwtService};

/// A successful authentication: a bearer token plus the user it names.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: UserInfo,
}

/// Issues and verifies session credentials.
///
/// Every protected operation starts with `verify`; the rest of the system
/// never depends on which implementation is active.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Registers a new user. The local profile row and the two default
    /// accounts are created as a side effect, in one atomic unit.
    async fn register(&self, email: &str, password: &str) -> AppResult<UserInfo>;

    /// Authenticates by email and password and issues a time-bounded token.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession>;

    /// Verifies a bearer token and returns the user id it names.
    fn verify(&self, token: &str) -> AppResult<Uuid>;

    /// Token validity in seconds.
    fn token_expires_in(&self) -> i64;
}

/// Builds the configured session issuer.
///
/// # Errors
///
/// Returns an error when `provider = "external"` but the external settings
/// block is missing.
pub fn build_session_issuer(
    config: &AuthConfig,
    db: DatabaseConnection,
) -> AppResult<Arc<dyn SessionIssuer>> {
    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt_secret.clone(),
        token_expiry_secs: i64::try_from(config.token_expiry_secs).unwrap_or(i64::MAX),
    });
    let users = UserRepository::new(db);

    match config.provider {
        AuthProvider::Local => Ok(Arc::new(LocalSessionIssuer::new(users, jwt))),
        AuthProvider::External => {
            let external = config.external.clone().ok_or_else(|| {
                AppError::Internal(
                    "auth.external settings are required when provider = \"external\"".to_string(),
                )
            })?;
            Ok(Arc::new(ExternalSessionIssuer::new(
                users,
                jwt,
                external.base_url,
                external.api_key,
            )))
        }
    }
}

// ============================================================================
// Local issuer
// ============================================================================

/// Self-managed credentials: Argon2id hashes in the `users` table, HS256
/// tokens signed with our own secret.
pub struct LocalSessionIssuer {
    users: UserRepository,
    jwt: JwtService,
}

impl LocalSessionIssuer {
    /// Creates a local session issuer.
    #[must_use]
    pub const fn new(users: UserRepository, jwt: JwtService) -> Self {
        Self { users, jwt }
    }
}

#[async_trait]
impl SessionIssuer for LocalSessionIssuer {
    async fn register(&self, email: &str, password: &str) -> AppResult<UserInfo> {
        if self
            .users
            .email_exists(email)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            return Err(AppError::Conflict(
                "a user with this email already exists".to_string(),
            ));
        }

        let password_hash =
            hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;

        // The email_exists check above is advisory only; a racing
        // registration surfaces here as a unique-constraint violation.
        let user = self
            .users
            .create(Uuid::now_v7(), email, Some(&password_hash))
            .await
            .map_err(duplicate_email_error)?;

        info!(user_id = %user.id, "New user registered");
        Ok(UserInfo {
            id: user.id,
            email: user.email,
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(AppError::InvalidCredentials)?;

        // A NULL hash means the credential lives with an external provider;
        // a local login attempt can never match it.
        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;

        let matches = verify_password(password, stored_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .jwt
            .generate_token(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthenticatedSession {
            token,
            user: UserInfo {
                id: user.id,
                email: user.email,
            },
        })
    }

    fn verify(&self, token: &str) -> AppResult<Uuid> {
        self.jwt
            .validate_token(token)
            .map(|claims| claims.user_id())
            .map_err(jwt_to_app_error)
    }

    fn token_expires_in(&self) -> i64 {
        self.jwt.token_expires_in()
    }
}

// ============================================================================
// External issuer
// ============================================================================

/// Delegated credentials: signup and password-grant login go to a
/// GoTrue-compatible provider; tokens are the provider's own, verified
/// against its shared HS256 secret. The local `users` row holds profile
/// data only (`password_hash` stays NULL) and reuses the provider's
/// subject id, so verified tokens resolve to the same identity.
pub struct ExternalSessionIssuer {
    users: UserRepository,
    jwt: JwtService,
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// User object returned by the provider.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: String,
}

/// Token grant response from the provider.
#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    access_token: String,
    user: ProviderUser,
}

/// Error body shapes the provider may return.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl ProviderError {
    fn detail(self) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .unwrap_or_else(|| "provider rejected the request".to_string())
    }
}

impl ExternalSessionIssuer {
    /// Creates an external session issuer.
    #[must_use]
    pub fn new(users: UserRepository, jwt: JwtService, base_url: String, api_key: String) -> Self {
        Self {
            users,
            jwt,
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Makes sure a local profile row (and the default accounts) exists for
    /// a provider identity. Users registered against the provider out of
    /// band get their profile on first login.
    async fn ensure_profile(&self, id: Uuid, email: &str) -> AppResult<UserInfo> {
        if let Some(existing) = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            return Ok(UserInfo {
                id: existing.id,
                email: existing.email,
            });
        }

        let user = self
            .users
            .create(id, email, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(UserInfo {
            id: user.id,
            email: user.email,
        })
    }
}

#[async_trait]
impl SessionIssuer for ExternalSessionIssuer {
    async fn register(&self, email: &str, password: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ProviderError>()
                .await
                .unwrap_or_default()
                .detail();
            // 4xx covers duplicate email and weak passwords alike
            if status.is_client_error() {
                return Err(AppError::Conflict(detail));
            }
            return Err(AppError::ExternalService(detail));
        }

        let provider_user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let user = self
            .ensure_profile(provider_user.id, &provider_user.email)
            .await?;
        info!(user_id = %user.id, "New user registered via provider");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.is_client_error() {
                return Err(AppError::InvalidCredentials);
            }
            let detail = response
                .json::<ProviderError>()
                .await
                .unwrap_or_default()
                .detail();
            return Err(AppError::ExternalService(detail));
        }

        let grant: ProviderTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let user = self.ensure_profile(grant.user.id, &grant.user.email).await?;
        info!(user_id = %user.id, "User logged in via provider");
        Ok(AuthenticatedSession {
            token: grant.access_token,
            user,
        })
    }

    fn verify(&self, token: &str) -> AppResult<Uuid> {
        self.jwt
            .validate_token(token)
            .map(|claims| claims.user_id())
            .map_err(jwt_to_app_error)
    }

    fn token_expires_in(&self) -> i64 {
        self.jwt.token_expires_in()
    }
}

fn duplicate_email_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("a user with this email already exists".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

fn jwt_to_app_error(err: JwtError) -> AppError {
    match err {
        JwtError::Expired => AppError::Unauthorized("token has expired".to_string()),
        _ => AppError::Unauthorized("invalid or malformed token".to_string()),
    }
}
