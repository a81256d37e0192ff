use std::{collections::HashMap, fmt, sync::Arc};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::models::user::{Role, User};
use crate::infrastructure::config::AuthSettings;

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "session";

/// Hashes the provided password using Argon2id with a randomly generated salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verifies that the plaintext password matches the previously hashed password.
pub fn verify_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug)]
pub enum AuthServiceError {
    MissingToken,
    Jwt(jsonwebtoken::errors::Error),
    Revoked,
}

impl fmt::Display for AuthServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthServiceError::MissingToken => write!(f, "no session token was presented"),
            AuthServiceError::Jwt(err) => write!(f, "{err}"),
            AuthServiceError::Revoked => write!(f, "Token has been revoked"),
        }
    }
}

impl std::error::Error for AuthServiceError {}

impl From<jsonwebtoken::errors::Error> for AuthServiceError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        AuthServiceError::Jwt(value)
    }
}

impl AuthServiceError {
    pub fn message(&self) -> &str {
        match self {
            AuthServiceError::MissingToken => "Authentication required",
            AuthServiceError::Jwt(_) => "Token verification failed",
            AuthServiceError::Revoked => "Token has been revoked",
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::UNAUTHORIZED
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Server-side record of logged-out tokens, kept until they would have
/// expired anyway.
#[derive(Clone, Default)]
pub struct SessionStore {
    revoked: Arc<RwLock<HashMap<String, usize>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, token: &str, expires_at: usize) {
        let now = Utc::now().timestamp().max(0) as usize;
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(token.to_string(), expires_at);
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        let revoked = self.revoked.read().await;
        revoked.contains_key(token)
    }
}

pub fn create_session_token(
    settings: &AuthSettings,
    user: &User,
) -> Result<(String, Claims), AuthServiceError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::minutes(settings.expiration_minutes);

    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
        iat: issued_at.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn decode_token(settings: &AuthSettings, token: &str) -> Result<Claims, AuthServiceError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(AuthServiceError::from)
}

pub async fn verify_token(
    settings: &AuthSettings,
    sessions: &SessionStore,
    token: &str,
) -> Result<Claims, AuthServiceError> {
    if sessions.is_revoked(token).await {
        return Err(AuthServiceError::Revoked);
    }

    decode_token(settings, token)
}

pub fn session_cookie(token: &str, max_age_minutes: i64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        max_age_minutes.max(0) * 60
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
