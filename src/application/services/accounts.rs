use axum::http::StatusCode;
use thiserror::Error;
use tracing::info;

use crate::application::services::auth::hash_password;
use crate::domain::models::user::{NewUser, Role, User};
use crate::domain::timestamp;
use crate::infrastructure::config::AdminCredentials;
use crate::infrastructure::data::db_context::surrealdb_context::Db;
use crate::infrastructure::data::repositories::is_unique_violation;
use crate::infrastructure::data::repositories::user_repository::UserRepository;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("Username '{0}' is already taken")]
    Duplicate(String),
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Duplicate(_) => StatusCode::CONFLICT,
            AccountError::Hash(_) | AccountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AccountError::Hash(_) => "Failed to hash password".to_string(),
            AccountError::Database(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        }
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), AccountError> {
    if username.is_empty() {
        return Err(AccountError::Validation("Username is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

pub async fn create_account(
    db: &Db,
    username: &str,
    password: &str,
    role: Role,
) -> Result<User, AccountError> {
    let username = username.trim();
    validate_credentials(username, password)?;

    let repository = UserRepository::new(db);
    if repository.username_exists(username).await? {
        return Err(AccountError::Duplicate(username.to_string()));
    }

    let password = hash_password(password).map_err(AccountError::Hash)?;
    let now = timestamp::now();
    let inserted = repository
        .add_user(NewUser {
            username: username.to_string(),
            password,
            role,
            created_at: now,
            updated_at: now,
        })
        .await;

    // A concurrent insert of the same name loses on the unique index, or on a
    // transaction conflict that leaves the winner's row behind.
    let user = match inserted {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(AccountError::Duplicate(username.to_string()));
        }
        Err(err) => {
            if repository.username_exists(username).await? {
                return Err(AccountError::Duplicate(username.to_string()));
            }
            return Err(AccountError::Database(err));
        }
    };

    info!(username = %user.username, role = %user.role, "created user account");
    Ok(user)
}

/// Creates the configured admin unless that username already exists.
/// Returns whether an account was created.
pub async fn bootstrap_admin(db: &Db, admin: &AdminCredentials) -> Result<bool, AccountError> {
    if UserRepository::new(db)
        .username_exists(admin.username.trim())
        .await?
    {
        info!(username = %admin.username, "admin account already present");
        return Ok(false);
    }

    create_account(db, &admin.username, &admin.password, Role::Admin).await?;
    Ok(true)
}
