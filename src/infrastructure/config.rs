use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub expiration_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub recipient: String,
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    /// How long shutdown waits for queued notifications to go out.
    pub drain_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
    pub cors_origin: Option<String>,
    pub admin: Option<AdminCredentials>,
    pub smtp: Option<SmtpConfig>,
    pub notifications: NotificationSettings,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            _ => {
                warn!("ADMIN_USERNAME and ADMIN_PASSWORD must be set together; skipping admin bootstrap");
                None
            }
        };

        let email_user = var("EMAIL_USER");
        let smtp = match (email_user.clone(), var("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: try_load(&var, "SMTP_PORT", "465")?,
                from: var("EMAIL_FROM").unwrap_or_else(|| username.clone()),
                username,
                password,
            }),
            _ => None,
        };

        let recipient = var("NOTIFY_EMAIL")
            .or(email_user)
            .unwrap_or_else(|| "operations@localhost".to_string());

        let queue_capacity: usize = try_load(&var, "NOTIFY_QUEUE_CAPACITY", "256")?;
        if queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "NOTIFY_QUEUE_CAPACITY",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&var, "PORT", "3000")?,
            database: DatabaseConfig {
                url: var("DATABASE_URL").unwrap_or_else(|| "ws://localhost:8000".to_string()),
                namespace: var("DATABASE_NAMESPACE").unwrap_or_else(|| "hotel".to_string()),
                database: var("DATABASE_NAME").unwrap_or_else(|| "operations".to_string()),
                username: var("DATABASE_USER"),
                password: var("DATABASE_PASS"),
            },
            auth: AuthSettings {
                jwt_secret,
                expiration_minutes: try_load(&var, "JWT_EXPIRATION_MINUTES", "480")?,
            },
            cors_origin: var("CORS_ORIGIN"),
            admin,
            smtp,
            notifications: NotificationSettings {
                recipient,
                queue_capacity,
                max_attempts: try_load::<u32, _>(&var, "NOTIFY_MAX_ATTEMPTS", "3")?.max(1),
                initial_backoff_ms: try_load(&var, "NOTIFY_BACKOFF_MS", "500")?,
                drain_timeout_secs: try_load(&var, "NOTIFY_DRAIN_TIMEOUT_SECS", "30")?,
            },
        })
    }
}

fn try_load<T, F>(var: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{Config, ConfigError};

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = config_from(&[]).expect_err("missing secret must fail");
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).expect("config should load");

        assert_eq!(config.port, 3000);
        assert_eq!(config.database.url, "ws://localhost:8000");
        assert_eq!(config.auth.expiration_minutes, 480);
        assert!(config.smtp.is_none());
        assert!(config.admin.is_none());
        assert!(config.cors_origin.is_none());
        assert_eq!(config.notifications.queue_capacity, 256);
        assert_eq!(config.notifications.max_attempts, 3);
        assert_eq!(config.notifications.drain_timeout_secs, 30);
    }

    #[test]
    fn invalid_port_is_reported_with_its_key() {
        let err = config_from(&[("JWT_SECRET", "s3cret"), ("PORT", "eighty")])
            .expect_err("invalid port must fail");
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn smtp_requires_both_credentials() {
        let config = config_from(&[("JWT_SECRET", "s3cret"), ("EMAIL_USER", "desk@hotel.test")])
            .expect("config should load");
        assert!(config.smtp.is_none());
        assert_eq!(config.notifications.recipient, "desk@hotel.test");

        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("EMAIL_USER", "desk@hotel.test"),
            ("EMAIL_PASS", "app-password"),
        ])
        .expect("config should load");
        let smtp = config.smtp.expect("smtp should be configured");
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.from, "desk@hotel.test");
    }

    #[test]
    fn notify_email_overrides_sender_as_recipient() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("EMAIL_USER", "desk@hotel.test"),
            ("NOTIFY_EMAIL", "stores@hotel.test"),
        ])
        .expect("config should load");
        assert_eq!(config.notifications.recipient, "stores@hotel.test");
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let err = config_from(&[("JWT_SECRET", "s3cret"), ("NOTIFY_QUEUE_CAPACITY", "0")])
            .expect_err("zero capacity must fail");
        assert!(matches!(err, ConfigError::Invalid { key: "NOTIFY_QUEUE_CAPACITY", .. }));
    }

    #[test]
    fn admin_credentials_load_as_a_pair() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "change-me-please"),
        ])
        .expect("config should load");
        let admin = config.admin.expect("admin should be configured");
        assert_eq!(admin.username, "admin");
    }
}
