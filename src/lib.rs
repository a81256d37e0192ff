//! Hotel operations service: housekeeping checklists, room status reports
//! and inventory with a movement ledger, served over REST from SurrealDB.
//!
//! Outbound email goes through an in-process queue. Request handlers
//! enqueue a notification and return; a background dispatcher delivers it
//! over SMTP, or logs it when no SMTP credentials are configured.
//!
//! # Running
//!
//! ```sh
//! JWT_SECRET=change-me ADMIN_USERNAME=admin ADMIN_PASSWORD=change-me-please \
//!     DATABASE_URL=mem:// cargo run
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c, task::JoinHandle};
use tracing::{error, info, warn};

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod state;

use api::rest::router::create_router;
use application::services::accounts::{AccountError, bootstrap_admin};
use application::services::notifications::{
    DispatchPolicy, NotificationInbox, NotificationQueue, drain, run_dispatcher,
};
use infrastructure::config::{Config, ConfigError};
use infrastructure::data::db_context::{schema::ensure_schema, surrealdb_context::init_db};
use infrastructure::mail::{LogMailer, smtp::SmtpMailer};
use state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("failed to bootstrap admin account: {0}")]
    Admin(#[from] AccountError),
    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Spawns the notification dispatcher, preferring SMTP when configured.
fn spawn_dispatcher(config: &Config, inbox: NotificationInbox) -> JoinHandle<()> {
    let policy = DispatchPolicy::from(&config.notifications);

    match config.smtp.as_ref().map(SmtpMailer::new) {
        Some(Ok(mailer)) => tokio::spawn(run_dispatcher(mailer, inbox, policy)),
        Some(Err(err)) => {
            warn!("smtp mailer unavailable, notifications will only be logged: {err}");
            tokio::spawn(run_dispatcher(LogMailer, inbox, policy))
        }
        None => {
            info!("smtp not configured, notifications will only be logged");
            tokio::spawn(run_dispatcher(LogMailer, inbox, policy))
        }
    }
}

pub async fn start_server() -> Result<(), StartupError> {
    info!("Loading configuration...");
    let config = Config::load()?;

    info!("Initializing database...");
    let db = init_db(&config.database).await?;
    ensure_schema(&db).await?;

    match &config.admin {
        Some(admin) => {
            if bootstrap_admin(&db, admin).await? {
                info!(username = %admin.username, "bootstrapped admin account");
            }
        }
        None => warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; no admin account bootstrapped"),
    }

    let (queue, inbox) = NotificationQueue::new(config.notifications.queue_capacity);
    let backlog = inbox.backlog();
    let dispatcher = spawn_dispatcher(&config, inbox);
    let drain_timeout = Duration::from_secs(config.notifications.drain_timeout_secs);

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(db, config, Arc::new(queue));
    let app = create_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // The router held the last queue handle, so the dispatcher now stops
    // once the backlog is delivered.
    let undelivered = drain(dispatcher, backlog, drain_timeout).await;
    served?;

    info!(undelivered, "Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!("failed to listen for Ctrl+C: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
