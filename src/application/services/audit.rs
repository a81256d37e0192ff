use metrics::counter;
use serde_json::Value;
use tracing::{info, warn};

use crate::application::services::auth::Claims;
use crate::domain::models::audit_entry::NewAuditEntry;
use crate::domain::models::user::Role;
use crate::domain::timestamp;
use crate::infrastructure::data::db_context::surrealdb_context::Db;
use crate::infrastructure::data::repositories::audit_entry_repository::AuditEntryRepository;

fn sanitize_action(action: &str) -> String {
    action.trim().to_lowercase()
}

/// Details are stored as an object; anything else is wrapped.
fn details_object(details: Value) -> Value {
    match details {
        Value::Object(_) => details,
        Value::Null => Value::Object(Default::default()),
        other => serde_json::json!({ "value": other }),
    }
}

/// Appends an audit entry. Failures are logged and counted, never returned.
pub async fn log_audit_event(db: &Db, action: &str, details: Value, actor: Option<&Claims>) {
    let (username, role) = match actor {
        Some(claims) => (Some(claims.username.clone()), Some(claims.role)),
        None => (None, None),
    };
    record(db, action, details, username, role).await;
}

pub async fn log_login_attempt(db: &Db, username: &str, outcome: &str, role: Option<Role>) {
    let outcome = sanitize_action(outcome);
    counter!("login_attempts_total", 1, "outcome" => outcome.clone());

    let action = format!("login.{outcome}");
    record(
        db,
        &action,
        serde_json::json!({ "username": username }),
        Some(username.to_string()),
        role,
    )
    .await;
}

async fn record(
    db: &Db,
    action: &str,
    details: Value,
    username: Option<String>,
    role: Option<Role>,
) {
    let action = sanitize_action(action);
    counter!("audit_events_total", 1, "action" => action.clone());

    let user_label = username.clone().unwrap_or_else(|| "anonymous".to_string());
    let entry = NewAuditEntry {
        action: action.clone(),
        details: details_object(details),
        username,
        role,
        timestamp: timestamp::now(),
    };

    info!(target: "audit", action = %action, user = %user_label, "recording audit event");

    if let Err(err) = AuditEntryRepository::new(db).log(entry).await {
        counter!("audit_event_errors_total", 1, "action" => action.clone());
        warn!(target: "audit", error = %err, action = %action, user = %user_label, "failed to persist audit entry");
    }
}

pub fn record_audit_query(label: &str) {
    counter!("audit_query_total", 1, "scope" => label.to_string());
}
