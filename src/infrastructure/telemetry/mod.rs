use axum::{
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the `fmt` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if fmt().with_env_filter(filter).try_init().is_err() {
        warn!("tracing subscriber already installed");
    }
}

pub fn init_telemetry() {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            describe_metrics();
            info!("prometheus metrics exporter initialized");
        }
        Err(err) => {
            warn!(error = %err, "failed to initialize prometheus exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!("audit_events_total", "Audit events recorded, by action");
    describe_counter!("audit_event_errors_total", "Audit events that failed to persist");
    describe_counter!("audit_query_total", "Audit log queries, by scope");
    describe_counter!("login_attempts_total", "Login attempts, by outcome");
    describe_counter!(
        "inventory_transactions_total",
        "Ledgered stock movements, by action"
    );
    describe_counter!(
        "inventory_rejections_total",
        "Stock movements refused, by reason"
    );
    describe_counter!("notifications_enqueued_total", "Notifications accepted, by kind");
    describe_counter!(
        "notifications_dropped_total",
        "Notifications refused by a full or closed queue"
    );
    describe_counter!("notifications_delivered_total", "Notifications delivered, by kind");
    describe_counter!(
        "notifications_failed_total",
        "Notifications abandoned after the last attempt"
    );
}

pub async fn metrics_handler() -> impl IntoResponse {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        let body = handle.render();
        let headers = [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )];
        (headers, body).into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}
