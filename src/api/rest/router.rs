use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{self, Next},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::api::rest::middleware::{
    ADMIN_ROLES, HOUSEKEEPING_ROLES, INVENTORY_ROLES, require_role, require_session,
};
use crate::api::rest::{admin, checklists, healthcheck, inventory, status_reports};
use crate::application::commands::{
    create_user_command::create_user_command, login_user_command::login_user_command,
    logout_user_command::logout_user_command,
};
use crate::application::queries::get_all_users_query::get_all_users_query;
use crate::infrastructure::telemetry::metrics_handler;
use crate::state::AppState;

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_credentials(true)
            .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60)),
        Some(Err(err)) => {
            warn!("ignoring invalid CORS_ORIGIN: {err}");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

fn housekeeping_routes() -> Router<AppState> {
    Router::new()
        .route("/submit-checklist", post(checklists::submit_checklist))
        .route("/checklists", get(checklists::list_checklists))
        .route(
            "/checklists/missing-items",
            get(checklists::list_missing_items),
        )
        .route(
            "/checklists/:id",
            get(checklists::get_checklist)
                .put(checklists::update_checklist)
                .delete(checklists::delete_checklist),
        )
        .route(
            "/submit-status-report",
            post(status_reports::submit_status_report),
        )
        .route("/status-reports", get(status_reports::list_status_reports))
        .route(
            "/status-reports/:id",
            get(status_reports::get_status_report)
                .put(status_reports::update_status_report)
                .delete(status_reports::delete_status_report),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_role(HOUSEKEEPING_ROLES, req, next)
        }))
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory",
            get(inventory::list_inventory).post(inventory::adjust_inventory),
        )
        .route("/inventory/transactions", get(inventory::list_transactions))
        .route("/inventory/snapshot/:date", get(inventory::inventory_snapshot))
        .route(
            "/inventory/:id",
            get(inventory::get_inventory_item)
                .put(inventory::update_inventory_item)
                .delete(inventory::delete_inventory_item),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_role(INVENTORY_ROLES, req, next)
        }))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(admin::list_audit_logs))
        .route(
            "/users",
            get(get_all_users_query).post(create_user_command),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_role(ADMIN_ROLES, req, next)
        }))
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout_user_command))
        .merge(housekeeping_routes())
        .merge(inventory_routes())
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/healthcheck", get(healthcheck::health_checker_handler))
        .route("/metrics", get(metrics_handler))
        .route("/login", post(login_user_command));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(state.config.cors_origin.as_deref()))
        .with_state(state)
}
