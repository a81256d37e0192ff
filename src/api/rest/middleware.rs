use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde_json::json;

use crate::application::services::auth::{Claims, SESSION_COOKIE, verify_token};
use crate::domain::models::user::Role;
use crate::state::AppState;

pub const HOUSEKEEPING_ROLES: &[Role] = &[Role::Admin, Role::Housekeeper];
pub const INVENTORY_ROLES: &[Role] = &[Role::Admin, Role::StoreManager];
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

#[derive(Clone, Debug)]
pub struct AuthContext {
    pub token: String,
    pub claims: Claims,
}

fn parse_bearer_token(header_value: &str) -> Option<&str> {
    let mut segments = header_value.split_whitespace();

    match (segments.next(), segments.next(), segments.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            if token.is_empty() { None } else { Some(token) }
        }
        _ => None,
    }
}

fn parse_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Bearer header first, then the session cookie.
fn extract_token(headers: &HeaderMap) -> Result<Option<String>, &'static str> {
    match headers.get(AUTHORIZATION) {
        Some(raw) => {
            let value = raw
                .to_str()
                .map_err(|_| "Authorization header is not valid UTF-8")?;
            parse_bearer_token(value)
                .map(|token| Some(token.to_owned()))
                .ok_or("Authorization header must use the Bearer scheme")
        }
        None => Ok(parse_session_cookie(headers)),
    }
}

fn json_response(status: StatusCode, level: &str, message: &str) -> Response {
    let payload = Json(json!({
        "status": level,
        "message": message,
    }));

    let mut response = payload.into_response();
    *response.status_mut() = status;
    response
}

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_token(req.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => {
            return json_response(StatusCode::UNAUTHORIZED, "fail", "Authentication required");
        }
        Err(message) => return json_response(StatusCode::UNAUTHORIZED, "fail", message),
    };

    match verify_token(&state.config.auth, &state.sessions, &token).await {
        Ok(claims) => {
            req.extensions_mut().insert(AuthContext { token, claims });
            next.run(req).await
        }
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                error!("session validation failed: {err}");
            } else {
                warn!("session validation failed: {err}");
            }

            json_response(
                status,
                if status.is_server_error() {
                    "error"
                } else {
                    "fail"
                },
                err.message(),
            )
        }
    }
}

/// Rejects requests whose verified role is not in `allowed`. Must run
/// inside [`require_session`].
pub async fn require_role(allowed: &'static [Role], req: Request, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<AuthContext>() else {
        return json_response(StatusCode::UNAUTHORIZED, "fail", "Authentication required");
    };

    if !allowed.contains(&ctx.claims.role) {
        warn!(
            "user {} with role {} denied access to {}",
            ctx.claims.username,
            ctx.claims.role,
            req.uri().path()
        );
        return json_response(StatusCode::FORBIDDEN, "fail", "Insufficient role");
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("Bearer a b"), None);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=tok123; lang=en"));
        assert_eq!(extract_token(&headers), Ok(Some("tok123".to_string())));
    }

    #[test]
    fn authorization_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("session=from-cookie"));
        assert_eq!(extract_token(&headers), Ok(Some("from-header".to_string())));
    }

    #[test]
    fn malformed_authorization_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn no_credentials_yields_none() {
        assert_eq!(extract_token(&HeaderMap::new()), Ok(None));
    }
}
