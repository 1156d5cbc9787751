use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use common::errors::AuthError;

use crate::handlers::redirect;
use crate::state::AppState;

/// Cookie holding the session JWT
pub const AUTH_COOKIE: &str = "auth_token";

/// Token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication gate for the repository routes.
///
/// Resolves the actor from the session cookie (or a Bearer header) and stores
/// it in the request extensions. Anything else is sent to the login page
/// before any handler runs.
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(req.headers()).map(str::to_string));

    let result = match token {
        Some(token) => state.auth.authenticate(&token),
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(actor) => {
            tracing::debug!(user_id = actor.id, "Request authenticated");
            req.extensions_mut().insert(actor);
            next.run(req).await
        }
        Err(e) => {
            tracing::info!(error = %e, "Unauthenticated request redirected to login");
            redirect("/login")
        }
    }
}
