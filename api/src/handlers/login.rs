use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::errors::AuthError;
use serde::Deserialize;
use tera::Context;

use crate::handlers::{redirect, render, AppError};
use crate::middleware::AUTH_COOKIE;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Message shown for a `?error=` code. Unknown codes show nothing.
fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "missing_fields" => Some("Username and password are required."),
        "invalid_credentials" => Some("Invalid username or password."),
        "unavailable" => Some("Authentication failed. Please try again."),
        _ => None,
    }
}

/// Display the login page
#[tracing::instrument(skip(params))]
pub async fn login_page(Query(params): Query<LoginQuery>) -> Result<impl IntoResponse, AppError> {
    let mut context = Context::new();
    if let Some(message) = params.error.as_deref().and_then(error_message) {
        context.insert("error", message);
    }

    render("login.html", &context)
}

/// Handle form-based login; on success the JWT is stored in an HttpOnly cookie
#[tracing::instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginFormData>,
) -> Response {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return redirect("/login?error=missing_fields");
    }

    match state.auth.login(&form.username, &form.password).await {
        Ok(token) => {
            tracing::info!("Form-based login successful");

            let cookie = Cookie::build((AUTH_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(state.config.auth.cookie_secure)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::hours(
                    state.config.auth.jwt_expiration_hours as i64,
                ));

            (jar.add(cookie), redirect("/repositories")).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Form-based login rejected");
            redirect("/login?error=invalid_credentials")
        }
        Err(e) => {
            tracing::error!(error = %e, "Form-based login failed");
            redirect("/login?error=unavailable")
        }
    }
}

/// Drop the session cookie
#[tracing::instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> Response {
    (
        jar.remove(Cookie::build(AUTH_COOKIE).path("/")),
        redirect("/login"),
    )
        .into_response()
}
