pub mod flash;
pub mod health;
pub mod login;
pub mod metrics;
pub mod repositories;

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use common::errors::RepositoryError;
use tera::Context;
use thiserror::Error;

use crate::templates::TEMPLATES;

/// Failures a page handler can surface to the browser
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Repository(RepositoryError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            // Form handlers redirect on validation errors before reaching here
            AppError::Repository(RepositoryError::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Repository(RepositoryError::Store(_)) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Repository(RepositoryError::NotFound(_)) => {
                "The repository you are looking for does not exist.".to_string()
            }
            AppError::Repository(RepositoryError::Forbidden { .. }) => {
                "You do not have access to this repository.".to_string()
            }
            AppError::Repository(RepositoryError::Validation(errors)) => errors.to_string(),
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Shown on the error page so a report can be matched to the log line
        let trace_id = uuid::Uuid::new_v4().to_string();
        if status.is_server_error() {
            tracing::error!(error = %self, trace_id = %trace_id, "Request failed");
        } else {
            tracing::warn!(
                error = %self,
                status = status.as_u16(),
                trace_id = %trace_id,
                "Request rejected"
            );
        }

        let mut context = Context::new();
        context.insert("status", &status.as_u16());
        context.insert("message", &self.public_message());
        context.insert("trace_id", &trace_id);

        match TEMPLATES.render("error.html", &context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, self.public_message()).into_response()
            }
        }
    }
}

/// Render a template into an HTML response body
pub fn render(template: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(TEMPLATES.render(template, context)?))
}

/// `302 Found` to `location`. `Redirect::to` would answer 303.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
