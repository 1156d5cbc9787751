// Repository pages: list, create, show, edit, update, destroy
//
// All routes here sit behind the auth gate, so every handler receives the
// acting user through the request extensions.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use common::errors::{RepositoryError, ValidationError};
use common::models::{Actor, Repository, RepositoryId, RepositoryInput};
use serde::Deserialize;
use tera::Context;

use crate::handlers::flash::{self, Flash};
use crate::handlers::{redirect, render, AppError};
use crate::state::AppState;

/// Submitted repository form.
///
/// Only `url` and `description` reach the service. `_method` is the HTML form
/// method override; every other field (`id`, `user_id`, ...) is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RepositoryForm {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "_method")]
    pub method: Option<String>,
}

impl From<RepositoryForm> for RepositoryInput {
    fn from(form: RepositoryForm) -> Self {
        RepositoryInput {
            url: form.url,
            description: form.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MethodOverride {
    #[serde(default, rename = "_method")]
    pub method: Option<String>,
}

/// Form fields of a submission. A request without a form body carries no
/// fields and is validated as empty input.
fn submitted(
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Result<RepositoryForm, Response> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(RepositoryForm::default()),
        Err(rejection) => Err(rejection.into_response()),
    }
}

fn base_context(actor: &Actor) -> Context {
    let mut context = Context::new();
    context.insert("username", &actor.username);
    context
}

/// Form context: flashed input wins over the stored values
fn form_context(actor: &Actor, flash: &Flash, repository: Option<&Repository>) -> Context {
    let mut context = base_context(actor);

    let url = flash
        .old_value("url")
        .or(repository.map(|r| r.url.as_str()))
        .unwrap_or_default();
    let description = flash
        .old_value("description")
        .or(repository.map(|r| r.description.as_str()))
        .unwrap_or_default();

    context.insert("url", url);
    context.insert("description", description);
    context.insert("errors", &flash.errors);
    if let Some(repository) = repository {
        context.insert("repository", repository);
    }
    context
}

fn back_with_errors(
    jar: CookieJar,
    location: &str,
    errors: ValidationError,
    input: RepositoryInput,
) -> Response {
    tracing::debug!(fields = %errors, "Redirecting back with validation errors");
    let jar = flash::put(jar, Flash::from_validation(errors, input));
    (jar, redirect(location)).into_response()
}

/// GET /repositories
#[tracing::instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, AppError> {
    let repositories = state.repositories.list(&actor).await?;

    let mut context = base_context(&actor);
    context.insert("repositories", &repositories);

    Ok(render("repositories/index.html", &context)?.into_response())
}

/// GET /repositories/create
#[tracing::instrument(skip(actor, jar), fields(user_id = actor.id))]
pub async fn create(
    Extension(actor): Extension<Actor>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (jar, flash) = flash::take(jar);
    let context = form_context(&actor, &flash, None);

    Ok((jar, render("repositories/create.html", &context)?).into_response())
}

/// POST /repositories
#[tracing::instrument(skip(state, actor, jar, form), fields(user_id = actor.id))]
pub async fn store(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    jar: CookieJar,
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Result<Response, AppError> {
    let input = match submitted(form) {
        Ok(form) => RepositoryInput::from(form),
        Err(rejection) => return Ok(rejection),
    };

    match state.repositories.create(&actor, input.clone()).await {
        Ok(_) => Ok(redirect("/repositories")),
        Err(RepositoryError::Validation(errors)) => {
            Ok(back_with_errors(jar, "/repositories/create", errors, input))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /repositories/:id
#[tracing::instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<RepositoryId>,
) -> Result<Response, AppError> {
    let repository = state.repositories.get(&actor, id).await?;

    let mut context = base_context(&actor);
    context.insert("repository", &repository);

    Ok(render("repositories/show.html", &context)?.into_response())
}

/// GET /repositories/:id/edit
#[tracing::instrument(skip(state, actor, jar), fields(user_id = actor.id))]
pub async fn edit(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<RepositoryId>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let repository = state.repositories.get(&actor, id).await?;

    let (jar, flash) = flash::take(jar);
    let context = form_context(&actor, &flash, Some(&repository));

    Ok((jar, render("repositories/edit.html", &context)?).into_response())
}

/// PUT /repositories/:id
#[tracing::instrument(skip(state, actor, jar, form), fields(user_id = actor.id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<RepositoryId>,
    jar: CookieJar,
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Result<Response, AppError> {
    match submitted(form) {
        Ok(form) => apply_update(&state, &actor, id, jar, form.into()).await,
        Err(rejection) => Ok(rejection),
    }
}

/// DELETE /repositories/:id
#[tracing::instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn destroy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<RepositoryId>,
) -> Result<Response, AppError> {
    apply_destroy(&state, &actor, id).await
}

/// POST /repositories/:id with `_method` set to PUT, PATCH or DELETE, either
/// as a form field or in the query string
#[tracing::instrument(skip(state, actor, jar, query, form), fields(user_id = actor.id))]
pub async fn method_override(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<RepositoryId>,
    Query(query): Query<MethodOverride>,
    jar: CookieJar,
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match submitted(form) {
        Ok(form) => form,
        Err(rejection) => return Ok(rejection),
    };
    let method = form
        .method
        .clone()
        .or(query.method)
        .unwrap_or_default()
        .to_ascii_uppercase();

    match method.as_str() {
        "PUT" | "PATCH" => apply_update(&state, &actor, id, jar, form.into()).await,
        "DELETE" => apply_destroy(&state, &actor, id).await,
        _ => {
            tracing::warn!(method = %method, "Unsupported method override");
            Ok(StatusCode::METHOD_NOT_ALLOWED.into_response())
        }
    }
}

async fn apply_update(
    state: &AppState,
    actor: &Actor,
    id: RepositoryId,
    jar: CookieJar,
    input: RepositoryInput,
) -> Result<Response, AppError> {
    let edit_location = format!("/repositories/{}/edit", id);

    match state.repositories.update(actor, id, input.clone()).await {
        Ok(_) => Ok(redirect(&edit_location)),
        Err(RepositoryError::Validation(errors)) => {
            Ok(back_with_errors(jar, &edit_location, errors, input))
        }
        Err(e) => Err(e.into()),
    }
}

async fn apply_destroy(
    state: &AppState,
    actor: &Actor,
    id: RepositoryId,
) -> Result<Response, AppError> {
    state.repositories.delete(actor, id).await?;
    Ok(redirect("/repositories"))
}
