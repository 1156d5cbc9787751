// HTTP tests for the repository pages, run against in-memory stores

use api::{create_router, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use common::bootstrap::Stores;
use common::config::{Settings, StorageBackend};
use common::models::{Actor, Repository, RepositoryInput};
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
    router: Router,
    state: AppState,
    alice: Actor,
    alice_token: String,
    bob: Actor,
    bob_token: String,
}

impl TestApp {
    async fn new() -> Self {
        let mut settings = Settings::default();
        settings.storage.backend = StorageBackend::Memory;
        settings.auth.bcrypt_cost = 4;

        let state = AppState::new(Stores::in_memory(), settings);

        let alice = state.auth.create_user("alice", "alice-pass", None).await.unwrap();
        let bob = state.auth.create_user("bob", "bob-pass", None).await.unwrap();
        let alice_token = state.auth.login("alice", "alice-pass").await.unwrap();
        let bob_token = state.auth.login("bob", "bob-pass").await.unwrap();

        Self {
            router: create_router(state.clone()),
            state,
            alice: Actor::new(alice.id, "alice"),
            alice_token,
            bob: Actor::new(bob.id, "bob"),
            bob_token,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn seed(&self, owner: &Actor, url: &str) -> Repository {
        self.state
            .repositories
            .create(owner, RepositoryInput::new(url, format!("{} description", url)))
            .await
            .unwrap()
    }

    async fn stored(&self, repository: &Repository) -> Repository {
        let actor = Actor::new(repository.user_id, "owner");
        self.state.repositories.get(&actor, repository.id).await.unwrap()
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

fn form(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    request(method, uri, token, Some(body))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth_token={}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, FORM)
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` of the first Set-Cookie header for `name`
fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// Authentication gate
// ============================================================================

#[tokio::test]
async fn guest_is_redirected_to_login_for_every_repository_route() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;
    let id = record.id;

    let requests = vec![
        get("/repositories", None),
        get("/repositories/create", None),
        form(Method::POST, "/repositories", None, "url=x&description=y"),
        get(&format!("/repositories/{}", id), None),
        get(&format!("/repositories/{}/edit", id), None),
        form(
            Method::PUT,
            &format!("/repositories/{}", id),
            None,
            "url=changed&description=changed",
        ),
        request(Method::DELETE, &format!("/repositories/{}", id), None, None),
    ];

    for req in requests {
        let description = format!("{} {}", req.method(), req.uri());
        let response = app.send(req).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{}", description);
        assert_eq!(location(&response), "/login", "{}", description);
    }

    // No state change
    let listed = app.state.repositories.list(&app.alice).await.unwrap();
    assert_eq!(listed, vec![record]);
}

#[tokio::test]
async fn forged_token_is_redirected_to_login() {
    let app = TestApp::new().await;
    let response = app
        .send(get("/repositories", Some("not.a.token")))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/repositories")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.alice_token))
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Listing and creation
// ============================================================================

#[tokio::test]
async fn index_without_records_shows_empty_message() {
    let app = TestApp::new().await;
    let response = app.send(get("/repositories", Some(app.alice_token.as_str()))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No repositories created"));
}

#[tokio::test]
async fn index_lists_only_own_records() {
    let app = TestApp::new().await;
    app.seed(&app.alice, "alpha").await;
    app.seed(&app.bob, "bravo").await;

    let body = body_text(app.send(get("/repositories", Some(app.alice_token.as_str()))).await).await;

    assert!(body.contains("alpha"));
    assert!(!body.contains("bravo"));
    assert!(!body.contains("No repositories created"));
}

#[tokio::test]
async fn create_form_renders_for_authenticated_user() {
    let app = TestApp::new().await;
    let response = app
        .send(get("/repositories/create", Some(app.alice_token.as_str())))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("New repository"));
}

#[tokio::test]
async fn store_creates_record_owned_by_actor() {
    let app = TestApp::new().await;
    let response = app
        .send(form(
            Method::POST,
            "/repositories",
            Some(app.alice_token.as_str()),
            "url=alpha&description=first",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories");

    let listed = app.state.repositories.list(&app.alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].url, "alpha");
    assert_eq!(listed[0].description, "first");
    assert_eq!(listed[0].user_id, app.alice.id);
}

#[tokio::test]
async fn store_ignores_submitted_owner_and_id() {
    let app = TestApp::new().await;
    let body = format!("url=alpha&description=first&user_id={}&id=999", app.bob.id);
    app.send(form(Method::POST, "/repositories", Some(app.alice_token.as_str()), &body))
        .await;

    let listed = app.state.repositories.list(&app.alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_ne!(listed[0].id, 999);
    assert!(app.state.repositories.list(&app.bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_with_empty_url_redirects_back_with_error() {
    let app = TestApp::new().await;
    let response = app
        .send(form(
            Method::POST,
            "/repositories",
            Some(app.alice_token.as_str()),
            "url=&description=kept",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories/create");
    assert!(app.state.repositories.list(&app.alice).await.unwrap().is_empty());

    // The next form render shows the error and the old input
    let flash = set_cookie(&response, "flash").expect("flash cookie");
    let request = Request::builder()
        .uri("/repositories/create")
        .header(
            header::COOKIE,
            format!("auth_token={}; {}", app.alice_token, flash),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("The url field is required."));
    assert!(!body.contains("The description field is required."));
    assert!(body.contains("kept"));
}

/// Follow a validation redirect carrying the flash cookie and return the page
async fn follow_with_flash(app: &TestApp, response: &Response<Body>) -> String {
    let flash = set_cookie(response, "flash").expect("flash cookie");
    let request = Request::builder()
        .uri(location(response))
        .header(
            header::COOKIE,
            format!("auth_token={}; {}", app.alice_token, flash),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await
}

#[tokio::test]
async fn store_without_body_reports_both_fields() {
    let app = TestApp::new().await;
    let response = app
        .send(request(
            Method::POST,
            "/repositories",
            Some(app.alice_token.as_str()),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories/create");
    assert!(app.state.repositories.list(&app.alice).await.unwrap().is_empty());

    let body = follow_with_flash(&app, &response).await;
    assert!(body.contains("The url field is required."));
    assert!(body.contains("The description field is required."));
}

#[tokio::test]
async fn store_with_empty_description_redirects_back() {
    let app = TestApp::new().await;
    let response = app
        .send(form(
            Method::POST,
            "/repositories",
            Some(app.alice_token.as_str()),
            "url=alpha",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories/create");
    assert!(set_cookie(&response, "flash").is_some());
    assert!(app.state.repositories.list(&app.alice).await.unwrap().is_empty());
}

// ============================================================================
// Show / edit
// ============================================================================

#[tokio::test]
async fn owner_can_view_and_edit() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(get(&format!("/repositories/{}", record.id), Some(app.alice_token.as_str())))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alpha description"));

    let response = app
        .send(get(
            &format!("/repositories/{}/edit", record.id),
            Some(app.alice_token.as_str()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Edit repository"));
}

#[tokio::test]
async fn non_owner_cannot_view_or_edit() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    for uri in [
        format!("/repositories/{}", record.id),
        format!("/repositories/{}/edit", record.id),
    ] {
        let response = app.send(get(&uri, Some(app.bob_token.as_str()))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
        assert!(!body_text(response).await.contains("alpha description"));
    }
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .send(get("/repositories/4242", Some(app.alice_token.as_str())))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn owner_update_redirects_to_edit_and_persists() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;
    let uri = format!("/repositories/{}", record.id);

    let response = app
        .send(form(
            Method::PUT,
            &uri,
            Some(app.alice_token.as_str()),
            "url=alpha2&description=updated&user_id=999",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/repositories/{}/edit", record.id));

    let stored = app.stored(&record).await;
    assert_eq!(stored.url, "alpha2");
    assert_eq!(stored.description, "updated");
    assert_eq!(stored.user_id, app.alice.id);
}

#[tokio::test]
async fn update_with_invalid_input_redirects_back_to_edit() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(form(
            Method::PUT,
            &format!("/repositories/{}", record.id),
            Some(app.alice_token.as_str()),
            "url=&description=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/repositories/{}/edit", record.id));
    assert_eq!(app.stored(&record).await, record);
}

#[tokio::test]
async fn update_without_body_reports_both_fields() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(request(
            Method::PUT,
            &format!("/repositories/{}", record.id),
            Some(app.alice_token.as_str()),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/repositories/{}/edit", record.id));
    assert_eq!(app.stored(&record).await.url, "alpha");

    let body = follow_with_flash(&app, &response).await;
    assert!(body.contains("The url field is required."));
    assert!(body.contains("The description field is required."));
}

#[tokio::test]
async fn method_override_without_body_validates_update() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(request(
            Method::POST,
            &format!("/repositories/{}?_method=PUT", record.id),
            Some(app.alice_token.as_str()),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/repositories/{}/edit", record.id));
    assert!(set_cookie(&response, "flash").is_some());
    assert_eq!(app.stored(&record).await.url, "alpha");
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .send(form(
            Method::PUT,
            "/repositories/9999",
            Some(app.alice_token.as_str()),
            "url=&description=",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&response, "flash").is_none());

    let response = app
        .send(request(
            Method::PUT,
            "/repositories/9999",
            Some(app.alice_token.as_str()),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_owner_update_is_forbidden_and_leaves_record() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(form(
            Method::PUT,
            &format!("/repositories/{}", record.id),
            Some(app.bob_token.as_str()),
            "url=hijacked&description=hijacked",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.stored(&record).await, record);
}

#[tokio::test]
async fn non_owner_update_with_invalid_input_sees_validation_first() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(form(
            Method::PUT,
            &format!("/repositories/{}", record.id),
            Some(app.bob_token.as_str()),
            "url=&description=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/repositories/{}/edit", record.id));
    assert_eq!(app.stored(&record).await, record);
}

// ============================================================================
// Destroy
// ============================================================================

#[tokio::test]
async fn owner_destroy_removes_record() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;
    let uri = format!("/repositories/{}", record.id);

    let response = app
        .send(request(Method::DELETE, &uri, Some(app.alice_token.as_str()), None))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories");

    let response = app.send(get(&uri, Some(app.alice_token.as_str()))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(request(Method::DELETE, &uri, Some(app.alice_token.as_str()), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_owner_destroy_is_forbidden() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(request(
            Method::DELETE,
            &format!("/repositories/{}", record.id),
            Some(app.bob_token.as_str()),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.stored(&record).await, record);
}

// ============================================================================
// HTML form method override
// ============================================================================

#[tokio::test]
async fn post_with_method_override_dispatches() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;
    let uri = format!("/repositories/{}", record.id);

    let response = app
        .send(form(
            Method::POST,
            &uri,
            Some(app.alice_token.as_str()),
            "_method=PUT&url=alpha2&description=updated",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(app.stored(&record).await.url, "alpha2");

    let response = app
        .send(form(
            Method::POST,
            &format!("{}?_method=DELETE", uri),
            Some(app.alice_token.as_str()),
            "",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories");
    assert!(app.state.repositories.list(&app.alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn post_without_method_override_is_rejected() {
    let app = TestApp::new().await;
    let record = app.seed(&app.alice, "alpha").await;

    let response = app
        .send(form(
            Method::POST,
            &format!("/repositories/{}", record.id),
            Some(app.alice_token.as_str()),
            "url=x&description=y",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(app.stored(&record).await, record);
}

// ============================================================================
// Login, logout and probes
// ============================================================================

#[tokio::test]
async fn login_sets_session_cookie() {
    let app = TestApp::new().await;
    let response = app
        .send(form(
            Method::POST,
            "/login",
            None,
            "username=alice&password=alice-pass",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories");

    let cookie = set_cookie(&response, "auth_token").expect("session cookie");
    let request = Request::builder()
        .uri("/repositories")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_redirects_with_error() {
    let app = TestApp::new().await;
    let response = app
        .send(form(Method::POST, "/login", None, "username=alice&password=nope"))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=invalid_credentials");
    assert!(set_cookie(&response, "auth_token").is_none());

    let response = app
        .send(get("/login?error=invalid_credentials", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid username or password."));
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let app = TestApp::new().await;
    let response = app
        .send(request(Method::POST, "/logout", Some(app.alice_token.as_str()), None))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
    assert_eq!(set_cookie(&response, "auth_token").as_deref(), Some("auth_token="));
}

#[tokio::test]
async fn root_redirects_to_repositories() {
    let app = TestApp::new().await;
    let response = app.send(get("/", None)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/repositories");
}

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new().await;
    let response = app.send(get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}
