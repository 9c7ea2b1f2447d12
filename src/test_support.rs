//! Router-level helpers shared by handler tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

/// The full router over an in-memory user store.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_app(AppState::fake()),
        }
    }
}

/// Sends one request; non-JSON bodies come back as `Value::Null`.
pub async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.router.clone().oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Registers a user through the API and returns its id.
pub async fn create_user(app: &TestApp, username: &str, email: &str, password: &str) -> i64 {
    let req = Request::post("/users/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "email": email, "password": password }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create_user failed: {body}");
    body["id"].as_i64().expect("id in response")
}

pub async fn token_for(app: &TestApp, email: &str, password: &str) -> String {
    let form = format!(
        "username={}&password={}",
        email.replace('@', "%40"),
        password
    );
    let (status, body) = send(app, post_form("/token", &form)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"]
        .as_str()
        .expect("access_token in response")
        .to_string()
}
