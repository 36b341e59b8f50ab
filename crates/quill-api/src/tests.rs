//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{HeaderMap, Request, StatusCode, header},
  routing::get,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quill_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

use crate::{AppState, catch_panic, router};

const PASSWORD: &str = "correct horse";

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  router(AppState::new(Arc::new(store)).with_count_concurrency(4))
}

fn basic(email: &str, password: &str) -> String {
  format!("Basic {}", B64.encode(format!("{email}:{password}")))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  auth: Option<String>,
  body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, headers, json)
}

async fn sign_up(app: &Router, email: &str, username: &str, name: &str) -> Value {
  let (status, _, body) = send(
    app,
    "POST",
    "/accounts/signup",
    None,
    Some(json!({ "username": username, "email": email, "name": name, "password": PASSWORD })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body
}

async fn create_post(app: &Router, email: &str, title: &str, category: &str) -> Value {
  let (status, _, body) = send(
    app,
    "POST",
    "/posts",
    Some(basic(email, PASSWORD)),
    Some(json!({ "post_title": title, "post_category": category, "post_content": "<p>body</p>" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["data"].clone()
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_sign_in() {
  let app = app().await;
  let body = sign_up(&app, "ada@example.com", "ada", "Ada Lovelace").await;
  assert_eq!(body["status"], 201);
  assert_eq!(body["message"], "Account created successfully");
  assert_eq!(body["data"]["username"], "ada");
  assert!(body.get("error").is_none());

  let (status, _, body) = send(
    &app,
    "POST",
    "/accounts/signin",
    None,
    Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn sign_up_with_blank_field_is_rejected() {
  let app = app().await;
  let (status, _, body) = send(
    &app,
    "POST",
    "/accounts/signup",
    None,
    Some(json!({ "username": " ", "email": "ada@example.com", "name": "Ada", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada").await;

  let (status, _, body) = send(
    &app,
    "POST",
    "/accounts/signup",
    None,
    Some(json!({ "username": "other", "email": "ada@example.com", "name": "A", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["status"], 409);
  assert_eq!(body["message"], "User with this email already exists");
  assert_eq!(body["error"], "Email already taken");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request_envelope() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/accounts/signup")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body["status"], 400);
  assert_eq!(body["message"], "Invalid request body");
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_requires_credentials() {
  let app = app().await;
  let (status, headers, body) = send(
    &app,
    "POST",
    "/posts",
    None,
    Some(json!({ "post_title": "t", "post_category": "Food", "post_content": "c" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(headers.contains_key(header::WWW_AUTHENTICATE));
  assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada").await;

  let (status, _, body) = send(
    &app,
    "POST",
    "/posts",
    Some(basic("ada@example.com", "nope")),
    Some(json!({ "post_title": "t", "post_category": "Food", "post_content": "c" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid credentials");
}

// ── Posts ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_and_comment_flow() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada Lovelace").await;
  sign_up(&app, "bob@example.com", "bob", "Bob").await;

  let first = create_post(&app, "ada@example.com", "First", "Food").await;
  let second = create_post(&app, "bob@example.com", "Second", "Travel").await;
  assert_eq!(first["author_name"], "Ada Lovelace");
  assert_eq!(first["author_username"], "ada");

  let first_id = first["post_id"].as_str().unwrap().to_owned();
  let (status, _, body) = send(
    &app,
    "POST",
    &format!("/posts/{first_id}/comments"),
    Some(basic("bob@example.com", PASSWORD)),
    Some(json!({ "comment_content": "Lovely" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "Comment added successfully");
  assert_eq!(body["data"]["comment_author_name"], "Bob");

  // Listing: newest first, counts attached.
  let (status, _, body) = send(&app, "GET", "/posts", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Posts fetched successfully");
  let posts = body["data"].as_array().unwrap();
  assert_eq!(posts.len(), 2);
  assert_eq!(posts[0]["post_id"], second["post_id"]);
  assert_eq!(posts[0]["comment_count"], 0);
  assert_eq!(posts[1]["post_id"], first["post_id"]);
  assert_eq!(posts[1]["comment_count"], 1);

  let (_, _, body) = send(&app, "GET", "/posts/category/Food", None, None).await;
  let posts = body["data"].as_array().unwrap();
  assert_eq!(posts.len(), 1);
  assert_eq!(posts[0]["comment_count"], 1);

  let (_, _, body) = send(&app, "GET", "/posts/author/Ada%20Lovelace", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 1);

  let (_, _, body) = send(&app, "GET", &format!("/posts/{first_id}/comments"), None, None).await;
  assert_eq!(body["message"], "Comments fetched successfully");
  assert_eq!(body["data"][0]["comment_content"], "Lovely");

  let (status, _, body) = send(&app, "GET", &format!("/posts/{first_id}"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"], first);

  let (_, _, body) = send(&app, "GET", &format!("/posts/{first_id}/detail"), None, None).await;
  assert_eq!(body["data"]["posted"], "just now");
  assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn related_posts_exclude_the_post() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada").await;

  let main = create_post(&app, "ada@example.com", "Main", "Travel").await;
  let other = create_post(&app, "ada@example.com", "Other", "Travel").await;

  let id = main["post_id"].as_str().unwrap();
  let (status, _, body) = send(&app, "GET", &format!("/posts/{id}/related"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  let by_author = body["data"]["by_author"].as_array().unwrap();
  let by_category = body["data"]["by_category"].as_array().unwrap();
  assert_eq!(by_author.len(), 1);
  assert_eq!(by_author[0]["post_id"], other["post_id"]);
  assert_eq!(by_category.len(), 1);
}

#[tokio::test]
async fn blank_post_is_rejected() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada").await;

  let (status, _, body) = send(
    &app,
    "POST",
    "/posts",
    Some(basic("ada@example.com", PASSWORD)),
    Some(json!({ "post_title": "  ", "post_category": "Food", "post_content": "c" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Failed to create post");
}

#[tokio::test]
async fn unknown_category_is_rejected() {
  let app = app().await;
  let (status, _, body) = send(&app, "GET", "/posts/category/Gardening", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Failed to fetch posts");
}

#[tokio::test]
async fn bad_or_missing_post_id() {
  let app = app().await;

  let (status, _, body) = send(&app, "GET", "/posts/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Failed to fetch post");

  let missing = uuid::Uuid::new_v4();
  let (status, _, body) = send(&app, "GET", &format!("/posts/{missing}"), None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], format!("post {missing} not found"));
}

#[tokio::test]
async fn comment_on_missing_post_is_rejected() {
  let app = app().await;
  sign_up(&app, "ada@example.com", "ada", "Ada").await;

  let missing = uuid::Uuid::new_v4();
  let (status, _, body) = send(
    &app,
    "POST",
    &format!("/posts/{missing}/comments"),
    Some(basic("ada@example.com", PASSWORD)),
    Some(json!({ "comment_content": "hello?" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Failed to add comment");
}

// ── Panics ───────────────────────────────────────────────────────────────────

async fn boom() -> &'static str { panic!("boom") }

#[tokio::test]
async fn panics_become_internal_error_envelopes() {
  let app = Router::new()
    .route("/boom", get(boom))
    .layer(CatchPanicLayer::custom(catch_panic));

  let (status, _, body) = send(&app, "GET", "/boom", None, None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(
    body,
    json!({ "status": 500, "message": "Internal server error", "error": "Something went wrong" })
  );
}
