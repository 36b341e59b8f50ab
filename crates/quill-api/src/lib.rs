//! JSON HTTP API for Quill.
//!
//! Exposes an axum [`Router`] over [`AccountService`] and [`ContentService`],
//! backed by any store implementing every trait in [`quill_core::store`].
//! Every response body is an [`Envelope`](quill_service::Envelope) and the
//! HTTP status always equals the envelope's `status`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = quill_api::AppState::new(Arc::new(store));
//! axum::serve(listener, quill_api::router(state)).await?;
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod extract;
pub mod posts;

use std::{any::Any, sync::Arc};

use axum::{
  Router,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use quill_core::store::{AccountStore, ContentStore, IdentityProvider};
use quill_service::{AccountService, ContentService};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use error::ApiError;
pub use extract::Reply;

/// Everything the router needs from a storage backend.
pub trait Store: AccountStore + IdentityProvider + ContentStore + 'static {}

impl<S> Store for S where S: AccountStore + IdentityProvider + ContentStore + 'static {}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub accounts: AccountService<S, S>,
  pub content:  ContentService<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    AppState {
      accounts: self.accounts.clone(),
      content:  self.content.clone(),
    }
  }
}

impl<S: Store> AppState<S> {
  /// Both services over the same store.
  pub fn new(store: Arc<S>) -> Self {
    AppState {
      accounts: AccountService::new(store.clone(), store.clone()),
      content:  ContentService::new(store),
    }
  }

  /// See [`ContentService::with_count_concurrency`].
  pub fn with_count_concurrency(mut self, limit: usize) -> Self {
    self.content = self.content.with_count_concurrency(limit);
    self
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S: Store>(state: AppState<S>) -> Router {
  Router::new()
    // Accounts
    .route("/accounts/signup", post(accounts::sign_up::<S>))
    .route("/accounts/signin", post(accounts::sign_in::<S>))
    // Posts
    .route("/posts", get(posts::list_all::<S>).post(posts::create::<S>))
    .route("/posts/category/{category}", get(posts::list_by_category::<S>))
    .route("/posts/author/{author_name}", get(posts::list_by_author::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>))
    .route("/posts/{id}/detail", get(posts::detail::<S>))
    .route("/posts/{id}/related", get(posts::related::<S>))
    // Comments
    .route(
      "/posts/{id}/comments",
      get(posts::list_comments::<S>).post(posts::add_comment::<S>),
    )
    .layer(CatchPanicLayer::custom(catch_panic))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Turn a handler panic into the generic 500 envelope.
fn catch_panic(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = if let Some(s) = err.downcast_ref::<String>() {
    s.as_str()
  } else if let Some(s) = err.downcast_ref::<&str>() {
    s
  } else {
    "<unknown>"
  };
  tracing::error!(panic = detail, "request handler panicked");
  ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests;
