//! The envelope response wrapper and a JSON body extractor whose rejections
//! are envelopes too.

use axum::{
  Json,
  extract::{FromRequest, Request, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quill_service::Envelope;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Responses ───────────────────────────────────────────────────────────────

/// An [`Envelope`] sent with the HTTP status it carries.
#[derive(Debug)]
pub struct Reply<T>(pub Envelope<T>);

impl<T: Serialize> IntoResponse for Reply<T> {
  fn into_response(self) -> Response {
    let status =
      StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(self.0)).into_response()
  }
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// Like [`axum::Json`], but a malformed body becomes a 400 envelope.
#[derive(Debug)]
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    match Json::<T>::from_request(req, state).await {
      Ok(Json(value)) => Ok(Body(value)),
      Err(rejection) => Err(reject_body(rejection)),
    }
  }
}

fn reject_body(rejection: JsonRejection) -> ApiError {
  tracing::debug!(error = %rejection, "rejected request body");
  ApiError::invalid("Invalid request body", rejection.body_text())
}

// ─── Path segments ───────────────────────────────────────────────────────────

/// Parse a post id from the path, failing with `message` on garbage.
pub fn post_id(raw: &str, message: &'static str) -> Result<Uuid, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::invalid(message, format!("invalid post id {raw:?}")))
}
