//! Request-level failures and their envelope responses.
//!
//! Service failures travel inside a [`Reply`](crate::Reply); [`ApiError`]
//! covers what goes wrong before a service is reached: unreadable bodies,
//! bad path segments, blank fields, and failed authentication.

use axum::{
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use quill_service::{
  Envelope, Failure, SignInError,
  envelope::{INTERNAL_DETAIL, INTERNAL_MESSAGE, status},
};
use thiserror::Error;

use crate::extract::Reply;

#[derive(Debug, Error)]
pub enum ApiError {
  /// The request itself is unusable; answered with a 400 envelope.
  #[error("{message}: {detail}")]
  Invalid {
    message: &'static str,
    detail:  String,
  },

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("internal error")]
  Internal,
}

impl ApiError {
  pub fn invalid(message: &'static str, detail: impl Into<String>) -> Self {
    ApiError::Invalid { message, detail: detail.into() }
  }
}

impl From<SignInError> for ApiError {
  fn from(err: SignInError) -> Self {
    match err.status() {
      status::UNAUTHORIZED => ApiError::Unauthorized(err.detail()),
      _ => ApiError::Internal,
    }
  }
}

impl Failure for ApiError {
  fn status(&self) -> u16 {
    match self {
      ApiError::Invalid { .. } => status::BAD_REQUEST,
      ApiError::Unauthorized(_) => status::UNAUTHORIZED,
      ApiError::Internal => status::INTERNAL_SERVER_ERROR,
    }
  }

  fn message(&self) -> &'static str {
    match self {
      ApiError::Invalid { message, .. } => *message,
      ApiError::Unauthorized(_) => "Authentication required",
      ApiError::Internal => INTERNAL_MESSAGE,
    }
  }

  fn detail(&self) -> String {
    match self {
      ApiError::Invalid { detail, .. } => detail.clone(),
      ApiError::Unauthorized(detail) => detail.clone(),
      ApiError::Internal => INTERNAL_DETAIL.into(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let mut res = Reply(Envelope::<()>::failure(&self)).into_response();
    if matches!(self, ApiError::Unauthorized(_)) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"quill\""),
      );
    }
    res
  }
}
