//! The `{status, message, data?, error?}` response envelope.
//!
//! `status` is an HTTP status code even when the envelope travels over
//! something other than HTTP. `message` is a short human-readable summary;
//! `error` carries detail on failure and never exposes internals for
//! unexpected faults.

use serde::{Deserialize, Serialize};

pub mod status {
  pub const OK: u16 = 200;
  pub const CREATED: u16 = 201;
  pub const BAD_REQUEST: u16 = 400;
  pub const UNAUTHORIZED: u16 = 401;
  pub const CONFLICT: u16 = 409;
  pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Message for any fault the caller should not see the details of.
pub const INTERNAL_MESSAGE: &str = "Internal server error";
/// Detail paired with [`INTERNAL_MESSAGE`].
pub const INTERNAL_DETAIL: &str = "Something went wrong";

/// A service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub status:  u16,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

/// How an error is presented in an [`Envelope`].
pub trait Failure: std::error::Error {
  fn status(&self) -> u16;
  fn message(&self) -> &'static str;
  /// Text for the envelope's `error` field.
  fn detail(&self) -> String;
}

/// Status and message used when an operation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Success {
  pub status:  u16,
  pub message: &'static str,
}

impl Success {
  pub const fn ok(message: &'static str) -> Self { Success { status: status::OK, message } }

  pub const fn created(message: &'static str) -> Self {
    Success { status: status::CREATED, message }
  }
}

impl<T> Envelope<T> {
  pub fn success(outcome: Success, data: T) -> Self {
    Envelope {
      status:  outcome.status,
      message: outcome.message.to_owned(),
      data:    Some(data),
      error:   None,
    }
  }

  pub fn failure<E: Failure + ?Sized>(err: &E) -> Self {
    Envelope {
      status:  err.status(),
      message: err.message().to_owned(),
      data:    None,
      error:   Some(err.detail()),
    }
  }

  /// A failure built from parts, for rejections that never reach a service.
  pub fn rejected(status: u16, message: impl Into<String>, detail: impl Into<String>) -> Self {
    Envelope {
      status,
      message: message.into(),
      data: None,
      error: Some(detail.into()),
    }
  }

  /// The generic 500 envelope.
  pub fn internal() -> Self {
    Self::rejected(status::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE, INTERNAL_DETAIL)
  }

  pub fn from_result<E: Failure>(outcome: Success, result: Result<T, E>) -> Self {
    match result {
      Ok(data) => Self::success(outcome, data),
      Err(err) => Self::failure(&err),
    }
  }

  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("boom")]
  struct Boom;

  impl Failure for Boom {
    fn status(&self) -> u16 { status::CONFLICT }
    fn message(&self) -> &'static str { "Conflict happened" }
    fn detail(&self) -> String { "boom".into() }
  }

  #[test]
  fn success_omits_error_field() {
    let env = Envelope::success(Success::created("Made it"), 7);
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(json, serde_json::json!({ "status": 201, "message": "Made it", "data": 7 }));
    assert!(env.is_success());
  }

  #[test]
  fn failure_omits_data_field() {
    let env: Envelope<u32> = Envelope::from_result(Success::ok("fine"), Err(Boom));
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "status": 409, "message": "Conflict happened", "error": "boom" })
    );
    assert!(!env.is_success());
  }

  #[test]
  fn internal_envelope_is_generic() {
    let env: Envelope<()> = Envelope::internal();
    assert_eq!(env.status, 500);
    assert_eq!(env.message, "Internal server error");
    assert_eq!(env.error.as_deref(), Some("Something went wrong"));
  }
}
