//! HTTP Basic-auth extractor resolving the acting [`Author`].
//!
//! Credentials are `email:password`; they are checked against the identity
//! provider on every request via [`AccountService::sign_in`].
//!
//! [`AccountService::sign_in`]: quill_service::AccountService::sign_in

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quill_core::account::Author;

use crate::{AppState, Store, error::ApiError};

/// The signed-in account performing the request.
#[derive(Debug, Clone)]
pub struct CurrentAuthor(pub Author);

/// Pull `(email, password)` out of an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let missing = || ApiError::Unauthorized("Missing credentials".into());
  let malformed = || ApiError::Unauthorized("Malformed credentials".into());

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(missing)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or_else(malformed)?;
  let decoded = B64.decode(encoded).map_err(|_| malformed())?;
  let creds = String::from_utf8(decoded).map_err(|_| malformed())?;

  let (email, password) = creds.split_once(':').ok_or_else(malformed)?;
  Ok((email.to_owned(), password.to_owned()))
}

impl<S: Store> FromRequestParts<AppState<S>> for CurrentAuthor {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = basic_credentials(&parts.headers)?;
    let account = state.accounts.sign_in(&email, &password).await?;
    Ok(CurrentAuthor(Author::from(&account)))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn decodes_email_and_password() {
    let (email, password) =
      basic_credentials(&headers(&basic("ada@example.com", "pa:ss"))).unwrap();
    assert_eq!(email, "ada@example.com");
    assert_eq!(password, "pa:ss");
  }

  #[test]
  fn missing_header() {
    let err = basic_credentials(&HeaderMap::new()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref d) if d == "Missing credentials"));
  }

  #[test]
  fn invalid_base64() {
    let err = basic_credentials(&headers("Basic !!!not-base64!!!")).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
  }

  #[test]
  fn wrong_scheme() {
    let err = basic_credentials(&headers("Bearer abc")).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
  }

  #[test]
  fn no_separator() {
    let err = basic_credentials(&headers(&format!("Basic {}", B64.encode("nocolon")))).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
  }
}
