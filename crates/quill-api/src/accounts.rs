//! Handlers for `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/accounts/signup` | Body: [`Registration`]; 201 + the new account |
//! | `POST` | `/accounts/signin` | Body: [`SignInBody`]; 200 + the account |

use axum::extract::State;
use quill_core::account::{Account, Registration};
use quill_service::{
  Envelope,
  account::{SIGNED_IN, SIGNED_UP},
};
use serde::Deserialize;

use crate::{AppState, Store, error::ApiError, extract::{Body, Reply}};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// `POST /accounts/signup`
pub async fn sign_up<S: Store>(
  State(state): State<AppState<S>>,
  Body(registration): Body<Registration>,
) -> Result<Reply<Account>, ApiError> {
  if registration.has_blank_field() {
    return Err(ApiError::invalid(ALL_FIELDS_REQUIRED, ALL_FIELDS_REQUIRED));
  }
  let result = state.accounts.sign_up(registration).await;
  Ok(Reply(Envelope::from_result(SIGNED_UP, result)))
}

/// Not `Debug`: carries a plaintext password.
#[derive(Deserialize)]
pub struct SignInBody {
  pub email:    String,
  pub password: String,
}

/// `POST /accounts/signin`
pub async fn sign_in<S: Store>(
  State(state): State<AppState<S>>,
  Body(body): Body<SignInBody>,
) -> Reply<Account> {
  let result = state.accounts.sign_in(&body.email, &body.password).await;
  Reply(Envelope::from_result(SIGNED_IN, result))
}
