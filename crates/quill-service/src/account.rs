//! Account creation and sign-in.
//!
//! Sign-up spans two collaborators that share no transaction: the identity
//! provider and the profile store. If the profile insert fails after an
//! identity was issued, the identity is deleted again (once, best effort).

use std::{error::Error as StdError, sync::Arc};

use quill_core::{
  account::{Account, NewAccount, Registration},
  store::{AccountStore, IdentityProvider, StoreError},
};
use thiserror::Error;
use uuid::Uuid;

use crate::envelope::{Failure, INTERNAL_DETAIL, INTERNAL_MESSAGE, Success, status};

pub const SIGNED_UP: Success = Success::created("Account created successfully");
pub const SIGNED_IN: Success = Success::ok("Signed in successfully");

/// Detail used when the identity provider gives no usable message.
const SIGN_UP_FAILED: &str = "Sign up failed";

type BoxError = Box<dyn StdError + Send + Sync>;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SignUpError {
  #[error("email already taken")]
  EmailTaken,

  #[error("username already taken")]
  UsernameTaken,

  /// The identity provider refused or failed to issue an identity.
  #[error("identity creation failed: {0}")]
  IdentityCreationFailed(String),

  /// The profile insert failed; the identity has been (or was attempted to
  /// be) deleted again.
  #[error("profile creation failed: {0}")]
  ProfileCreationFailed(#[source] BoxError),

  #[error("unexpected failure while {stage}: {source}")]
  Unexpected {
    stage:  &'static str,
    #[source]
    source: BoxError,
  },
}

impl Failure for SignUpError {
  fn status(&self) -> u16 {
    match self {
      SignUpError::EmailTaken | SignUpError::UsernameTaken => status::CONFLICT,
      SignUpError::IdentityCreationFailed(_) => status::BAD_REQUEST,
      SignUpError::ProfileCreationFailed(_) | SignUpError::Unexpected { .. } => {
        status::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn message(&self) -> &'static str {
    match self {
      SignUpError::EmailTaken => "User with this email already exists",
      SignUpError::UsernameTaken => "Username is already taken",
      SignUpError::IdentityCreationFailed(_) => "Failed to create account",
      SignUpError::ProfileCreationFailed(_) => "Failed to create user profile",
      SignUpError::Unexpected { .. } => INTERNAL_MESSAGE,
    }
  }

  fn detail(&self) -> String {
    match self {
      SignUpError::EmailTaken => "Email already taken".into(),
      SignUpError::UsernameTaken => "Username already taken".into(),
      SignUpError::IdentityCreationFailed(reason) => reason.clone(),
      SignUpError::ProfileCreationFailed(_) => INTERNAL_MESSAGE.into(),
      SignUpError::Unexpected { .. } => INTERNAL_DETAIL.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum SignInError {
  #[error("invalid credentials")]
  InvalidCredentials,

  /// Credentials were valid but no profile exists for the identity.
  #[error("no profile for identity {0}")]
  MissingProfile(Uuid),

  #[error("unexpected failure while {stage}: {source}")]
  Unexpected {
    stage:  &'static str,
    #[source]
    source: BoxError,
  },
}

impl Failure for SignInError {
  fn status(&self) -> u16 {
    match self {
      SignInError::InvalidCredentials | SignInError::MissingProfile(_) => status::UNAUTHORIZED,
      SignInError::Unexpected { .. } => status::INTERNAL_SERVER_ERROR,
    }
  }

  fn message(&self) -> &'static str {
    match self {
      SignInError::InvalidCredentials | SignInError::MissingProfile(_) => {
        "Invalid email or password"
      }
      SignInError::Unexpected { .. } => INTERNAL_MESSAGE,
    }
  }

  fn detail(&self) -> String {
    match self {
      SignInError::InvalidCredentials | SignInError::MissingProfile(_) => {
        "Invalid credentials".into()
      }
      SignInError::Unexpected { .. } => INTERNAL_DETAIL.into(),
    }
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Creates accounts and resolves credentials to accounts.
pub struct AccountService<A, I> {
  accounts:   Arc<A>,
  identities: Arc<I>,
}

impl<A, I> Clone for AccountService<A, I> {
  fn clone(&self) -> Self {
    AccountService {
      accounts:   Arc::clone(&self.accounts),
      identities: Arc::clone(&self.identities),
    }
  }
}

impl<A, I> AccountService<A, I>
where
  A: AccountStore,
  I: IdentityProvider,
{
  pub fn new(accounts: Arc<A>, identities: Arc<I>) -> Self { AccountService { accounts, identities } }

  /// Register a new account.
  ///
  /// Email and username are checked before any identity is issued, so the
  /// common duplicate case has no side effects. A concurrent duplicate that
  /// slips past the checks surfaces as [`SignUpError::ProfileCreationFailed`].
  #[tracing::instrument(
    name = "account.sign_up",
    skip_all,
    fields(email = %registration.email, username = %registration.username)
  )]
  pub async fn sign_up(&self, registration: Registration) -> Result<Account, SignUpError> {
    let Registration { username, email, name, password } = registration;

    if self
      .accounts
      .find_by_email(&email)
      .await
      .map_err(|e| unexpected_sign_up("checking email", e))?
      .is_some()
    {
      return Err(SignUpError::EmailTaken);
    }

    if self
      .accounts
      .find_by_username(&username)
      .await
      .map_err(|e| unexpected_sign_up("checking username", e))?
      .is_some()
    {
      return Err(SignUpError::UsernameTaken);
    }

    let identity = match self.identities.create_identity(&email, &password).await {
      Ok(identity) => identity,
      Err(e) if e.is_rejection() => {
        tracing::warn!(error = %e, "identity provider refused sign-up");
        return Err(SignUpError::IdentityCreationFailed(e.to_string()));
      }
      Err(e) => {
        tracing::error!(error = %e, "identity provider failed during sign-up");
        return Err(SignUpError::IdentityCreationFailed(SIGN_UP_FAILED.into()));
      }
    };

    let profile = NewAccount { id: identity.identity_id, email, username, name };

    match self.accounts.insert_account(profile).await {
      Ok(account) => {
        tracing::info!(account_id = %account.id, "account created");
        Ok(account)
      }
      Err(e) => {
        tracing::error!(
          identity_id = %identity.identity_id,
          error = %e,
          "profile insert failed; deleting identity"
        );
        self.discard_identity(identity.identity_id).await;
        Err(SignUpError::ProfileCreationFailed(Box::new(e)))
      }
    }
  }

  /// Resolve an email/password pair to its account.
  #[tracing::instrument(name = "account.sign_in", skip(self, password))]
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<Account, SignInError> {
    let identity = self
      .identities
      .verify_credentials(email, password)
      .await
      .map_err(|e| unexpected_sign_in("verifying credentials", e))?
      .ok_or(SignInError::InvalidCredentials)?;

    match self.accounts.find_by_id(identity.identity_id).await {
      Ok(Some(account)) => Ok(account),
      Ok(None) => {
        tracing::error!(
          identity_id = %identity.identity_id,
          "orphaned identity: credentials valid but no profile exists"
        );
        Err(SignInError::MissingProfile(identity.identity_id))
      }
      Err(e) => Err(unexpected_sign_in("loading profile", e)),
    }
  }

  /// Compensating delete after a failed profile insert. Never retried; a
  /// failure leaves an orphaned identity behind and is logged as such.
  async fn discard_identity(&self, identity_id: Uuid) {
    if let Err(e) = self.identities.delete_identity(identity_id).await {
      tracing::error!(
        %identity_id,
        error = %e,
        "orphaned identity: compensating delete failed"
      );
    }
  }
}

fn unexpected_sign_up<E: StoreError>(stage: &'static str, err: E) -> SignUpError {
  tracing::error!(stage, error = %err, "unexpected store failure during sign-up");
  SignUpError::Unexpected { stage, source: Box::new(err) }
}

fn unexpected_sign_in<E: StoreError>(stage: &'static str, err: E) -> SignInError {
  tracing::error!(stage, error = %err, "unexpected store failure during sign-in");
  SignInError::Unexpected { stage, source: Box::new(err) }
}
