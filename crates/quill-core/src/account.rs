//! Accounts, authentication identities, and the acting-author context.
//!
//! An account is two records that live in different systems: an
//! [`Identity`] owned by the identity provider (credentials) and an
//! [`Account`] profile owned by the profile store. Both share one UUID.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The public profile record of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  /// Same UUID as the backing [`Identity`].
  pub id:         Uuid,
  pub email:      String,
  pub username:   String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Input for [`AccountStore::insert_account`](crate::store::AccountStore::insert_account).
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub id:       Uuid,
  pub email:    String,
  pub username: String,
  pub name:     String,
}

/// An authentication identity issued by the identity provider.
///
/// Carries no credential material; the password hash never leaves the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  pub email:       String,
  pub created_at:  DateTime<Utc>,
}

/// Everything a visitor submits to create an account.
#[derive(Clone, Deserialize)]
pub struct Registration {
  pub username: String,
  pub email:    String,
  pub name:     String,
  pub password: String,
}

impl Registration {
  /// `true` if any field is empty after trimming whitespace.
  pub fn has_blank_field(&self) -> bool {
    [&self.username, &self.email, &self.name, &self.password]
      .iter()
      .any(|f| f.trim().is_empty())
  }
}

impl fmt::Debug for Registration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registration")
      .field("username", &self.username)
      .field("email", &self.email)
      .field("name", &self.name)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// The account on whose behalf a write is performed.
///
/// Passed explicitly into every operation that stamps author fields onto a
/// post or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
  pub id:       Uuid,
  pub name:     String,
  pub username: String,
}

impl From<&Account> for Author {
  fn from(account: &Account) -> Self {
    Author {
      id:       account.id,
      name:     account.name.clone(),
      username: account.username.clone(),
    }
  }
}
