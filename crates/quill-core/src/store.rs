//! Storage traits consumed by the services.
//!
//! The traits are implemented by storage backends (e.g. `quill-store-sqlite`).
//! The service layer depends on these abstractions, never on a concrete
//! backend. Identity issuance and profile storage are separate traits because
//! they may be backed by separate systems; nothing spans a transaction across
//! them.

use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  account::{Account, Identity, NewAccount},
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostFilter},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error type shared by every storage trait.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the store refused the request itself (constraint violation,
  /// unknown referenced row, duplicate identity); `false` when it failed to
  /// carry it out at all.
  fn is_rejection(&self) -> bool;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Profile records for registered users.
pub trait AccountStore: Send + Sync {
  type Error: StoreError;

  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn find_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Persist a profile. Fails if the id, email or username is already taken.
  fn insert_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;
}

// ─── Identities ──────────────────────────────────────────────────────────────

/// Issues and revokes authentication identities for email/password pairs.
pub trait IdentityProvider: Send + Sync {
  type Error: StoreError;

  /// Create an identity. Rejected if `email` already has one.
  fn create_identity<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + 'a;

  /// Remove an identity. Deleting an unknown id is not an error.
  fn delete_identity(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Check credentials. `None` means unknown email or wrong password.
  fn verify_credentials<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// Posts and comments.
///
/// Every listing is ordered by `created_at`, newest first; rows sharing a
/// timestamp come back most recently inserted first.
pub trait ContentStore: Send + Sync {
  type Error: StoreError;

  /// Persist a post. The store assigns `post_id`; `created_at` is supplied by
  /// the caller.
  fn insert_post(
    &self,
    input: NewPost,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  fn list_posts<'a>(
    &'a self,
    filter: &'a PostFilter,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Persist a comment. Rejected if `input.post_id` names no post.
  fn insert_comment(
    &self,
    input: NewComment,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn list_comments(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn count_comments(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Count comments for many posts in one round trip. Posts without comments
  /// may be missing from the returned map.
  fn count_comments_batch<'a>(
    &'a self,
    post_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<HashMap<Uuid, u64>, Self::Error>> + Send + 'a;
}
