//! Error type for `quill-store-sqlite`.

use quill_core::store::StoreError;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quill_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("User already registered")]
  IdentityExists(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("blocking task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// `true` for UNIQUE, FOREIGN KEY, NOT NULL and CHECK failures.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.code == ErrorCode::ConstraintViolation
    )
  }
}

impl StoreError for Error {
  fn is_rejection(&self) -> bool {
    matches!(self, Error::IdentityExists(_)) || self.is_constraint_violation()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
