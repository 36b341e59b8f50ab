//! Error types for `quill-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown post category: {0:?}")]
  UnknownCategory(String),

  #[error("invalid timestamp {value:?}: {reason}")]
  InvalidTimestamp { value: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
