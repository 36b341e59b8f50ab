//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with exactly six fractional
//! digits, so lexical order in SQL matches chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use quill_core::{
  account::{Account, Identity},
  comment::Comment,
  post::{Post, PostCategory},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so values handed back to callers
/// equal what a later read returns.
pub fn storable_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub id:         String,
  pub email:      String,
  pub username:   String,
  pub name:       String,
  pub created_at: String,
}

impl RawAccount {
  pub const COLUMNS: &'static str = "id, email, username, name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAccount {
      id:         row.get(0)?,
      email:      row.get(1)?,
      username:   row.get(2)?,
      name:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:         decode_uuid(&self.id)?,
      email:      self.email,
      username:   self.username,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// An `identities` row, including the password hash.
pub struct RawIdentity {
  pub identity_id:   String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id: decode_uuid(&self.identity_id)?,
      email:       self.email,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:         String,
  pub post_title:      String,
  pub post_category:   String,
  pub post_content:    String,
  pub author_id:       String,
  pub author_name:     String,
  pub author_username: String,
  pub created_at:      String,
}

impl RawPost {
  pub const COLUMNS: &'static str = "post_id, post_title, post_category, post_content, \
                                     author_id, author_name, author_username, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPost {
      post_id:         row.get(0)?,
      post_title:      row.get(1)?,
      post_category:   row.get(2)?,
      post_content:    row.get(3)?,
      author_id:       row.get(4)?,
      author_name:     row.get(5)?,
      author_username: row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:         decode_uuid(&self.post_id)?,
      post_title:      self.post_title,
      post_category:   PostCategory::parse(&self.post_category)?,
      post_content:    self.post_content,
      author_id:       decode_uuid(&self.author_id)?,
      author_name:     self.author_name,
      author_username: self.author_username,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub id:                  String,
  pub comment_content:     String,
  pub post_id:             String,
  pub user_id:             String,
  pub comment_author_name: String,
  pub created_at:          String,
}

impl RawComment {
  pub const COLUMNS: &'static str =
    "id, comment_content, post_id, user_id, comment_author_name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawComment {
      id:                  row.get(0)?,
      comment_content:     row.get(1)?,
      post_id:             row.get(2)?,
      user_id:             row.get(3)?,
      comment_author_name: row.get(4)?,
      created_at:          row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:                  decode_uuid(&self.id)?,
      comment_content:     self.comment_content,
      post_id:             decode_uuid(&self.post_id)?,
      user_id:             decode_uuid(&self.user_id)?,
      comment_author_name: self.comment_author_name,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}
