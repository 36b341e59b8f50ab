//! Comments attached to posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Author;

/// A comment on a post. `comment_author_name` is copied from the commenter's
/// account when the comment is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:                  Uuid,
  pub comment_content:     String,
  pub post_id:             Uuid,
  pub user_id:             Uuid,
  pub comment_author_name: String,
  pub created_at:          DateTime<Utc>,
}

/// Input for [`ContentStore::insert_comment`](crate::store::ContentStore::insert_comment).
#[derive(Debug, Clone)]
pub struct NewComment {
  pub comment_content:     String,
  pub post_id:             Uuid,
  pub user_id:             Uuid,
  pub comment_author_name: String,
}

impl NewComment {
  pub fn by(author: &Author, post_id: Uuid, content: impl Into<String>) -> Self {
    NewComment {
      comment_content:     content.into(),
      post_id,
      user_id:             author.id,
      comment_author_name: author.name.clone(),
    }
  }
}
