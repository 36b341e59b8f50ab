//! Posts and post categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, account::Author};

// ─── Category ────────────────────────────────────────────────────────────────

/// The fixed set of categories a post can be filed under.
///
/// The string form is the capitalised English name, both on the wire and in
/// storage.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum PostCategory {
  Technology,
  Health,
  Beauty,
  Lifestyle,
  Food,
  Travel,
  Business,
  Education,
  Sports,
  Entertainment,
}

impl PostCategory {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownCategory(s.to_owned()))
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A published post. Author fields are copied from the author's account at
/// creation time and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:         Uuid,
  pub post_title:      String,
  pub post_category:   PostCategory,
  /// Rich text (HTML) as produced by the editor; stored verbatim.
  pub post_content:    String,
  pub author_id:       Uuid,
  pub author_name:     String,
  pub author_username: String,
  pub created_at:      DateTime<Utc>,
}

/// Input for [`ContentStore::insert_post`](crate::store::ContentStore::insert_post).
#[derive(Debug, Clone)]
pub struct NewPost {
  pub post_title:      String,
  pub post_category:   PostCategory,
  pub post_content:    String,
  pub author_id:       Uuid,
  pub author_name:     String,
  pub author_username: String,
}

impl NewPost {
  /// Build a post draft stamped with `author`'s denormalised fields.
  pub fn by(
    author: &Author,
    title: impl Into<String>,
    category: PostCategory,
    content: impl Into<String>,
  ) -> Self {
    NewPost {
      post_title:      title.into(),
      post_category:   category,
      post_content:    content.into(),
      author_id:       author.id,
      author_name:     author.name.clone(),
      author_username: author.username.clone(),
    }
  }
}

/// A post annotated with the number of comments referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithCount {
  #[serde(flatten)]
  pub post:          Post,
  pub comment_count: u64,
}

/// Which posts a listing should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
  All,
  Category(PostCategory),
  /// Exact match on the denormalised `author_name`.
  Author(String),
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn category_string_roundtrip() {
    for category in PostCategory::iter() {
      assert_eq!(PostCategory::parse(category.as_str()).unwrap(), category);
    }
    assert_eq!(PostCategory::iter().count(), 10);
  }

  #[test]
  fn unknown_category_is_rejected() {
    let err = PostCategory::parse("Gardening").unwrap_err();
    assert!(matches!(err, Error::UnknownCategory(ref s) if s == "Gardening"));
  }

  #[test]
  fn category_serializes_capitalised() {
    let json = serde_json::to_string(&PostCategory::Technology).unwrap();
    assert_eq!(json, "\"Technology\"");
  }

  #[test]
  fn post_with_count_flattens() {
    let post = Post {
      post_id:         Uuid::nil(),
      post_title:      "X".into(),
      post_category:   PostCategory::Food,
      post_content:    "<p>hi</p>".into(),
      author_id:       Uuid::nil(),
      author_name:     "Ada".into(),
      author_username: "ada".into(),
      created_at:      Utc::now(),
    };
    let value = serde_json::to_value(PostWithCount { post, comment_count: 3 }).unwrap();
    assert_eq!(value["post_title"], "X");
    assert_eq!(value["post_category"], "Food");
    assert_eq!(value["comment_count"], 3);
  }
}
