//! [`SqliteStore`] and its [`ContentStore`] implementation.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quill_core::{
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostFilter},
  store::ContentStore,
};

use crate::{
  Result,
  encode::{RawComment, RawPost, decode_uuid, encode_dt, encode_uuid, storable_dt},
  schema::SCHEMA,
};

/// Upper bound on `?` placeholders per batched count query.
const COUNT_CHUNK: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quill store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = crate::Error;

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn insert_post(&self, input: NewPost, created_at: DateTime<Utc>) -> Result<Post> {
    let post = Post {
      post_id:         Uuid::new_v4(),
      post_title:      input.post_title,
      post_category:   input.post_category,
      post_content:    input.post_content,
      author_id:       input.author_id,
      author_name:     input.author_name,
      author_username: input.author_username,
      created_at:      storable_dt(created_at),
    };

    let post_id_str   = encode_uuid(post.post_id);
    let title         = post.post_title.clone();
    let category      = post.post_category.as_str();
    let content       = post.post_content.clone();
    let author_id_str = encode_uuid(post.author_id);
    let author_name   = post.author_name.clone();
    let author_handle = post.author_username.clone();
    let at_str        = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             post_id, post_title, post_category, post_content,
             author_id, author_name, author_username, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            post_id_str,
            title,
            category,
            content,
            author_id_str,
            author_name,
            author_handle,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(post_id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM posts WHERE post_id = ?1", RawPost::COLUMNS),
              rusqlite::params![id_str],
              RawPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
    let (where_clause, param): (&str, Option<String>) = match filter {
      PostFilter::All => ("", None),
      PostFilter::Category(c) => ("WHERE post_category = ?1", Some(c.as_str().to_owned())),
      PostFilter::Author(name) => ("WHERE author_name = ?1", Some(name.clone())),
    };

    let sql = format!(
      "SELECT {} FROM posts {where_clause} ORDER BY created_at DESC, rowid DESC",
      RawPost::COLUMNS
    );

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawPost::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawPost::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn insert_comment(
    &self,
    input: NewComment,
    created_at: DateTime<Utc>,
  ) -> Result<Comment> {
    let comment = Comment {
      id:                  Uuid::new_v4(),
      comment_content:     input.comment_content,
      post_id:             input.post_id,
      user_id:             input.user_id,
      comment_author_name: input.comment_author_name,
      created_at:          storable_dt(created_at),
    };

    let id_str      = encode_uuid(comment.id);
    let content     = comment.comment_content.clone();
    let post_id_str = encode_uuid(comment.post_id);
    let user_id_str = encode_uuid(comment.user_id);
    let author_name = comment.comment_author_name.clone();
    let at_str      = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             id, comment_content, post_id, user_id, comment_author_name, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, content, post_id_str, user_id_str, author_name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
    let id_str = encode_uuid(post_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at DESC, rowid DESC",
          RawComment::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn count_comments(&self, post_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(post_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn count_comments_batch(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
    if post_ids.is_empty() {
      return Ok(HashMap::new());
    }

    let chunks: Vec<Vec<String>> = post_ids
      .chunks(COUNT_CHUNK)
      .map(|chunk| chunk.iter().copied().map(encode_uuid).collect())
      .collect();

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut rows = Vec::new();
        for chunk in chunks {
          let placeholders = vec!["?"; chunk.len()].join(", ");
          let mut stmt = conn.prepare(&format!(
            "SELECT post_id, COUNT(*) FROM comments
             WHERE post_id IN ({placeholders})
             GROUP BY post_id"
          ))?;
          let counted = stmt
            .query_map(rusqlite::params_from_iter(chunk.iter()), |r| {
              Ok((r.get(0)?, r.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows.extend(counted);
        }
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, n)| Ok((decode_uuid(&id)?, n.max(0) as u64)))
      .collect()
  }
}
