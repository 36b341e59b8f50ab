//! Posts, comments, and the comment-count aggregation behind post listings.

use std::{collections::HashMap, error::Error as StdError, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use futures::future;
use quill_core::{
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostCategory, PostFilter, PostWithCount},
  relative_time,
  store::{ContentStore, StoreError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::envelope::{Failure, INTERNAL_DETAIL, INTERNAL_MESSAGE, Success, status};

pub const POST_CREATED: Success = Success::created("Post created successfully");
pub const POSTS_FETCHED: Success = Success::ok("Posts fetched successfully");
pub const POST_FETCHED: Success = Success::ok("Post fetched successfully");
pub const RELATED_FETCHED: Success = Success::ok("Related posts fetched successfully");
pub const COMMENTS_FETCHED: Success = Success::ok("Comments fetched successfully");
pub const COMMENT_ADDED: Success = Success::created("Comment added successfully");

/// Default number of per-post count lookups in flight at once when the
/// batched count query is unavailable.
pub const DEFAULT_COUNT_CONCURRENCY: usize = 16;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The content operation a failure belongs to; picks the envelope message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  CreatePost,
  FetchPosts,
  FetchPost,
  FetchComments,
  AddComment,
}

impl Operation {
  fn failure_message(self) -> &'static str {
    match self {
      Operation::CreatePost => "Failed to create post",
      Operation::FetchPosts => "Failed to fetch posts",
      Operation::FetchPost => "Failed to fetch post",
      Operation::FetchComments => "Failed to fetch comments",
      Operation::AddComment => "Failed to add comment",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Operation::CreatePost => "create_post",
      Operation::FetchPosts => "fetch_posts",
      Operation::FetchPost => "fetch_post",
      Operation::FetchComments => "fetch_comments",
      Operation::AddComment => "add_comment",
    })
  }
}

#[derive(Debug, Error)]
pub enum ContentError {
  /// The store refused the request; `detail` is its message.
  #[error("{op}: {detail}")]
  Rejected { op: Operation, detail: String },

  #[error("{op}: post {post_id} not found")]
  PostNotFound { op: Operation, post_id: Uuid },

  #[error("{op}: unexpected failure: {source}")]
  Unexpected {
    op:     Operation,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
  },
}

impl ContentError {
  pub fn operation(&self) -> Operation {
    match self {
      ContentError::Rejected { op, .. }
      | ContentError::PostNotFound { op, .. }
      | ContentError::Unexpected { op, .. } => *op,
    }
  }

  /// Classify a store error, logging it with the current span's inputs.
  fn from_store<E: StoreError>(op: Operation, err: E) -> Self {
    if err.is_rejection() {
      tracing::warn!(operation = %op, error = %err, "store rejected request");
      ContentError::Rejected { op, detail: err.to_string() }
    } else {
      tracing::error!(operation = %op, error = ?err, "unexpected store failure");
      ContentError::Unexpected { op, source: Box::new(err) }
    }
  }
}

impl Failure for ContentError {
  fn status(&self) -> u16 {
    match self {
      ContentError::Rejected { .. } | ContentError::PostNotFound { .. } => status::BAD_REQUEST,
      ContentError::Unexpected { .. } => status::INTERNAL_SERVER_ERROR,
    }
  }

  fn message(&self) -> &'static str {
    match self {
      ContentError::Unexpected { .. } => INTERNAL_MESSAGE,
      other => other.operation().failure_message(),
    }
  }

  fn detail(&self) -> String {
    match self {
      ContentError::Rejected { detail, .. } => detail.clone(),
      ContentError::PostNotFound { post_id, .. } => format!("post {post_id} not found"),
      ContentError::Unexpected { .. } => INTERNAL_DETAIL.into(),
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A post with its comments, as shown on the post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
  pub post:     Post,
  pub comments: Vec<Comment>,
  /// `post.created_at` rendered relative to the time of the request.
  pub posted:   String,
}

/// Other posts sharing the author or the category of a given post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPosts {
  pub by_author:   Vec<PostWithCount>,
  pub by_category: Vec<PostWithCount>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Creates and reads posts and comments.
pub struct ContentService<S> {
  store:             Arc<S>,
  count_concurrency: usize,
}

impl<S> Clone for ContentService<S> {
  fn clone(&self) -> Self {
    ContentService {
      store:             Arc::clone(&self.store),
      count_concurrency: self.count_concurrency,
    }
  }
}

impl<S: ContentStore> ContentService<S> {
  pub fn new(store: Arc<S>) -> Self {
    ContentService { store, count_concurrency: DEFAULT_COUNT_CONCURRENCY }
  }

  /// Cap the number of per-post count lookups issued at once. Zero is
  /// treated as one.
  pub fn with_count_concurrency(mut self, limit: usize) -> Self {
    self.count_concurrency = limit.max(1);
    self
  }

  /// `ts` rendered relative to now; see [`relative_time::format_relative_date`].
  pub fn format_relative_date(ts: DateTime<Utc>) -> String {
    relative_time::format_relative_date(ts, Utc::now())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Store `input` verbatim, stamped with the current time.
  #[tracing::instrument(
    name = "content.create_post",
    skip_all,
    fields(title = %input.post_title, category = %input.post_category, author_id = %input.author_id)
  )]
  pub async fn create_post(&self, input: NewPost) -> Result<Post, ContentError> {
    let post = self
      .store
      .insert_post(input, Utc::now())
      .await
      .map_err(|e| ContentError::from_store(Operation::CreatePost, e))?;
    tracing::info!(post_id = %post.post_id, "post created");
    Ok(post)
  }

  #[tracing::instrument(
    name = "content.add_comment",
    skip_all,
    fields(post_id = %input.post_id, user_id = %input.user_id)
  )]
  pub async fn add_comment(&self, input: NewComment) -> Result<Comment, ContentError> {
    let comment = self
      .store
      .insert_comment(input, Utc::now())
      .await
      .map_err(|e| ContentError::from_store(Operation::AddComment, e))?;
    tracing::debug!(comment_id = %comment.id, "comment added");
    Ok(comment)
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  #[tracing::instrument(name = "content.fetch_all_posts", skip(self))]
  pub async fn fetch_all_posts(&self) -> Result<Vec<PostWithCount>, ContentError> {
    self.list_with_counts(PostFilter::All).await
  }

  #[tracing::instrument(name = "content.fetch_posts_by_category", skip(self))]
  pub async fn fetch_posts_by_category(
    &self,
    category: PostCategory,
  ) -> Result<Vec<PostWithCount>, ContentError> {
    self.list_with_counts(PostFilter::Category(category)).await
  }

  #[tracing::instrument(name = "content.fetch_posts_by_author", skip(self))]
  pub async fn fetch_posts_by_author(
    &self,
    author_name: &str,
  ) -> Result<Vec<PostWithCount>, ContentError> {
    self
      .list_with_counts(PostFilter::Author(author_name.to_owned()))
      .await
  }

  // ── Single post ───────────────────────────────────────────────────────────

  #[tracing::instrument(name = "content.fetch_post_by_id", skip(self))]
  pub async fn fetch_post_by_id(&self, post_id: Uuid) -> Result<Post, ContentError> {
    self
      .store
      .get_post(post_id)
      .await
      .map_err(|e| ContentError::from_store(Operation::FetchPost, e))?
      .ok_or(ContentError::PostNotFound { op: Operation::FetchPost, post_id })
  }

  #[tracing::instrument(name = "content.fetch_post_comments", skip(self))]
  pub async fn fetch_post_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, ContentError> {
    self
      .store
      .list_comments(post_id)
      .await
      .map_err(|e| ContentError::from_store(Operation::FetchComments, e))
  }

  /// The post and its comments, fetched concurrently.
  #[tracing::instrument(name = "content.fetch_post_detail", skip(self))]
  pub async fn fetch_post_detail(&self, post_id: Uuid) -> Result<PostDetail, ContentError> {
    let (post, comments) = future::try_join(
      self.fetch_post_by_id(post_id),
      self.fetch_post_comments(post_id),
    )
    .await?;

    let posted = Self::format_relative_date(post.created_at);
    Ok(PostDetail { post, comments, posted })
  }

  /// Posts by the same author and in the same category, excluding the post
  /// itself. The two listings are fetched concurrently.
  #[tracing::instrument(name = "content.fetch_related_posts", skip(self))]
  pub async fn fetch_related_posts(&self, post_id: Uuid) -> Result<RelatedPosts, ContentError> {
    let post = self.fetch_post_by_id(post_id).await?;

    let (mut by_author, mut by_category) = future::try_join(
      self.list_with_counts(PostFilter::Author(post.author_name.clone())),
      self.list_with_counts(PostFilter::Category(post.post_category)),
    )
    .await?;

    by_author.retain(|p| p.post.post_id != post_id);
    by_category.retain(|p| p.post.post_id != post_id);
    Ok(RelatedPosts { by_author, by_category })
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  async fn list_with_counts(&self, filter: PostFilter) -> Result<Vec<PostWithCount>, ContentError> {
    let posts = self
      .store
      .list_posts(&filter)
      .await
      .map_err(|e| ContentError::from_store(Operation::FetchPosts, e))?;
    Ok(self.attach_counts(posts).await)
  }

  /// Pair every post with its comment count. Never fails: counts that cannot
  /// be determined are reported as zero.
  async fn attach_counts(&self, posts: Vec<Post>) -> Vec<PostWithCount> {
    let ids: Vec<Uuid> = posts.iter().map(|p| p.post_id).collect();

    let counts = match self.store.count_comments_batch(&ids).await {
      Ok(counts) => counts,
      Err(e) => {
        tracing::warn!(error = %e, posts = ids.len(), "batched comment count failed; counting per post");
        self.count_each(&ids).await
      }
    };

    posts
      .into_iter()
      .map(|post| {
        let comment_count = counts.get(&post.post_id).copied().unwrap_or(0);
        PostWithCount { post, comment_count }
      })
      .collect()
  }

  /// Per-post fan-out, at most `count_concurrency` lookups in flight.
  async fn count_each(&self, ids: &[Uuid]) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(self.count_concurrency) {
      let mut lookups = Vec::with_capacity(chunk.len());
      for &post_id in chunk {
        lookups.push(self.comment_count(post_id));
      }
      let found = future::join_all(lookups).await;
      counts.extend(chunk.iter().copied().zip(found));
    }
    counts
  }

  /// Number of comments on `post_id`, or zero if the lookup fails.
  pub(crate) async fn comment_count(&self, post_id: Uuid) -> u64 {
    match self.store.count_comments(post_id).await {
      Ok(n) => n,
      Err(e) => {
        tracing::warn!(%post_id, error = %e, "comment count failed; reporting 0");
        0
      }
    }
  }
}
