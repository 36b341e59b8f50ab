//! Handlers for `/posts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/posts` | Every post with its comment count, newest first |
//! | `POST` | `/posts` | Basic auth; body: [`CreatePostBody`]; 201 + stored post |
//! | `GET`  | `/posts/category/{category}` | Category name, e.g. `Travel` |
//! | `GET`  | `/posts/author/{author_name}` | Exact display name |
//! | `GET`  | `/posts/{id}` | Single post |
//! | `GET`  | `/posts/{id}/detail` | Post, comments, and relative date |
//! | `GET`  | `/posts/{id}/related` | Same author / same category, excluding the post |
//! | `GET`  | `/posts/{id}/comments` | Newest first |
//! | `POST` | `/posts/{id}/comments` | Basic auth; body: [`CommentBody`] |

use axum::extract::{Path, State};
use quill_core::{
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostCategory, PostWithCount},
};
use quill_service::{
  Envelope,
  content::{
    COMMENT_ADDED, COMMENTS_FETCHED, POST_CREATED, POST_FETCHED, POSTS_FETCHED,
    PostDetail, RELATED_FETCHED, RelatedPosts,
  },
};
use serde::Deserialize;

use crate::{
  AppState, Store,
  auth::CurrentAuthor,
  error::ApiError,
  extract::{Body, Reply, post_id},
};

// ─── Listings ────────────────────────────────────────────────────────────────

/// `GET /posts`
pub async fn list_all<S: Store>(State(state): State<AppState<S>>) -> Reply<Vec<PostWithCount>> {
  Reply(Envelope::from_result(POSTS_FETCHED, state.content.fetch_all_posts().await))
}

/// `GET /posts/category/{category}`
pub async fn list_by_category<S: Store>(
  State(state): State<AppState<S>>,
  Path(category): Path<String>,
) -> Result<Reply<Vec<PostWithCount>>, ApiError> {
  let category = PostCategory::parse(&category)
    .map_err(|e| ApiError::invalid("Failed to fetch posts", e.to_string()))?;
  let result = state.content.fetch_posts_by_category(category).await;
  Ok(Reply(Envelope::from_result(POSTS_FETCHED, result)))
}

/// `GET /posts/author/{author_name}`
pub async fn list_by_author<S: Store>(
  State(state): State<AppState<S>>,
  Path(author_name): Path<String>,
) -> Reply<Vec<PostWithCount>> {
  let result = state.content.fetch_posts_by_author(&author_name).await;
  Reply(Envelope::from_result(POSTS_FETCHED, result))
}

// ─── Single post ─────────────────────────────────────────────────────────────

/// `GET /posts/{id}`
pub async fn get_one<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Reply<Post>, ApiError> {
  let id = post_id(&id, "Failed to fetch post")?;
  let result = state.content.fetch_post_by_id(id).await;
  Ok(Reply(Envelope::from_result(POST_FETCHED, result)))
}

/// `GET /posts/{id}/detail`
pub async fn detail<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Reply<PostDetail>, ApiError> {
  let id = post_id(&id, "Failed to fetch post")?;
  let result = state.content.fetch_post_detail(id).await;
  Ok(Reply(Envelope::from_result(POST_FETCHED, result)))
}

/// `GET /posts/{id}/related`
pub async fn related<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Reply<RelatedPosts>, ApiError> {
  let id = post_id(&id, "Failed to fetch posts")?;
  let result = state.content.fetch_related_posts(id).await;
  Ok(Reply(Envelope::from_result(RELATED_FETCHED, result)))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts`. Author fields come from the
/// authenticated account, never from the body.
#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
  pub post_title:    String,
  pub post_category: PostCategory,
  pub post_content:  String,
}

/// `POST /posts`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  CurrentAuthor(author): CurrentAuthor,
  Body(body): Body<CreatePostBody>,
) -> Result<Reply<Post>, ApiError> {
  if body.post_title.trim().is_empty() || body.post_content.trim().is_empty() {
    return Err(ApiError::invalid(
      "Failed to create post",
      "Title and content are required",
    ));
  }
  let input = NewPost::by(&author, body.post_title, body.post_category, body.post_content);
  let result = state.content.create_post(input).await;
  Ok(Reply(Envelope::from_result(POST_CREATED, result)))
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// `GET /posts/{id}/comments`
pub async fn list_comments<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Reply<Vec<Comment>>, ApiError> {
  let id = post_id(&id, "Failed to fetch comments")?;
  let result = state.content.fetch_post_comments(id).await;
  Ok(Reply(Envelope::from_result(COMMENTS_FETCHED, result)))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub comment_content: String,
}

/// `POST /posts/{id}/comments`
pub async fn add_comment<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  CurrentAuthor(author): CurrentAuthor,
  Body(body): Body<CommentBody>,
) -> Result<Reply<Comment>, ApiError> {
  let id = post_id(&id, "Failed to add comment")?;
  if body.comment_content.trim().is_empty() {
    return Err(ApiError::invalid("Failed to add comment", "Comment cannot be empty"));
  }
  let result = state
    .content
    .add_comment(NewComment::by(&author, id, body.comment_content))
    .await;
  Ok(Reply(Envelope::from_result(COMMENT_ADDED, result)))
}
