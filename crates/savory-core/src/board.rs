//! The board service — listing, reading, creating, deleting and searching
//! posts on top of any [`BoardStore`].
//!
//! Everything handed back is a [`PostSummary`]; stored [`Post`]s never leave
//! this module.

use tracing::{debug, info};

use crate::{
  Error, Result,
  pagination::{self, PAGE_SIZE},
  post::{NewPost, Post, PostId, PostSummary},
  store::BoardStore,
  user::UserId,
};

fn summaries(posts: Vec<Post>) -> Vec<PostSummary> {
  posts.into_iter().map(PostSummary::from).collect()
}

/// One page of posts, oldest first. Pages are numbered from 1.
pub async fn list<S: BoardStore>(store: &S, page: u64) -> Result<Vec<PostSummary>> {
  if page < 1 {
    return Err(Error::Validation("page numbers start at 1".into()));
  }
  let offset = (page - 1).saturating_mul(PAGE_SIZE);
  let posts = store
    .list_posts(offset, PAGE_SIZE)
    .await
    .map_err(Error::storage)?;
  Ok(summaries(posts))
}

pub async fn get<S: BoardStore>(store: &S, id: PostId) -> Result<PostSummary> {
  store
    .get_post(id)
    .await
    .map_err(Error::storage)?
    .map(PostSummary::from)
    .ok_or(Error::NotFound(id))
}

/// Validate and persist a post, returning its new id.
///
/// Validation happens before the store is touched, so a rejected post leaves
/// the board unchanged.
pub async fn create<S: BoardStore>(
  store: &S,
  writer: &str,
  title: &str,
  content: &str,
  owner: Option<UserId>,
) -> Result<PostId> {
  let post = NewPost::new(writer, title, content, owner)?;
  let stored = store.insert_post(post).await.map_err(Error::storage)?;
  info!(post_id = %stored.id, writer = %stored.writer, "created post");
  Ok(stored.id)
}

/// Make sure `id` is gone. Deleting an absent post is not an error.
pub async fn delete<S: BoardStore>(store: &S, id: PostId) -> Result<()> {
  let removed = store.delete_post(id).await.map_err(Error::storage)?;
  if removed {
    info!(post_id = %id, "deleted post");
  } else {
    debug!(post_id = %id, "delete of absent post ignored");
  }
  Ok(())
}

/// Posts whose title contains `keyword`, matched case-sensitively.
///
/// An empty keyword matches nothing.
pub async fn search<S: BoardStore>(store: &S, keyword: &str) -> Result<Vec<PostSummary>> {
  if keyword.is_empty() {
    return Ok(Vec::new());
  }
  let posts = store
    .search_posts_by_title(keyword)
    .await
    .map_err(Error::storage)?;
  Ok(summaries(posts))
}

pub async fn count<S: BoardStore>(store: &S) -> Result<u64> {
  store.count_posts().await.map_err(Error::storage)
}

pub async fn posts_by_owner<S: BoardStore>(store: &S, owner: UserId) -> Result<Vec<PostSummary>> {
  let posts = store.posts_by_owner(owner).await.map_err(Error::storage)?;
  Ok(summaries(posts))
}

/// Navigation page numbers around `page` for the current post count.
pub async fn page_window<S: BoardStore>(store: &S, page: u64) -> Result<Vec<u64>> {
  let total = count(store).await?;
  Ok(pagination::board_window(page, total))
}
