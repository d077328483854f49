//! The `BoardStore` trait — the persistence contract for users and posts.
//!
//! The trait is implemented by storage backends (e.g. `savory-store-sqlite`,
//! or [`MemoryStore`](crate::memory::MemoryStore) for tests). The services in
//! this crate and the web layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  post::{NewPost, Post, PostId},
  user::{NewUser, User, UserId},
};

/// Abstraction over a Savory store backend.
///
/// Every method is a single unit of work: the backend either applies it fully
/// or not at all.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Look up a user by their email address. Returns `None` if not found.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Insert a user unless one with the same email already exists.
  ///
  /// Returns `None` when the email is taken; the caller is expected to re-read
  /// and update instead. Backends must enforce email uniqueness atomically.
  fn insert_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Overwrite name and picture of an existing user and bump its modified
  /// timestamp. Role and id are left alone. Returns `None` if the id is
  /// unknown.
  fn update_user_profile(
    &self,
    id: UserId,
    name: String,
    picture: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// One slice of posts ordered by creation time ascending, ties broken by id.
  fn list_posts(
    &self,
    offset: u64,
    limit: u64,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Persist a validated post. Timestamps are assigned by the store.
  fn insert_post(
    &self,
    post: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Remove a post. Returns whether a row was actually deleted.
  fn delete_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Posts whose title contains `keyword` (case-sensitive), ordered like
  /// [`list_posts`](Self::list_posts).
  fn search_posts_by_title<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Posts referencing `owner`, ordered like [`list_posts`](Self::list_posts).
  fn posts_by_owner(
    &self,
    owner: UserId,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  fn count_posts(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
