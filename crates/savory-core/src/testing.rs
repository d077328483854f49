//! Store doubles shared by the unit tests.

use thiserror::Error;

use crate::{
  post::{NewPost, Post, PostId},
  store::BoardStore,
  user::{NewUser, User, UserId},
};

#[derive(Debug, Error)]
#[error("database is offline")]
pub struct Offline;

/// A backend whose every call fails.
pub struct OfflineStore;

impl BoardStore for OfflineStore {
  type Error = Offline;

  async fn find_user_by_email<'a>(&'a self, _: &'a str) -> Result<Option<User>, Offline> {
    Err(Offline)
  }

  async fn insert_user(&self, _: NewUser) -> Result<Option<User>, Offline> { Err(Offline) }

  async fn update_user_profile(
    &self,
    _: UserId,
    _: String,
    _: String,
  ) -> Result<Option<User>, Offline> {
    Err(Offline)
  }

  async fn list_posts(&self, _: u64, _: u64) -> Result<Vec<Post>, Offline> { Err(Offline) }

  async fn get_post(&self, _: PostId) -> Result<Option<Post>, Offline> { Err(Offline) }

  async fn insert_post(&self, _: NewPost) -> Result<Post, Offline> { Err(Offline) }

  async fn delete_post(&self, _: PostId) -> Result<bool, Offline> { Err(Offline) }

  async fn search_posts_by_title<'a>(&'a self, _: &'a str) -> Result<Vec<Post>, Offline> {
    Err(Offline)
  }

  async fn posts_by_owner(&self, _: UserId) -> Result<Vec<Post>, Offline> { Err(Offline) }

  async fn count_posts(&self) -> Result<u64, Offline> { Err(Offline) }
}
