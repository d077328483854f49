//! In-memory [`BoardStore`] implementation.
//!
//! Useful for tests and for running the server without a database file.

use std::{
  collections::BTreeMap,
  convert::Infallible,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

use crate::{
  post::{NewPost, Post, PostId},
  store::BoardStore,
  user::{NewUser, User, UserId},
};

#[derive(Default)]
struct Tables {
  users:        BTreeMap<UserId, User>,
  posts:        BTreeMap<PostId, Post>,
  next_user_id: i64,
  next_post_id: i64,
}

/// A store that keeps everything in process memory behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Number of user rows; handy for asserting uniqueness in tests.
  pub fn user_count(&self) -> usize { self.lock().users.len() }
}

fn sorted(mut posts: Vec<Post>) -> Vec<Post> {
  posts.sort_by(|a, b| (a.created_at, a.id.0).cmp(&(b.created_at, b.id.0)));
  posts
}

impl BoardStore for MemoryStore {
  type Error = Infallible;

  async fn find_user_by_email<'a>(&'a self, email: &'a str) -> Result<Option<User>, Infallible> {
    Ok(self.lock().users.values().find(|u| u.email == email).cloned())
  }

  async fn insert_user(&self, user: NewUser) -> Result<Option<User>, Infallible> {
    let mut tables = self.lock();
    if tables.users.values().any(|u| u.email == user.email) {
      return Ok(None);
    }

    tables.next_user_id += 1;
    let now = Utc::now();
    let stored = User {
      id:          UserId(tables.next_user_id),
      name:        user.name,
      email:       user.email,
      picture:     user.picture,
      role:        user.role,
      created_at:  now,
      modified_at: now,
    };
    tables.users.insert(stored.id, stored.clone());
    Ok(Some(stored))
  }

  async fn update_user_profile(
    &self,
    id: UserId,
    name: String,
    picture: String,
  ) -> Result<Option<User>, Infallible> {
    let mut tables = self.lock();
    Ok(tables.users.get_mut(&id).map(|u| {
      u.name = name;
      u.picture = picture;
      u.modified_at = Utc::now().max(u.created_at);
      u.clone()
    }))
  }

  async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>, Infallible> {
    let all = sorted(self.lock().posts.values().cloned().collect());
    Ok(
      all
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect(),
    )
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>, Infallible> {
    Ok(self.lock().posts.get(&id).cloned())
  }

  async fn insert_post(&self, post: NewPost) -> Result<Post, Infallible> {
    let mut tables = self.lock();
    tables.next_post_id += 1;
    let now = Utc::now();
    let stored = Post {
      id:          PostId(tables.next_post_id),
      writer:      post.writer().to_owned(),
      title:       post.title().to_owned(),
      content:     post.content().to_owned(),
      owner:       post.owner(),
      created_at:  now,
      modified_at: now,
    };
    tables.posts.insert(stored.id, stored.clone());
    Ok(stored)
  }

  async fn delete_post(&self, id: PostId) -> Result<bool, Infallible> {
    Ok(self.lock().posts.remove(&id).is_some())
  }

  async fn search_posts_by_title<'a>(&'a self, keyword: &'a str) -> Result<Vec<Post>, Infallible> {
    let hits = self
      .lock()
      .posts
      .values()
      .filter(|p| p.title.contains(keyword))
      .cloned()
      .collect();
    Ok(sorted(hits))
  }

  async fn posts_by_owner(&self, owner: UserId) -> Result<Vec<Post>, Infallible> {
    let owned = self
      .lock()
      .posts
      .values()
      .filter(|p| p.owner == Some(owner))
      .cloned()
      .collect();
    Ok(sorted(owned))
  }

  async fn count_posts(&self) -> Result<u64, Infallible> {
    Ok(self.lock().posts.len() as u64)
  }
}
