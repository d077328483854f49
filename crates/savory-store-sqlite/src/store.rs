//! [`SqliteStore`] — the SQLite implementation of [`BoardStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;

use savory_core::{
  post::{NewPost, Post, PostId},
  store::BoardStore,
  user::{NewUser, User, UserId},
};

use crate::{
  Error, Result,
  encode::{POST_COLUMNS, RawPost, RawUser, USER_COLUMNS, encode_dt, encode_role, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Savory board backed by a single SQLite file.
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

  /// Run a single-parameter post query whose select list is [`POST_COLUMNS`].
  async fn query_posts(
    &self,
    sql: String,
    param: rusqlite::types::Value,
  ) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([param], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }
}

fn to_sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_user_by_email<'a>(&'a self, email: &'a str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn insert_user(&self, user: NewUser) -> Result<Option<User>> {
    let created = now();
    let at_str = encode_dt(created);
    let role_str = encode_role(user.role);
    let (name, email, picture) = (user.name.clone(), user.email.clone(), user.picture.clone());

    // The UNIQUE constraint on email arbitrates concurrent first sign-ins.
    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO users (name, email, picture, role, created_at, modified_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![name, email, picture, role_str, at_str],
        )?;
        Ok((changed > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    let Some(user_id) = inserted else {
      debug!(email = %user.email, "insert skipped, email already present");
      return Ok(None);
    };

    Ok(Some(User {
      id:          UserId(user_id),
      name:        user.name,
      email:       user.email,
      picture:     user.picture,
      role:        user.role,
      created_at:  created,
      modified_at: created,
    }))
  }

  async fn update_user_profile(
    &self,
    id: UserId,
    name: String,
    picture: String,
  ) -> Result<Option<User>> {
    let at_str = encode_dt(now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE users
           SET name = ?2, picture = ?3, modified_at = max(?4, created_at)
           WHERE user_id = ?1",
          rusqlite::params![id.0, name, picture, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
          rusqlite::params![id.0],
          RawUser::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>> {
    let (offset, limit) = (to_sql_int(offset), to_sql_int(limit));

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts
           ORDER BY created_at, post_id
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1"),
            rusqlite::params![id.0],
            RawPost::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn insert_post(&self, post: NewPost) -> Result<Post> {
    let created = now();
    let at_str = encode_dt(created);
    let writer = post.writer().to_owned();
    let title = post.title().to_owned();
    let content = post.content().to_owned();
    let owner = post.owner();

    let post_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (writer, title, content, owner_id, created_at, modified_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![writer, title, content, owner.map(|o| o.0), at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    let stored = self.get_post(PostId(post_id)).await?;
    stored.ok_or(Error::MissingRow(post_id))
  }

  async fn delete_post(&self, id: PostId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM posts WHERE post_id = ?1", rusqlite::params![id.0])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn search_posts_by_title<'a>(&'a self, keyword: &'a str) -> Result<Vec<Post>> {
    // instr() is a byte-exact substring test; LIKE would fold ASCII case and
    // treat % and _ as wildcards.
    self
      .query_posts(
        format!(
          "SELECT {POST_COLUMNS} FROM posts
           WHERE instr(title, ?1) > 0
           ORDER BY created_at, post_id"
        ),
        rusqlite::types::Value::Text(keyword.to_owned()),
      )
      .await
  }

  async fn posts_by_owner(&self, owner: UserId) -> Result<Vec<Post>> {
    self
      .query_posts(
        format!(
          "SELECT {POST_COLUMNS} FROM posts
           WHERE owner_id = ?1
           ORDER BY created_at, post_id"
        ),
        rusqlite::types::Value::Integer(owner.0),
      )
      .await
  }

  async fn count_posts(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?))
      .await?;
    Ok(u64::try_from(n).unwrap_or(0))
  }
}
