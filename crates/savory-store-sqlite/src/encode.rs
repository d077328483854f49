//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order equals chronological order. Roles are stored in
//! their upper-case string form.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use savory_core::{
  post::{Post, PostId},
  user::{Role, User, UserId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> String { role.as_ref().to_owned() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse::<Role>().map_err(|_| Error::UnknownRole(s.to_owned()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, name, email, picture, role, created_at, modified_at";

pub const POST_COLUMNS: &str =
  "post_id, writer, title, content, owner_id, created_at, modified_at";

/// A `users` row as read from SQLite, before decoding.
pub struct RawUser {
  pub user_id:     i64,
  pub name:        String,
  pub email:       String,
  pub picture:     String,
  pub role:        String,
  pub created_at:  String,
  pub modified_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      picture:     row.get(3)?,
      role:        row.get(4)?,
      created_at:  row.get(5)?,
      modified_at: row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:          UserId(self.user_id),
      name:        self.name,
      email:       self.email,
      picture:     self.picture,
      role:        decode_role(&self.role)?,
      created_at:  decode_dt(&self.created_at)?,
      modified_at: decode_dt(&self.modified_at)?,
    })
  }
}

/// A `posts` row as read from SQLite, before decoding.
pub struct RawPost {
  pub post_id:     i64,
  pub writer:      String,
  pub title:       String,
  pub content:     String,
  pub owner_id:    Option<i64>,
  pub created_at:  String,
  pub modified_at: String,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:     row.get(0)?,
      writer:      row.get(1)?,
      title:       row.get(2)?,
      content:     row.get(3)?,
      owner_id:    row.get(4)?,
      created_at:  row.get(5)?,
      modified_at: row.get(6)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:          PostId(self.post_id),
      writer:      self.writer,
      title:       self.title,
      content:     self.content,
      owner:       self.owner_id.map(UserId),
      created_at:  decode_dt(&self.created_at)?,
      modified_at: decode_dt(&self.modified_at)?,
    })
  }
}
