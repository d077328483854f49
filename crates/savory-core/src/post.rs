//! Post — a short text entry on the board — and its transfer view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, user::UserId};

pub const WRITER_MAX_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 100;

/// Surrogate key assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl std::fmt::Display for PostId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A persisted post. Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
  pub id:          PostId,
  pub writer:      String,
  pub title:       String,
  pub content:     String,
  pub owner:       Option<UserId>,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

/// A post that has passed field validation and may be handed to the store.
///
/// The only way to build one is [`NewPost::new`], so the store never sees an
/// empty writer, title or content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
  writer:  String,
  title:   String,
  content: String,
  owner:   Option<UserId>,
}

impl NewPost {
  pub fn new(
    writer: impl Into<String>,
    title: impl Into<String>,
    content: impl Into<String>,
    owner: Option<UserId>,
  ) -> Result<Self> {
    let writer = writer.into();
    let title = title.into();
    let content = content.into();

    check_text("writer", &writer, Some(WRITER_MAX_CHARS))?;
    check_text("title", &title, Some(TITLE_MAX_CHARS))?;
    check_text("content", &content, None)?;

    Ok(Self { writer, title, content, owner })
  }

  pub fn writer(&self) -> &str { &self.writer }
  pub fn title(&self) -> &str { &self.title }
  pub fn content(&self) -> &str { &self.content }
  pub fn owner(&self) -> Option<UserId> { self.owner }
}

/// Blank means empty or whitespace-only. Lengths count Unicode scalar values.
fn check_text(field: &str, value: &str, max_chars: Option<usize>) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  if let Some(max) = max_chars
    && value.chars().count() > max
  {
    return Err(Error::Validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

/// Read-only projection of a [`Post`] used in every list, search and detail
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
  pub id:          PostId,
  pub writer:      String,
  pub title:       String,
  pub content:     String,
  pub owner:       Option<UserId>,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

impl From<Post> for PostSummary {
  fn from(p: Post) -> Self {
    Self {
      id:          p.id,
      writer:      p.writer,
      title:       p.title,
      content:     p.content,
      owner:       p.owner,
      created_at:  p.created_at,
      modified_at: p.modified_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rejected(r: Result<NewPost>) -> bool { matches!(r, Err(Error::Validation(_))) }

  #[test]
  fn accepts_fields_within_bounds() {
    let p = NewPost::new("alice", "hello", "first post", None).unwrap();
    assert_eq!(p.writer(), "alice");
    assert_eq!(p.title(), "hello");
    assert_eq!(p.content(), "first post");
    assert_eq!(p.owner(), None);
  }

  #[test]
  fn rejects_empty_or_blank_fields() {
    assert!(rejected(NewPost::new("", "t", "c", None)));
    assert!(rejected(NewPost::new("w", "", "c", None)));
    assert!(rejected(NewPost::new("w", "t", "", None)));
    assert!(rejected(NewPost::new("w", "t", "  \n\t", None)));
  }

  #[test]
  fn enforces_length_bounds_in_chars() {
    assert!(NewPost::new("abcdefghij", "t", "c", None).is_ok());
    assert!(rejected(NewPost::new("abcdefghijk", "t", "c", None)));

    // Ten multi-byte characters are still ten characters.
    assert!(NewPost::new("가나다라마바사아자차", "t", "c", None).is_ok());

    assert!(NewPost::new("w", "x".repeat(100), "c", None).is_ok());
    assert!(rejected(NewPost::new("w", "x".repeat(101), "c", None)));
  }

  #[test]
  fn does_not_trim_input() {
    let p = NewPost::new(" bob ", " t ", " c ", None).unwrap();
    assert_eq!(p.writer(), " bob ");
  }
}
