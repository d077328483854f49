//! User — the canonical local identity, keyed by email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Surrogate key assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The only two authorities the site knows about.
///
/// Stored and displayed in upper case (`GUEST`, `MEMBER`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  #[default]
  Guest,
  Member,
}

impl Role {
  /// The authority string granted to a principal holding this role.
  pub fn key(self) -> String { format!("ROLE_{self}") }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:          UserId,
  pub name:        String,
  pub email:       String,
  /// Avatar URL; empty when the provider did not supply one.
  pub picture:     String,
  pub role:        Role,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

impl User {
  pub fn role_key(&self) -> String { self.role.key() }
}

/// Input for [`BoardStore::insert_user`](crate::store::BoardStore::insert_user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
  pub name:    String,
  pub email:   String,
  pub picture: String,
  pub role:    Role,
}
