//! Session issuing — projecting a [`User`] into the session context.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::user::User;

/// Key under which the signed-in principal is stored.
pub const SESSION_USER_KEY: &str = "user";

/// The minimal, serialisable view of a user held for the life of a session.
///
/// Carries no id, role or relationships, so nothing else is dragged into
/// session storage and the shape does not move when `User` does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrincipal {
  pub name:    String,
  pub email:   String,
  pub picture: String,
}

impl From<&User> for SessionPrincipal {
  fn from(user: &User) -> Self {
    Self {
      name:    user.name.clone(),
      email:   user.email.clone(),
      picture: user.picture.clone(),
    }
  }
}

/// Per-client key/value session storage.
pub trait SessionContext {
  fn get(&self, key: &str) -> Option<&Value>;
  fn set(&mut self, key: &str, value: Value);
  fn remove(&mut self, key: &str) -> Option<Value>;
}

/// A plain map-backed session context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(HashMap<String, Value>);

impl SessionData {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl SessionContext for SessionData {
  fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  fn set(&mut self, key: &str, value: Value) { self.0.insert(key.to_owned(), value); }

  fn remove(&mut self, key: &str) -> Option<Value> { self.0.remove(key) }
}

pub fn issue(user: &User) -> SessionPrincipal { SessionPrincipal::from(user) }

/// Store `principal` in the context, replacing whatever was there.
pub fn bind<C: SessionContext + ?Sized>(principal: &SessionPrincipal, ctx: &mut C) {
  // A struct of three strings always serialises.
  let value = serde_json::to_value(principal).unwrap_or(Value::Null);
  ctx.set(SESSION_USER_KEY, value);
}

pub fn unbind<C: SessionContext + ?Sized>(ctx: &mut C) { ctx.remove(SESSION_USER_KEY); }

/// The principal bound to this context, if any.
pub fn current_principal<C: SessionContext + ?Sized>(ctx: &C) -> Option<SessionPrincipal> {
  ctx
    .get(SESSION_USER_KEY)
    .and_then(|v| SessionPrincipal::deserialize(v).ok())
}
