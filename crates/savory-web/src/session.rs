//! Cookie-backed session storage.
//!
//! Each client holds a `savory_session` cookie carrying a random id; the
//! session contents live in a [`SessionRegistry`] in this process. A session
//! left idle longer than the configured TTL is dropped on next access, which
//! returns the client to anonymous.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

use savory_core::session::{self, SessionData, SessionPrincipal};
use tower_cookies::{Cookie, Cookies, cookie::time};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "savory_session";

// ─── Registry ────────────────────────────────────────────────────────────────

struct Entry {
  data:    SessionData,
  touched: Instant,
}

/// All live sessions, keyed by the id in the client's cookie.
pub struct SessionRegistry {
  ttl:     Duration,
  entries: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
  pub fn new(ttl: Duration) -> Self { Self { ttl, entries: Mutex::new(HashMap::new()) } }

  fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The session's data, refreshing its idle timer. Expired sessions are
  /// removed and read as absent.
  pub fn load(&self, id: Uuid) -> Option<SessionData> {
    let mut entries = self.lock();
    let entry = entries.get_mut(&id)?;
    if entry.touched.elapsed() >= self.ttl {
      entries.remove(&id);
      return None;
    }
    entry.touched = Instant::now();
    Some(entry.data.clone())
  }

  /// Replace the session's data. Last writer wins.
  pub fn store(&self, id: Uuid, data: SessionData) {
    self.lock().insert(id, Entry { data, touched: Instant::now() });
  }

  pub fn discard(&self, id: Uuid) { self.lock().remove(&id); }

  /// Drop every expired session, returning how many went.
  pub fn purge_expired(&self) -> usize {
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|_, e| e.touched.elapsed() < self.ttl);
    before - entries.len()
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

// ─── Per-request view ────────────────────────────────────────────────────────

/// The session a request arrived with, inserted into request extensions by
/// the gate middleware.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
  /// `None` when the client has no live session.
  pub id:   Option<Uuid>,
  pub data: SessionData,
}

impl CurrentSession {
  pub fn load(cookies: &Cookies, registry: &SessionRegistry) -> Self {
    let Some(id) = session_id(cookies) else {
      return Self::default();
    };
    match registry.load(id) {
      Some(data) => Self { id: Some(id), data },
      None => Self::default(),
    }
  }

  pub fn principal(&self) -> Option<SessionPrincipal> { session::current_principal(&self.data) }
}

// ─── Cookie helpers ──────────────────────────────────────────────────────────

pub fn session_id(cookies: &Cookies) -> Option<Uuid> {
  cookies
    .get(SESSION_COOKIE)
    .and_then(|c| Uuid::parse_str(c.value()).ok())
}

pub fn set_session_cookie(cookies: &Cookies, id: Uuid) {
  let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
    .path("/")
    .http_only(true)
    .build();
  cookies.add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies) {
  let cookie = Cookie::build((SESSION_COOKIE, ""))
    .path("/")
    .http_only(true)
    .max_age(time::Duration::ZERO)
    .build();
  cookies.add(cookie);
}
