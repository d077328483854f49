//! Identity resolution — turning a verified third-party attribute map into a
//! local [`User`].
//!
//! Extraction is dispatched through a [`ProviderRegistry`] keyed by provider
//! id, so supporting another provider is a registration rather than a new
//! branch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  store::BoardStore,
  user::{NewUser, Role, User},
};

/// Find-then-write rounds before giving up on a contended email.
const MAX_RESOLVE_ATTEMPTS: usize = 3;

// ─── Attributes ──────────────────────────────────────────────────────────────

/// The profile fields every provider must yield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
  pub name:    String,
  pub email:   String,
  pub picture: String,
}

/// Provider-agnostic view of one identity assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttributes {
  pub provider_id:        String,
  /// The attribute the provider uses as its primary identifier (e.g. `sub`).
  pub name_attribute_key: String,
  pub name:               String,
  pub email:              String,
  pub picture:            String,
  pub attributes:         Map<String, Value>,
}

impl ResolvedAttributes {
  /// The user row to insert when this email has never been seen.
  pub fn to_new_user(&self) -> NewUser {
    NewUser {
      name:    self.name.clone(),
      email:   self.email.clone(),
      picture: self.picture.clone(),
      role:    Role::Guest,
    }
  }
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// Pulls a [`Profile`] out of a provider's raw attribute map.
pub type Extractor = fn(&Map<String, Value>) -> Result<Profile>;

/// Maps provider ids (`google`, ...) to their attribute extractors.
#[derive(Clone)]
pub struct ProviderRegistry {
  extractors: HashMap<String, Extractor>,
}

impl ProviderRegistry {
  /// A registry with no providers at all.
  pub fn empty() -> Self { Self { extractors: HashMap::new() } }

  pub fn register(&mut self, provider_id: impl Into<String>, extractor: Extractor) -> &mut Self {
    self.extractors.insert(provider_id.into(), extractor);
    self
  }

  pub fn contains(&self, provider_id: &str) -> bool {
    self.extractors.contains_key(provider_id)
  }

  /// Registered provider ids, sorted.
  pub fn provider_ids(&self) -> Vec<&str> {
    let mut ids: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
    ids.sort_unstable();
    ids
  }

  /// Normalise a raw attribute map. Pure; touches no storage.
  pub fn resolve(
    &self,
    provider_id: &str,
    name_attribute_key: &str,
    attributes: Map<String, Value>,
  ) -> Result<ResolvedAttributes> {
    let extract = self
      .extractors
      .get(provider_id)
      .ok_or_else(|| Error::UnknownProvider(provider_id.to_owned()))?;

    let Profile { name, email, picture } = extract(&attributes)?;
    debug!(provider_id, %email, "resolved identity attributes");

    Ok(ResolvedAttributes {
      provider_id: provider_id.to_owned(),
      name_attribute_key: name_attribute_key.to_owned(),
      name,
      email,
      picture,
      attributes,
    })
  }
}

impl Default for ProviderRegistry {
  fn default() -> Self {
    let mut registry = Self::empty();
    registry.register("google", google);
    registry
  }
}

/// Google's userinfo attributes: `name`, `email`, optional `picture`.
pub fn google(attributes: &Map<String, Value>) -> Result<Profile> {
  Ok(Profile {
    name:    required_str(attributes, "name")?,
    email:   required_str(attributes, "email")?,
    picture: optional_str(attributes, "picture")?,
  })
}

fn required_str(attributes: &Map<String, Value>, key: &str) -> Result<String> {
  match attributes.get(key) {
    Some(Value::String(s)) => Ok(s.clone()),
    Some(_) => Err(Error::MalformedAttributes(format!("{key} is not a string"))),
    None => Err(Error::MalformedAttributes(format!("{key} is missing"))),
  }
}

fn optional_str(attributes: &Map<String, Value>, key: &str) -> Result<String> {
  match attributes.get(key) {
    Some(Value::String(s)) => Ok(s.clone()),
    None | Some(Value::Null) => Ok(String::new()),
    Some(_) => Err(Error::MalformedAttributes(format!("{key} is not a string"))),
  }
}

// ─── Create-or-update ────────────────────────────────────────────────────────

/// Resolve `attrs` against the user directory.
///
/// An existing user (by email) gets its name and picture refreshed; role and
/// id are kept. An unknown email produces a new [`Role::Guest`] user. If a
/// concurrent sign-in claims the email between our read and our insert, the
/// insert reports a conflict and we go round again as an update, so both
/// callers end up with the same row.
pub async fn resolve_or_create_user<S: BoardStore>(
  store: &S,
  attrs: &ResolvedAttributes,
) -> Result<User> {
  for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
    let existing = store
      .find_user_by_email(&attrs.email)
      .await
      .map_err(Error::storage)?;

    if let Some(user) = existing {
      if user.name == attrs.name && user.picture == attrs.picture {
        return Ok(user);
      }
      let updated = store
        .update_user_profile(user.id, attrs.name.clone(), attrs.picture.clone())
        .await
        .map_err(Error::storage)?;
      if let Some(user) = updated {
        debug!(user_id = %user.id, "refreshed user profile");
        return Ok(user);
      }
      continue;
    }

    match store.insert_user(attrs.to_new_user()).await.map_err(Error::storage)? {
      Some(user) => {
        info!(user_id = %user.id, email = %user.email, "created user");
        return Ok(user);
      }
      None => {
        warn!(attempt, email = %attrs.email, "email claimed concurrently; retrying as update");
      }
    }
  }

  Err(Error::Storage(
    format!("could not settle user row for {} after {MAX_RESOLVE_ATTEMPTS} attempts", attrs.email).into(),
  ))
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{
      Arc,
      atomic::{AtomicBool, AtomicUsize, Ordering},
    },
  };

  use serde_json::json;

  use super::*;
  use crate::{
    memory::MemoryStore,
    post::{NewPost, Post, PostId},
    testing::OfflineStore,
    user::UserId,
  };

  fn attrs_map(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("expected an object"),
    }
  }

  fn alice() -> ResolvedAttributes {
    ProviderRegistry::default()
      .resolve(
        "google",
        "sub",
        attrs_map(json!({
          "sub": "1234",
          "name": "Alice",
          "email": "alice@example.com",
          "picture": "https://img.example.com/alice.png",
        })),
      )
      .unwrap()
  }

  // ── resolve ───────────────────────────────────────────────────────────────

  #[test]
  fn resolve_extracts_google_profile() {
    let a = alice();
    assert_eq!(a.provider_id, "google");
    assert_eq!(a.name_attribute_key, "sub");
    assert_eq!(a.name, "Alice");
    assert_eq!(a.email, "alice@example.com");
    assert_eq!(a.picture, "https://img.example.com/alice.png");
    assert_eq!(a.attributes.get("sub"), Some(&json!("1234")));
  }

  #[test]
  fn resolve_defaults_missing_picture_to_empty() {
    let a = ProviderRegistry::default()
      .resolve("google", "sub", attrs_map(json!({ "name": "Bob", "email": "bob@example.com" })))
      .unwrap();
    assert_eq!(a.picture, "");
  }

  #[test]
  fn resolve_rejects_missing_or_mistyped_fields() {
    let registry = ProviderRegistry::default();
    let missing_email = registry.resolve("google", "sub", attrs_map(json!({ "name": "Bob" })));
    assert!(matches!(missing_email, Err(Error::MalformedAttributes(_))));

    let numeric_name =
      registry.resolve("google", "sub", attrs_map(json!({ "name": 7, "email": "b@example.com" })));
    assert!(matches!(numeric_name, Err(Error::MalformedAttributes(_))));
  }

  #[test]
  fn resolve_rejects_unregistered_provider() {
    let r = ProviderRegistry::default().resolve("naver", "id", Map::new());
    assert!(matches!(r, Err(Error::UnknownProvider(p)) if p == "naver"));
  }

  #[test]
  fn registering_a_provider_is_enough_to_resolve_it() {
    fn nested(attributes: &Map<String, Value>) -> Result<Profile> {
      let inner = attributes
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MalformedAttributes("response is missing".into()))?;
      google(inner)
    }

    let mut registry = ProviderRegistry::default();
    registry.register("naver", nested);
    assert_eq!(registry.provider_ids(), vec!["google", "naver"]);

    let a = registry
      .resolve(
        "naver",
        "response",
        attrs_map(json!({ "response": { "name": "Kim", "email": "kim@example.com" } })),
      )
      .unwrap();
    assert_eq!(a.email, "kim@example.com");
  }

  // ── resolve_or_create_user ────────────────────────────────────────────────

  #[tokio::test]
  async fn first_resolution_creates_guest() {
    let store = MemoryStore::new();
    let user = resolve_or_create_user(&store, &alice()).await.unwrap();
    assert_eq!(user.role, Role::Guest);
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(store.user_count(), 1);
  }

  #[tokio::test]
  async fn resolution_is_idempotent() {
    let store = MemoryStore::new();
    let first = resolve_or_create_user(&store, &alice()).await.unwrap();
    let second = resolve_or_create_user(&store, &alice()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.user_count(), 1);
  }

  #[tokio::test]
  async fn later_resolution_updates_profile_only() {
    let store = MemoryStore::new();
    let first = resolve_or_create_user(&store, &alice()).await.unwrap();

    let mut renamed = alice();
    renamed.name = "Alice L.".into();
    renamed.picture = String::new();
    let second = resolve_or_create_user(&store, &renamed).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.role, first.role);
    assert_eq!(second.name, "Alice L.");
    assert_eq!(second.picture, "");
    assert!(second.modified_at >= second.created_at);
    assert_eq!(store.user_count(), 1);
  }

  #[tokio::test]
  async fn concurrent_resolutions_share_one_row() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..16)
      .map(|_| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { resolve_or_create_user(store.as_ref(), &alice()).await })
      })
      .collect();

    let mut ids = Vec::new();
    for h in handles {
      ids.push(h.await.unwrap().unwrap().id);
    }
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.user_count(), 1);
  }

  /// Hides existing users from the first lookup, as if a peer request inserted
  /// the row between our read and our write.
  struct LostRace {
    inner:  MemoryStore,
    hidden: AtomicBool,
  }

  impl BoardStore for LostRace {
    type Error = Infallible;

    async fn find_user_by_email<'a>(
      &'a self,
      email: &'a str,
    ) -> Result<Option<User>, Infallible> {
      if self.hidden.swap(false, Ordering::SeqCst) {
        return Ok(None);
      }
      self.inner.find_user_by_email(email).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, Infallible> {
      self.inner.insert_user(user).await
    }

    async fn update_user_profile(
      &self,
      id: UserId,
      name: String,
      picture: String,
    ) -> Result<Option<User>, Infallible> {
      self.inner.update_user_profile(id, name, picture).await
    }

    async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>, Infallible> {
      self.inner.list_posts(offset, limit).await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, Infallible> {
      self.inner.get_post(id).await
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, Infallible> {
      self.inner.insert_post(post).await
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, Infallible> {
      self.inner.delete_post(id).await
    }

    async fn search_posts_by_title<'a>(
      &'a self,
      keyword: &'a str,
    ) -> Result<Vec<Post>, Infallible> {
      self.inner.search_posts_by_title(keyword).await
    }

    async fn posts_by_owner(&self, owner: UserId) -> Result<Vec<Post>, Infallible> {
      self.inner.posts_by_owner(owner).await
    }

    async fn count_posts(&self) -> Result<u64, Infallible> { self.inner.count_posts().await }
  }

  /// Never shows the row and always reports the email as taken.
  #[derive(Default)]
  struct AlwaysTaken {
    inserts: AtomicUsize,
  }

  impl BoardStore for AlwaysTaken {
    type Error = Infallible;

    async fn find_user_by_email<'a>(&'a self, _: &'a str) -> Result<Option<User>, Infallible> {
      Ok(None)
    }

    async fn insert_user(&self, _: NewUser) -> Result<Option<User>, Infallible> {
      self.inserts.fetch_add(1, Ordering::SeqCst);
      Ok(None)
    }

    async fn update_user_profile(
      &self,
      _: UserId,
      _: String,
      _: String,
    ) -> Result<Option<User>, Infallible> {
      Ok(None)
    }

    async fn list_posts(&self, _: u64, _: u64) -> Result<Vec<Post>, Infallible> { Ok(Vec::new()) }

    async fn get_post(&self, _: PostId) -> Result<Option<Post>, Infallible> { Ok(None) }

    async fn insert_post(&self, _: NewPost) -> Result<Post, Infallible> {
      unreachable!("identity resolution never writes posts")
    }

    async fn delete_post(&self, _: PostId) -> Result<bool, Infallible> { Ok(false) }

    async fn search_posts_by_title<'a>(&'a self, _: &'a str) -> Result<Vec<Post>, Infallible> {
      Ok(Vec::new())
    }

    async fn posts_by_owner(&self, _: UserId) -> Result<Vec<Post>, Infallible> { Ok(Vec::new()) }

    async fn count_posts(&self) -> Result<u64, Infallible> { Ok(0) }
  }

  #[tokio::test]
  async fn unsettled_email_gives_up_after_three_rounds() {
    let store = AlwaysTaken::default();
    let err = resolve_or_create_user(&store, &alice()).await.unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(store.inserts.load(Ordering::SeqCst), MAX_RESOLVE_ATTEMPTS);
  }

  #[tokio::test]
  async fn store_failure_surfaces_as_storage_error() {
    let err = resolve_or_create_user(&OfflineStore, &alice()).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(err.to_string(), "storage unavailable: database is offline");
  }

  #[tokio::test]
  async fn insert_conflict_is_retried_as_update() {
    let store = LostRace { inner: MemoryStore::new(), hidden: AtomicBool::new(false) };
    let original = resolve_or_create_user(&store, &alice()).await.unwrap();

    store.hidden.store(true, Ordering::SeqCst);
    let mut renamed = alice();
    renamed.name = "Alice Again".into();
    let user = resolve_or_create_user(&store, &renamed).await.unwrap();

    assert_eq!(user.id, original.id);
    assert_eq!(user.name, "Alice Again");
    assert_eq!(store.inner.user_count(), 1);
  }
}
