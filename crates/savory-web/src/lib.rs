//! HTTP layer for Savory.
//!
//! Exposes an axum [`Router`] serving the sign-in flow and the board, backed
//! by any [`BoardStore`]. Every request passes the authentication gate; paths
//! outside the public allow-list need a signed-in session.

pub mod error;
pub mod gate;
pub mod handlers;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use savory_core::{gate::AccessPolicy, identity::ProviderRegistry, store::BoardStore};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{board, home, signin};
use session::SessionRegistry;

/// Mount point of the static site assets.
pub const STATIC_PREFIX: &str = "/Savory-gh-pages";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SAVORY_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub static_dir:          PathBuf,
  pub session_ttl_minutes: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      store_path:          PathBuf::from("savory.db"),
      static_dir:          PathBuf::from("static"),
      session_ttl_minutes: 30,
    }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_minutes.saturating_mul(60)) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: BoardStore> {
  pub store:     Arc<S>,
  pub config:    Arc<ServerConfig>,
  pub providers: Arc<ProviderRegistry>,
  pub sessions:  Arc<SessionRegistry>,
  pub policy:    Arc<AccessPolicy>,
}

impl<S: BoardStore> AppState<S> {
  /// State with the default provider registry and access policy.
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:     Arc::new(store),
      sessions:  Arc::new(SessionRegistry::new(config.session_ttl())),
      providers: Arc::new(ProviderRegistry::default()),
      policy:    Arc::new(AccessPolicy::default()),
      config:    Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Savory server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/",                              get(home::home::<S>))
    .route("/login",                         get(home::login::<S>))
    .route("/login/oauth2/code/{provider}",  post(signin::callback::<S>))
    .route("/logout",                        post(signin::logout::<S>))
    .route("/me",                            get(home::me))
    .route("/board/list",                    get(board::list::<S>))
    .route("/board/post",                    post(board::create::<S>))
    .route("/board/post/{id}",               get(board::get::<S>).delete(board::delete::<S>))
    .route("/board/search",                  get(board::search::<S>))
    .route("/board/mine",                    get(board::mine::<S>))
    .nest_service(STATIC_PREFIX, ServeDir::new(&state.config.static_dir))
    .layer(middleware::from_fn_with_state(state.clone(), gate::require_session::<S>))
    .layer(CookieManagerLayer::new())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
