//! The authentication gate: which paths need a signed-in session, and the
//! sign-in pipeline that moves a session from anonymous to authenticated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
  Result,
  identity::{ProviderRegistry, resolve_or_create_user},
  session::{self, SessionContext, SessionPrincipal},
  store::BoardStore,
};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
  Anonymous,
  Authenticated,
}

impl GateState {
  pub fn of<C: SessionContext + ?Sized>(ctx: &C) -> Self {
    match session::current_principal(ctx) {
      Some(_) => Self::Authenticated,
      None => Self::Anonymous,
    }
  }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Outcome of checking one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  Allow,
  /// Send the client to the login entry point.
  RedirectToLogin(String),
}

/// Allow-list of paths reachable without signing in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
  pub public_paths:    Vec<String>,
  pub public_prefixes: Vec<String>,
  pub login_path:      String,
}

impl Default for AccessPolicy {
  fn default() -> Self {
    Self {
      public_paths:    vec!["/".into(), "/login".into(), "/logout".into()],
      public_prefixes: vec!["/Savory-gh-pages/".into(), "/login/oauth2/".into()],
      login_path:      "/login".into(),
    }
  }
}

impl AccessPolicy {
  pub fn is_public(&self, path: &str) -> bool {
    self.public_paths.iter().any(|p| p == path)
      || self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
  }

  pub fn decide(&self, path: &str, state: GateState) -> Decision {
    if state == GateState::Authenticated || self.is_public(path) {
      Decision::Allow
    } else {
      Decision::RedirectToLogin(self.login_path.clone())
    }
  }
}

// ─── Sign-in pipeline ────────────────────────────────────────────────────────

/// What the identity-provider exchange hands over once its handshake is done.
/// Trusted as already verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
  pub provider_id:        String,
  pub name_attribute_key: String,
  pub attributes:         Map<String, Value>,
}

/// The authenticated identity returned to the request pipeline for building
/// its own principal wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
  pub principal:          SessionPrincipal,
  /// Exactly one entry: `ROLE_GUEST` or `ROLE_MEMBER`.
  pub authorities:        Vec<String>,
  pub name_attribute_key: String,
  pub attributes:         Map<String, Value>,
}

impl AuthenticatedPrincipal {
  /// The provider's primary identifier for this user, if it is a string.
  pub fn name(&self) -> Option<&str> {
    self.attributes.get(&self.name_attribute_key).and_then(Value::as_str)
  }
}

/// resolve → create-or-update → issue → bind.
///
/// Any failure leaves `ctx` untouched.
pub async fn sign_in<S, C>(
  store: &S,
  providers: &ProviderRegistry,
  assertion: Assertion,
  ctx: &mut C,
) -> Result<AuthenticatedPrincipal>
where
  S: BoardStore,
  C: SessionContext + Send + ?Sized,
{
  let Assertion { provider_id, name_attribute_key, attributes } = assertion;

  let attrs = providers
    .resolve(&provider_id, &name_attribute_key, attributes)
    .inspect_err(|e| warn!(%provider_id, error = %e, "rejected identity assertion"))?;
  let user = resolve_or_create_user(store, &attrs).await?;
  let principal = session::issue(&user);
  session::bind(&principal, ctx);

  info!(user_id = %user.id, %provider_id, role = %user.role, "signed in");

  Ok(AuthenticatedPrincipal {
    principal,
    authorities: vec![user.role_key()],
    name_attribute_key: attrs.name_attribute_key,
    attributes: attrs.attributes,
  })
}

/// Drop the principal; the session falls back to anonymous.
pub fn sign_out<C: SessionContext + ?Sized>(ctx: &mut C) {
  if let Some(principal) = session::current_principal(ctx) {
    info!(email = %principal.email, "signed out");
  }
  session::unbind(ctx);
}
