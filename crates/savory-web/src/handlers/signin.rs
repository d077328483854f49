//! Identity-provider callback and logout.

use axum::{
  Extension, Json,
  extract::{Path, State, rejection::JsonRejection},
  response::Redirect,
};
use savory_core::{
  gate::{self, Assertion, AuthenticatedPrincipal},
  store::BoardStore,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
  AppState,
  error::{Error, Result},
  session::{CurrentSession, clear_session_cookie, set_session_cookie},
};

/// What the provider exchange posts back once the handshake has completed.
#[derive(Debug, Deserialize)]
pub struct CallbackBody {
  pub name_attribute_key: String,
  #[serde(default)]
  pub attributes:         Map<String, Value>,
}

/// Sign the caller in and hand out a fresh session id.
///
/// The posted attributes are taken as already verified. This route must only
/// be reachable through the real provider exchange, which performs the
/// OAuth2 handshake and forwards its result here; exposed directly, anyone
/// could sign in as any email.
///
/// Unregistered providers are refused before the body is looked at. On
/// failure the caller's existing session, if any, is left as it was.
pub async fn callback<S>(
  State(state): State<AppState<S>>,
  Path(provider_id): Path<String>,
  Extension(current): Extension<CurrentSession>,
  cookies: Cookies,
  body: Result<Json<CallbackBody>, JsonRejection>,
) -> Result<Json<AuthenticatedPrincipal>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  if !state.providers.contains(&provider_id) {
    return Err(Error::UnknownProvider(provider_id));
  }
  let Json(body) = body.map_err(|e| Error::BadRequest(e.body_text()))?;

  let CurrentSession { id: previous, mut data } = current;

  let assertion = Assertion {
    provider_id,
    name_attribute_key: body.name_attribute_key,
    attributes: body.attributes,
  };
  let principal = gate::sign_in(state.store.as_ref(), &state.providers, assertion, &mut data).await?;

  if let Some(previous) = previous {
    state.sessions.discard(previous);
  }
  let id = Uuid::new_v4();
  state.sessions.store(id, data);
  set_session_cookie(&cookies, id);

  Ok(Json(principal))
}

pub async fn logout<S>(
  State(state): State<AppState<S>>,
  Extension(current): Extension<CurrentSession>,
  cookies: Cookies,
) -> Redirect
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  if let Some(id) = current.id {
    let mut data = current.data;
    gate::sign_out(&mut data);
    state.sessions.discard(id);
  }
  clear_session_cookie(&cookies);
  Redirect::to("/")
}
