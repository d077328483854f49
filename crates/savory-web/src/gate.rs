//! Authentication gate middleware.

use axum::{
  extract::{Request, State},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use savory_core::{
  gate::{Decision, GateState},
  store::BoardStore,
};
use tower_cookies::Cookies;
use tracing::debug;

use crate::{AppState, session::CurrentSession};

/// Resolve the caller's session and either pass the request on, with a
/// [`CurrentSession`] extension attached, or redirect to the login page.
pub async fn require_session<S>(
  State(state): State<AppState<S>>,
  cookies: Cookies,
  mut request: Request,
  next: Next,
) -> Response
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  let current = CurrentSession::load(&cookies, &state.sessions);
  let gate_state = GateState::of(&current.data);

  match state.policy.decide(request.uri().path(), gate_state) {
    Decision::Allow => {
      request.extensions_mut().insert(current);
      next.run(request).await
    }
    Decision::RedirectToLogin(login) => {
      debug!(path = %request.uri().path(), "anonymous request redirected to login");
      Redirect::to(&login).into_response()
    }
  }
}
