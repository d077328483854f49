//! Public pages: home, login entry, and the current principal.

use axum::{
  Extension, Json,
  extract::{Query, State},
};
use savory_core::{session::SessionPrincipal, store::BoardStore};
use serde::Serialize;

use crate::{
  AppState,
  error::{Error, Result},
  handlers::{BoardPage, PageQuery, board_page},
  session::CurrentSession,
};

#[derive(Debug, Serialize)]
pub struct Home {
  /// The signed-in principal, or `null` for anonymous visitors.
  pub user:  Option<SessionPrincipal>,
  #[serde(flatten)]
  pub board: BoardPage,
}

pub async fn home<S>(
  State(state): State<AppState<S>>,
  Extension(current): Extension<CurrentSession>,
  Query(query): Query<PageQuery>,
) -> Result<Json<Home>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  let board = board_page(state.store.as_ref(), query.page()).await?;
  Ok(Json(Home { user: current.principal(), board }))
}

#[derive(Debug, Serialize)]
pub struct ProviderLink {
  pub id:       String,
  pub callback: String,
}

#[derive(Debug, Serialize)]
pub struct Login {
  pub providers: Vec<ProviderLink>,
}

pub async fn login<S>(State(state): State<AppState<S>>) -> Json<Login>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  let providers = state
    .providers
    .provider_ids()
    .into_iter()
    .map(|id| ProviderLink {
      id:       id.to_owned(),
      callback: format!("/login/oauth2/code/{id}"),
    })
    .collect();
  Json(Login { providers })
}

pub async fn me(Extension(current): Extension<CurrentSession>) -> Result<Json<SessionPrincipal>> {
  current.principal().map(Json).ok_or(Error::Unauthenticated)
}
