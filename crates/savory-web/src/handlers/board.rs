//! Board endpoints. All of them sit behind the gate.

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use savory_core::{
  board,
  post::{PostId, PostSummary},
  store::BoardStore,
  user::User,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  AppState,
  error::{Error, Result},
  handlers::{BoardPage, PageQuery, board_page},
  session::CurrentSession,
};

/// The stored user behind the session's principal.
async fn signed_in_user<S: BoardStore>(store: &S, current: &CurrentSession) -> Result<User> {
  let principal = current.principal().ok_or(Error::Unauthenticated)?;
  store
    .find_user_by_email(&principal.email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthenticated)
}

pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<PageQuery>,
) -> Result<Json<BoardPage>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  Ok(Json(board_page(state.store.as_ref(), query.page()).await?))
}

pub async fn get<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PostSummary>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  Ok(Json(board::get(state.store.as_ref(), PostId(id)).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
  pub writer:  String,
  pub title:   String,
  pub content: String,
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  Extension(current): Extension<CurrentSession>,
  Json(form): Json<PostForm>,
) -> Result<Response>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  let owner = signed_in_user(store, &current).await?;

  let id = board::create(store, &form.writer, &form.title, &form.content, Some(owner.id))
    .await
    .map_err(|e| match e {
      savory_core::Error::Validation(message) => Error::Rejected {
        message,
        input: serde_json::to_value(&form).unwrap_or_default(),
      },
      other => other.into(),
    })?;

  Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  board::delete(state.store.as_ref(), PostId(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub keyword: String,
}

pub async fn search<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PostSummary>>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  Ok(Json(board::search(state.store.as_ref(), &query.keyword).await?))
}

pub async fn mine<S>(
  State(state): State<AppState<S>>,
  Extension(current): Extension<CurrentSession>,
) -> Result<Json<Vec<PostSummary>>>
where
  S: BoardStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  let owner = signed_in_user(store, &current).await?;
  Ok(Json(board::posts_by_owner(store, owner.id).await?))
}
