//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error)]
pub enum Error {
  /// No principal in the session; answered with a redirect to the login page.
  #[error("sign-in required")]
  Unauthenticated,

  #[error("malformed identity attributes: {0}")]
  MalformedAttributes(String),

  #[error("unknown identity provider: {0}")]
  UnknownProvider(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A rejected submission; the response carries the input back unchanged.
  #[error("invalid input: {message}")]
  Rejected { message: String, input: Value },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<savory_core::Error> for Error {
  fn from(e: savory_core::Error) -> Self {
    use savory_core::Error as Core;
    match e {
      Core::MalformedAttributes(m) => Error::MalformedAttributes(m),
      Core::UnknownProvider(p) => Error::UnknownProvider(p),
      Core::Validation(m) => Error::BadRequest(m),
      Core::NotFound(id) => Error::NotFound(format!("post {id}")),
      Core::Storage(source) => Error::Store(source),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      Error::Unauthenticated => return Redirect::to(LOGIN_PATH).into_response(),
      Error::MalformedAttributes(m) => (StatusCode::UNAUTHORIZED, json!({ "error": m })),
      Error::UnknownProvider(p) => (
        StatusCode::NOT_FOUND,
        json!({ "error": format!("unknown identity provider: {p}") }),
      ),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": format!("{m} not found") })),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      Error::Rejected { message, input } => {
        (StatusCode::BAD_REQUEST, json!({ "error": message, "input": input }))
      }
      Error::Store(e) => {
        error!(error = %e, "store unavailable");
        (
          StatusCode::SERVICE_UNAVAILABLE,
          json!({ "error": "storage is unavailable, try again" }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
