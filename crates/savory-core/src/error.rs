//! Error types for `savory-core`.

use thiserror::Error;

use crate::post::PostId;

#[derive(Debug, Error)]
pub enum Error {
  /// The identity assertion lacked a required attribute or carried one of the
  /// wrong type.
  #[error("malformed identity attributes: {0}")]
  MalformedAttributes(String),

  #[error("no identity provider registered as {0:?}")]
  UnknownProvider(String),

  /// A field constraint on a post (or a page number) was violated. Nothing was
  /// written.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("post not found: {0}")]
  NotFound(PostId),

  /// The persistence layer failed or aborted the transaction.
  #[error("storage unavailable: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
