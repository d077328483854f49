//! Error type for `savory-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  /// A row that was just written could not be read back.
  #[error("row {0} vanished after write")]
  MissingRow(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
