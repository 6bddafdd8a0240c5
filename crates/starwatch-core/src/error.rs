//! Error types for `starwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed leaderboard payload: {0}")]
  MalformedPayload(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
