//! Error types for `starwatch-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("state file I/O: {0}")]
  Io(#[from] std::io::Error),

  /// The state file exists but cannot be decoded. Deliberately not
  /// recovered from: silently resetting state risks mass back-announcement.
  #[error("malformed state file: {0}")]
  Malformed(String),

  #[error("serializing state: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
