//! The file-backed [`StateStore`].

use std::{
  fs, io,
  io::Write as _,
  path::{Path, PathBuf},
};

use serde_json::Value;
use starwatch_core::snapshot::Snapshot;
use tempfile::NamedTempFile;

use crate::{
  Error, Result,
  encode::{decode_row, encode_rows},
};

/// Durable, append-free persistence of the last-seen snapshot.
///
/// Single-threaded callers only; the atomic rename in [`save`](Self::save)
/// is the only concurrency protection needed or provided.
#[derive(Debug, Clone)]
pub struct StateStore {
  path: PathBuf,
}

impl StateStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load the persisted snapshot.
  ///
  /// Returns `Ok(None)` when no state file exists — the first-run signal,
  /// kept distinct from an empty snapshot so seeding cannot be confused
  /// with an empty leaderboard. A file that exists but cannot be decoded is
  /// an error, never a silent reset.
  pub fn load(&self) -> Result<Option<Snapshot>> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    let rows: Vec<Value> = serde_json::from_str(&raw)
      .map_err(|e| Error::Malformed(e.to_string()))?;

    let snapshot = rows
      .iter()
      .map(decode_row)
      .collect::<Result<Snapshot>>()?;

    Ok(Some(snapshot))
  }

  /// Overwrite the state file with the full fact set of `snapshot`.
  ///
  /// Writes to a temp file in the target directory, then renames over the
  /// destination, so a crash mid-write cannot truncate the previous state.
  pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &encode_rows(snapshot))?;
    tmp.flush()?;
    tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

    Ok(())
  }
}
