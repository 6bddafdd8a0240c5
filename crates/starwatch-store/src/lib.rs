//! Flat-file backend for the starwatch state store.
//!
//! Persists exactly one snapshot as a sorted JSON array of per-fact arrays.
//! Writes are full overwrites through a temp-file-then-rename so a crash
//! mid-write leaves either the old or the new complete content, never a
//! truncated file.

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::StateStore;
