//! Core types and pure logic for the starwatch leaderboard announcer.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! Everything here is testable with synthetic payloads and a synthetic
//! clock; the binary crate wires in the real collaborators.

pub mod diff;
pub mod error;
pub mod fact;
pub mod format;
pub mod snapshot;

pub use error::{Error, Result};
