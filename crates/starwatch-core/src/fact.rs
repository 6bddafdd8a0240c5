//! Fact types — the atomic unit of leaderboard progress.
//!
//! A fact records that one participant earned one star: a day plus a part.
//! Facts are never updated in place; a fresh snapshot is built from scratch
//! on every fetch and compared against the last persisted one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The identity triple of a fact. Two facts describe the same star iff their
/// keys are equal; the achievement timestamp deliberately carries no identity
/// weight, so an upstream timestamp backfill can never resurface an
/// already-announced star.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FactKey {
  /// Stable upstream identifier of the leaderboard member.
  pub participant_id: String,
  /// Day number within the event.
  pub milestone:      u32,
  /// Puzzle part, 1 or 2. Part 2 implies part 1 was earned first, but the
  /// upstream ledger is trusted rather than enforced.
  pub tier:           u8,
}

// ─── Fact ────────────────────────────────────────────────────────────────────

/// One earned star. `achieved_at` is the first-seen upstream timestamp and
/// becomes authoritative once persisted; re-fetches may report a different
/// value due to upstream clock skew, which is not reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
  pub key:         FactKey,
  pub achieved_at: Option<DateTime<Utc>>,
}

impl Fact {
  pub fn new(
    participant_id: impl Into<String>,
    milestone: u32,
    tier: u8,
    achieved_at: Option<DateTime<Utc>>,
  ) -> Self {
    Self {
      key: FactKey {
        participant_id: participant_id.into(),
        milestone,
        tier,
      },
      achieved_at,
    }
  }
}
