//! Encoding and decoding between facts and the fixed-arity JSON arrays of
//! the state file.
//!
//! The written form is always arity 4: `[participant, milestone, ts|null,
//! tier]`, with the achievement timestamp as epoch seconds. The decoder also
//! accepts the older arity-3 form `[participant, milestone, tier]` from
//! deployments that never tracked per-star time.

use chrono::DateTime;
use serde_json::{Value, json};
use starwatch_core::{
  fact::{Fact, FactKey},
  snapshot::Snapshot,
};

use crate::{Error, Result};

/// Encode a snapshot as rows sorted by the full identity tuple, for stable
/// diffs and reproducible files across runs.
pub fn encode_rows(snapshot: &Snapshot) -> Vec<Value> {
  snapshot
    .iter()
    .map(|fact| {
      json!([
        fact.key.participant_id,
        fact.key.milestone,
        fact.achieved_at.map(|ts| ts.timestamp()),
        fact.key.tier,
      ])
    })
    .collect()
}

pub fn decode_row(row: &Value) -> Result<Fact> {
  let items = row
    .as_array()
    .ok_or_else(|| malformed("fact row is not an array", row))?;

  let (participant, milestone, achieved_at, tier) = match items.as_slice() {
    [p, m, ts, t] => (p, m, Some(ts), t),
    [p, m, t] => (p, m, None, t),
    _ => return Err(malformed("fact row has unexpected arity", row)),
  };

  let achieved_at = match achieved_at {
    None | Some(Value::Null) => None,
    Some(ts) => {
      let secs = decode_int(ts, "timestamp")?;
      Some(DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        Error::Malformed(format!("timestamp out of range: {secs}"))
      })?)
    }
  };

  Ok(Fact {
    key: FactKey {
      participant_id: decode_participant(participant)?,
      milestone: decode_index(milestone, "milestone")?,
      tier: decode_index(tier, "tier")?,
    },
    achieved_at,
  })
}

// ─── Field decoding ──────────────────────────────────────────────────────────

/// Participant ids are strings, but tolerate files written with the
/// upstream's numeric form.
fn decode_participant(value: &Value) -> Result<String> {
  match value {
    Value::String(s) => Ok(s.clone()),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(malformed("participant id is not a string", other)),
  }
}

/// Decode a milestone or tier field, rejecting values outside the target
/// integer type rather than wrapping them.
fn decode_index<T: TryFrom<i64>>(value: &Value, what: &str) -> Result<T> {
  let n = decode_int(value, what)?;
  T::try_from(n).map_err(|_| malformed(&format!("{what} out of range"), value))
}

fn decode_int(value: &Value, what: &str) -> Result<i64> {
  match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.parse().ok(),
    _ => None,
  }
  .ok_or_else(|| malformed(&format!("{what} is not an integer"), value))
}

fn malformed(what: &str, value: &Value) -> Error {
  Error::Malformed(format!("{what}: {value}"))
}
