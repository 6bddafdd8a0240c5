//! Snapshot — everything known to have happened as of one fetch.
//!
//! The raw leaderboard payload nests completions as
//! `members.<id>.completion_day_level.<day>.<part>.get_star_ts`. Identifiers
//! are coerced to strings and numeric fields to integers so equality and
//! hashing are stable regardless of the payload's native JSON type for a
//! field (string vs number). Absent nested mappings are treated as empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
  Error, Result,
  fact::{Fact, FactKey},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The full set of facts known as of one fetch. Internally an ordered map
/// from identity key to first-seen timestamp, so iteration (and therefore
/// the persisted form) is deterministic.
///
/// Snapshots are immutable value objects in normal operation: a new one is
/// built on every fetch and never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
  facts: BTreeMap<FactKey, Option<DateTime<Utc>>>,
}

impl Snapshot {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Normalize the raw leaderboard payload into a snapshot.
  ///
  /// Every `(member, day, part)` leaf yields exactly one fact. A day or part
  /// key that cannot be coerced to an integer is a malformed payload, not a
  /// silent skip.
  pub fn from_payload(raw: &Value) -> Result<Self> {
    let mut facts = BTreeMap::new();

    if let Some(members) = raw.get("members").and_then(Value::as_object) {
      for (member_id, member) in members {
        let Some(completion) = member
          .get("completion_day_level")
          .and_then(Value::as_object)
        else {
          continue;
        };

        for (day, parts) in completion {
          let milestone: u32 = parse_index(day, "day")?;
          let Some(parts) = parts.as_object() else {
            continue;
          };

          for (part, info) in parts {
            let tier: u8 = parse_index(part, "part")?;
            let achieved_at = match info.get("get_star_ts").and_then(coerce_int)
            {
              Some(secs) => Some(
                DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                  Error::MalformedPayload(format!(
                    "star timestamp out of range: {secs}"
                  ))
                })?,
              ),
              None => None,
            };

            facts.insert(
              FactKey {
                participant_id: member_id.clone(),
                milestone,
                tier,
              },
              achieved_at,
            );
          }
        }
      }
    }

    Ok(Self { facts })
  }

  pub fn len(&self) -> usize {
    self.facts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.facts.is_empty()
  }

  pub fn contains(&self, key: &FactKey) -> bool {
    self.facts.contains_key(key)
  }

  /// Insert a fact. If the key is already present the existing (first-seen)
  /// timestamp wins.
  pub fn insert(&mut self, fact: Fact) {
    self.facts.entry(fact.key).or_insert(fact.achieved_at);
  }

  /// Iterate over facts in identity-tuple order.
  pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
    self.facts.iter().map(|(key, achieved_at)| Fact {
      key:         key.clone(),
      achieved_at: *achieved_at,
    })
  }
}

impl FromIterator<Fact> for Snapshot {
  fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
    let mut snapshot = Self::default();
    for fact in iter {
      snapshot.insert(fact);
    }
    snapshot
  }
}

// ─── Participants ────────────────────────────────────────────────────────────

/// Ephemeral per-fetch view of one leaderboard member. Recomputed on every
/// fetch, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
  pub id:    String,
  pub name:  Option<String>,
  pub stars: u32,
  pub score: i64,
}

impl Participant {
  /// Display name, falling back to a deterministic anonymous label keyed by
  /// the upstream id. Never empty.
  pub fn display_name(&self) -> String {
    match &self.name {
      Some(name) if !name.is_empty() => name.clone(),
      _ => format!("Anonymous #{}", self.id),
    }
  }
}

/// Extract the per-fetch participant views from the raw payload.
///
/// The member map key is used as the id so it always matches the
/// `participant_id` of facts extracted from the same payload.
pub fn participants(raw: &Value) -> Vec<Participant> {
  let Some(members) = raw.get("members").and_then(Value::as_object) else {
    return Vec::new();
  };

  members
    .iter()
    .map(|(id, member)| Participant {
      id:    id.clone(),
      name:  member
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string),
      stars: member
        .get("stars")
        .and_then(coerce_int)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0),
      score: member.get("local_score").and_then(coerce_int).unwrap_or(0),
    })
    .collect()
}

// ─── Coercion helpers ────────────────────────────────────────────────────────

fn parse_index<T: std::str::FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse().map_err(|_| {
    Error::MalformedPayload(format!("non-numeric {what} index: {s:?}"))
  })
}

/// Coerce a JSON number or numeric string to an integer.
fn coerce_int(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.parse().ok(),
    _ => None,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn empty_payload_yields_empty_snapshot() {
    let snapshot = Snapshot::from_payload(&json!({})).unwrap();
    assert!(snapshot.is_empty());
    assert!(participants(&json!({})).is_empty());
  }

  #[test]
  fn missing_completion_map_treated_as_empty() {
    let raw = json!({
      "members": {
        "123": { "name": "Alice", "stars": 0, "local_score": 0 }
      }
    });
    let snapshot = Snapshot::from_payload(&raw).unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(participants(&raw).len(), 1);
  }

  #[test]
  fn each_completion_leaf_yields_one_fact() {
    let raw = json!({
      "members": {
        "123": {
          "name": "Alice",
          "completion_day_level": {
            "1": {
              "1": { "get_star_ts": 1_733_032_800 },
              "2": { "get_star_ts": 1_733_036_400 }
            },
            "2": {
              "1": { "get_star_ts": 1_733_119_200 }
            }
          }
        }
      }
    });
    let snapshot = Snapshot::from_payload(&raw).unwrap();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.contains(&FactKey {
      participant_id: "123".into(),
      milestone:      1,
      tier:           2,
    }));
  }

  #[test]
  fn numeric_fields_coerced_from_strings() {
    // get_star_ts as a string must still parse; missing ts must be None.
    let raw = json!({
      "members": {
        "9": {
          "completion_day_level": {
            "3": {
              "1": { "get_star_ts": "1733032800" },
              "2": {}
            }
          }
        }
      }
    });
    let snapshot = Snapshot::from_payload(&raw).unwrap();
    let facts: Vec<Fact> = snapshot.iter().collect();
    assert_eq!(facts.len(), 2);
    assert!(facts[0].achieved_at.is_some());
    assert!(facts[1].achieved_at.is_none());
  }

  #[test]
  fn non_numeric_day_is_malformed() {
    let raw = json!({
      "members": {
        "9": { "completion_day_level": { "first": { "1": {} } } }
      }
    });
    let err = Snapshot::from_payload(&raw).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload(_)));
  }

  #[test]
  fn participant_without_name_gets_anonymous_label() {
    let raw = json!({
      "members": {
        "42": { "name": null, "stars": 2, "local_score": 17 }
      }
    });
    let ps = participants(&raw);
    assert_eq!(ps.len(), 1);
    assert_eq!(ps[0].display_name(), "Anonymous #42");
    assert_eq!(ps[0].stars, 2);
    assert_eq!(ps[0].score, 17);
  }

  #[test]
  fn out_of_range_star_counts_fall_back_to_zero() {
    let raw = json!({
      "members": {
        "1": { "name": "A", "stars": -3, "local_score": 5 },
        "2": { "name": "B", "stars": 99_999_999_999i64, "local_score": 5 }
      }
    });
    let ps = participants(&raw);
    assert!(ps.iter().all(|p| p.stars == 0));
  }

  #[test]
  fn insert_keeps_first_seen_timestamp() {
    let first = chrono::DateTime::from_timestamp(1_000, 0);
    let later = chrono::DateTime::from_timestamp(2_000, 0);

    let mut snapshot = Snapshot::empty();
    snapshot.insert(Fact::new("a", 1, 1, first));
    snapshot.insert(Fact::new("a", 1, 1, later));

    let facts: Vec<Fact> = snapshot.iter().collect();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].achieved_at, first);
  }
}
